use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: i64,
    pub title: String,
    pub area: String,
    pub description: String,
    pub company: String,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub salary: Option<f64>,
    pub contact: String,
}

/// Partial update merged into cached postings by `job_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub area: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub salary: Option<Option<f64>>,
}

impl Job {
    pub fn apply(&mut self, patch: &JobPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(area) = &patch.area {
            self.area = area.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(state) = &patch.state {
            self.state = state.clone();
        }
        if let Some(city) = &patch.city {
            self.city = city.clone();
        }
        if let Some(salary) = patch.salary {
            self.salary = salary;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobsResponse {
    #[serde(default)]
    pub items: Vec<Job>,
}
