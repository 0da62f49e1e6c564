use serde::{Deserialize, Serialize};

/// A posting the current user applied to, as listed under "my applications".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserApplication {
    pub job_id: i64,
    pub title: String,
    pub area: String,
    pub company: String,
    pub description: String,
    pub state: String,
    pub city: String,
    #[serde(default)]
    pub salary: Option<f64>,
    pub contact: String,
    #[serde(default)]
    pub applied_at: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserApplicationsResponse {
    #[serde(default)]
    pub items: Vec<UserApplication>,
}

/// An applicant to one of the company's postings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCandidate {
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub education: String,
    pub experience: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCandidatesResponse {
    #[serde(default)]
    pub items: Vec<JobCandidate>,
}
