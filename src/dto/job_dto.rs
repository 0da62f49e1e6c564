use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::job::JobPatch;
use crate::utils::validation::{blank_to_none, trim_to_none, Normalize};

pub const BRAZILIAN_STATES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MS", "MT", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Area labels exactly as the backend stores them.
pub const JOB_AREAS: [&str; 24] = [
    "Administração",
    "Agricultura",
    "Artes",
    "Atendimento ao Cliente",
    "Comercial",
    "Comunicação",
    "Construção Civil",
    "Consultoria",
    "Contabilidade",
    "Design",
    "Educação",
    "Engenharia",
    "Finanças",
    "Jurídica",
    "Logística",
    "Marketing",
    "Produção",
    "Recursos Humanos",
    "Saúde",
    "Segurança",
    "Tecnologia da Informação",
    "Telemarketing",
    "Vendas",
    "Outros",
];

fn rejection(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_area(area: &str) -> Result<(), ValidationError> {
    if JOB_AREAS.contains(&area) {
        Ok(())
    } else {
        Err(rejection("area", "Select a valid area"))
    }
}

fn validate_state(state: &str) -> Result<(), ValidationError> {
    if BRAZILIAN_STATES.contains(&state) {
        Ok(())
    } else {
        Err(rejection("state", "Select a valid state"))
    }
}

/// Posting form, used both to create and to edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct JobForm {
    #[validate(length(min = 3, max = 150, message = "Title must be between 3 and 150 characters"))]
    pub title: String,
    #[validate(custom(function = "validate_area"))]
    pub area: String,
    #[validate(length(min = 10, max = 5000, message = "Description must be between 10 and 5000 characters"))]
    pub description: String,
    #[validate(custom(function = "validate_state"))]
    pub state: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0, message = "Salary must be greater than zero"))]
    pub salary: Option<f64>,
}

pub type UpdateJobForm = JobForm;

impl Normalize for JobForm {
    fn normalize(self) -> Self {
        Self {
            state: self.state.trim().to_uppercase(),
            ..self
        }
    }
}

impl From<&JobForm> for JobPatch {
    fn from(form: &JobForm) -> Self {
        JobPatch {
            title: Some(form.title.clone()),
            area: Some(form.area.clone()),
            description: Some(form.description.clone()),
            state: Some(form.state.clone()),
            city: Some(form.city.clone()),
            salary: form.salary.map(Some),
        }
    }
}

/// Accepts "1500", "1500.50" and "1500,50"; anything else reads as absent.
pub fn parse_salary(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<SalaryRange>,
}

impl JobSearchFilters {
    /// Drops empty predicates so they are omitted from the request.
    pub fn compact(self) -> Self {
        Self {
            title: blank_to_none(self.title),
            area: blank_to_none(self.area),
            company: blank_to_none(self.company),
            state: blank_to_none(self.state),
            city: blank_to_none(self.city),
            salary_range: self
                .salary_range
                .filter(|range| range.min.is_some() || range.max.is_some()),
        }
    }

    /// A company listing is already scoped to the company.
    pub fn without_company(self) -> Self {
        Self {
            company: None,
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchRequest {
    pub filters: Vec<JobSearchFilters>,
}

impl From<Option<JobSearchFilters>> for SearchRequest {
    fn from(filters: Option<JobSearchFilters>) -> Self {
        Self {
            filters: filters.map(|f| vec![f.compact()]).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ApplicationForm {
    #[validate(length(min = 1, max = 150, message = "Name is required (max 150 characters)"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, max = 14, message = "Phone must have between 10 and 14 digits"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 600, message = "Education is required (max 600 characters)"))]
    pub education: String,
    #[validate(length(min = 1, max = 600, message = "Experience is required (max 600 characters)"))]
    pub experience: String,
}

impl Normalize for ApplicationForm {
    fn normalize(self) -> Self {
        Self {
            email: trim_to_none(self.email),
            phone: trim_to_none(self.phone),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FeedbackForm {
    pub user_id: i64,
    #[validate(length(min = 1, max = 600, message = "Message is required (max 600 characters)"))]
    pub message: String,
}

impl Normalize for FeedbackForm {
    fn normalize(self) -> Self {
        Self {
            message: self.message.trim().to_string(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::check;
    use serde_json::json;

    fn posting() -> JobForm {
        JobForm {
            title: "Backend Developer".into(),
            area: "Tecnologia da Informação".into(),
            description: "Build and operate our REST services.".into(),
            state: "pr".into(),
            city: "Curitiba".into(),
            salary: Some(4500.0),
        }
    }

    #[test]
    fn valid_posting_passes_and_uppercases_state() {
        let form = check(posting()).expect("valid");
        assert_eq!(form.state, "PR");
    }

    #[test]
    fn unknown_area_and_state_are_rejected() {
        let form = JobForm { area: "Astronomy".into(), state: "XX".into(), ..posting() };
        let errors = check(form).unwrap_err();
        assert_eq!(errors.get("area").map(String::as_str), Some("Select a valid area"));
        assert_eq!(errors.get("state").map(String::as_str), Some("Select a valid state"));
    }

    #[test]
    fn salary_must_be_positive_when_present() {
        let zero = JobForm { salary: Some(0.0), ..posting() };
        assert!(check(zero).unwrap_err().contains_key("salary"));
        let absent = JobForm { salary: None, ..posting() };
        assert!(check(absent).is_ok());
    }

    #[test]
    fn omitted_salary_leaves_cached_salary_alone() {
        let form = JobForm { salary: None, ..posting() };
        assert_eq!(JobPatch::from(&form).salary, None);
        assert!(serde_json::to_value(&form).unwrap().get("salary").is_none());
        let priced = JobPatch::from(&posting());
        assert_eq!(priced.salary, Some(Some(4500.0)));
    }

    #[test]
    fn salary_parsing_accepts_decimal_comma() {
        assert_eq!(parse_salary("1500,50"), Some(1500.5));
        assert_eq!(parse_salary(" 2000 "), Some(2000.0));
        assert_eq!(parse_salary(""), None);
        assert_eq!(parse_salary("abc"), None);
    }

    #[test]
    fn search_request_omits_empty_predicates() {
        let filters = JobSearchFilters {
            title: Some("".into()),
            state: Some("PR".into()),
            salary_range: Some(SalaryRange { min: Some(1500.0), max: None }),
            ..Default::default()
        };
        let body = serde_json::to_value(SearchRequest::from(Some(filters))).unwrap();
        assert_eq!(
            body,
            json!({"filters": [{"state": "PR", "salary_range": {"min": 1500.0, "max": null}}]})
        );
        let empty = serde_json::to_value(SearchRequest::from(None)).unwrap();
        assert_eq!(empty, json!({"filters": []}));
    }

    #[test]
    fn feedback_message_is_required() {
        let errors = check(FeedbackForm { user_id: 7, message: "   ".into() }).unwrap_err();
        assert!(errors.contains_key("message"));
    }
}
