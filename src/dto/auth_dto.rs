use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{trim_to_none, Normalize};

/// Usernames and passwords: letters and digits only, no spaces.
pub static ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Normalize for LoginForm {
    fn normalize(self) -> Self {
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegisterUserForm {
    #[validate(length(min = 4, max = 150, message = "Full name must be between 4 and 150 characters"))]
    pub name: String,
    #[validate(
        length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"),
        regex(path = *ALPHANUMERIC, message = "Username may only contain letters and digits, without spaces")
    )]
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[validate(
        length(min = 3, max = 20, message = "Password must be between 3 and 20 characters"),
        regex(path = *ALPHANUMERIC, message = "Password may only contain letters and digits, without spaces")
    )]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, max = 14, message = "Phone must have between 10 and 14 digits"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, max = 600, message = "Experience must be between 10 and 600 characters"))]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, max = 600, message = "Education must be between 10 and 600 characters"))]
    pub education: Option<String>,
}

impl Normalize for RegisterUserForm {
    fn normalize(self) -> Self {
        Self {
            name: self.name.to_uppercase(),
            email: trim_to_none(self.email),
            phone: trim_to_none(self.phone),
            experience: trim_to_none(self.experience),
            education: trim_to_none(self.education),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegisterCompanyForm {
    #[validate(length(min = 4, max = 150, message = "Company name must be between 4 and 150 characters"))]
    pub name: String,
    #[validate(length(min = 4, max = 100, message = "Business must be between 4 and 100 characters"))]
    pub business: String,
    #[validate(
        length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"),
        regex(path = *ALPHANUMERIC, message = "Username may only contain letters and digits, without spaces")
    )]
    pub username: String,
    #[validate(
        length(min = 3, max = 20, message = "Password must be between 3 and 20 characters"),
        regex(path = *ALPHANUMERIC, message = "Password may only contain letters and digits, without spaces")
    )]
    pub password: String,
    #[validate(length(min = 3, max = 150, message = "Street must be between 3 and 150 characters"))]
    pub street: String,
    #[validate(length(min = 1, max = 8, message = "Number must be between 1 and 8 characters"))]
    pub number: String,
    #[validate(length(min = 3, max = 150, message = "City must be between 3 and 150 characters"))]
    pub city: String,
    #[validate(length(equal = 2, message = "State must have 2 characters (e.g. PR)"))]
    pub state: String,
    #[validate(length(min = 10, max = 12, message = "Phone must have between 10 and 12 digits"))]
    pub phone: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
}

impl Normalize for RegisterCompanyForm {
    fn normalize(self) -> Self {
        Self {
            name: self.name.to_uppercase(),
            state: self.state.to_uppercase(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::check;

    fn valid_user() -> RegisterUserForm {
        RegisterUserForm {
            name: "Ana Souza".into(),
            username: "ana123".into(),
            email: Some("  ana@example.com ".into()),
            password: "abc123".into(),
            phone: Some("".into()),
            experience: None,
            education: Some("   ".into()),
        }
    }

    #[test]
    fn register_user_normalizes_before_validating() {
        let form = check(valid_user()).expect("valid");
        assert_eq!(form.name, "ANA SOUZA");
        assert_eq!(form.email.as_deref(), Some("ana@example.com"));
        assert_eq!(form.phone, None);
        assert_eq!(form.education, None);
    }

    #[test]
    fn revalidating_valid_data_yields_no_errors() {
        let once = check(valid_user()).expect("valid");
        let twice = check(once.clone()).expect("still valid");
        assert_eq!(once.name, twice.name);
        assert_eq!(once.email, twice.email);
    }

    #[test]
    fn short_username_is_keyed_to_its_field() {
        let form = RegisterUserForm { username: "ab".into(), ..valid_user() };
        let errors = check(form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("username").map(String::as_str),
            Some("Username must be between 3 and 20 characters")
        );
    }

    #[test]
    fn password_with_spaces_is_rejected() {
        let form = RegisterUserForm { password: "abc 123".into(), ..valid_user() };
        let errors = check(form).unwrap_err();
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = check(LoginForm::default()).unwrap_err();
        assert_eq!(errors.get("username").map(String::as_str), Some("Username is required"));
        assert_eq!(errors.get("password").map(String::as_str), Some("Password is required"));
    }

    #[test]
    fn company_state_is_uppercased_and_contacts_required() {
        let form = RegisterCompanyForm {
            name: "Acme Ltda".into(),
            business: "Software".into(),
            username: "acme".into(),
            password: "secret1".into(),
            street: "Rua XV".into(),
            number: "100".into(),
            city: "Curitiba".into(),
            state: "pr".into(),
            phone: " ".into(),
            email: "".into(),
        };
        let errors = check(form).unwrap_err();
        assert!(errors.contains_key("phone"));
        assert!(errors.contains_key("email"));
        assert!(!errors.contains_key("state"));
    }
}
