use std::collections::BTreeMap;

use validator::{Validate, ValidationErrors};

use crate::error::FieldDetail;

/// Field name to first error message, shared by client-side checks and 422 replies.
pub type FormErrors = BTreeMap<String, String>;

/// Value transforms applied before a form is validated.
pub trait Normalize {
    fn normalize(self) -> Self;
}

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

/// Normalizes then validates; on rejection returns the field error map.
pub fn check<T: Validate + Normalize>(form: T) -> Result<T, FormErrors> {
    let form = form.normalize();
    match validate(&form) {
        Ok(()) => Ok(form),
        Err(errors) => Err(form_errors(&errors)),
    }
}

pub fn form_errors(errors: &ValidationErrors) -> FormErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs.first()?;
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            Some((field.to_string(), message))
        })
        .collect()
}

pub fn from_details(details: &[FieldDetail]) -> FormErrors {
    details
        .iter()
        .map(|d| (d.field.clone(), d.error.clone()))
        .collect()
}

/// Trims, and maps an empty result to absent.
pub fn trim_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_drops_empty_values() {
        assert_eq!(trim_to_none(Some("  a@b.co ".into())), Some("a@b.co".into()));
        assert_eq!(trim_to_none(Some("   ".into())), None);
        assert_eq!(trim_to_none(None), None);
    }

    #[test]
    fn details_map_by_field() {
        let details = vec![
            FieldDetail { field: "salary".into(), error: "must be positive".into() },
            FieldDetail { field: "title".into(), error: "too short".into() },
        ];
        let errors = from_details(&details);
        assert_eq!(errors.get("salary").map(String::as_str), Some("must be positive"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejected_form_yields_the_same_map_shape_as_details() {
        use crate::dto::auth_dto::LoginForm;

        let errors = check(LoginForm { username: "ana123".into(), password: String::new() }).unwrap_err();
        let from_backend = from_details(&[FieldDetail {
            field: "password".into(),
            error: "Password is required".into(),
        }]);
        assert_eq!(errors, from_backend);
    }
}
