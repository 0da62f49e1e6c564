use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::auth_dto::ALPHANUMERIC;
use crate::models::profile::{CompanyProfile, UserProfile};
use crate::utils::validation::{blank_to_none, trim_to_none, Normalize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserForm {
    #[validate(length(min = 4, max = 150, message = "Full name must be between 4 and 150 characters"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    /// Left out of the request when unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 3, max = 20, message = "Password must be between 3 and 20 characters"),
        regex(path = *ALPHANUMERIC, message = "Password may only contain letters and digits, without spaces")
    )]
    pub password: Option<String>,
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

impl Normalize for UpdateUserForm {
    fn normalize(self) -> Self {
        Self {
            name: self.name.to_uppercase(),
            email: trim_to_none(self.email),
            password: blank_to_none(self.password),
            phone: trim_to_none(self.phone),
            experience: trim_to_none(self.experience),
            education: trim_to_none(self.education),
        }
    }
}

impl UpdateUserForm {
    pub fn merge_into(&self, profile: &mut UserProfile) {
        profile.name = self.name.clone();
        profile.email = self.email.clone();
        profile.phone = self.phone.clone();
        profile.experience = self.experience.clone();
        profile.education = self.education.clone();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCompanyForm {
    #[validate(length(min = 4, max = 150, message = "Company name must be between 4 and 150 characters"))]
    pub name: String,
    #[validate(length(min = 4, max = 100, message = "Business must be between 4 and 100 characters"))]
    pub business: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 3, max = 20, message = "Password must be between 3 and 20 characters"),
        regex(path = *ALPHANUMERIC, message = "Password may only contain letters and digits, without spaces")
    )]
    pub password: Option<String>,
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

impl Normalize for UpdateCompanyForm {
    fn normalize(self) -> Self {
        Self {
            name: self.name.to_uppercase(),
            password: blank_to_none(self.password),
            state: self.state.to_uppercase(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }
}

impl UpdateCompanyForm {
    pub fn merge_into(&self, profile: &mut CompanyProfile) {
        profile.name = self.name.clone();
        profile.business = self.business.clone();
        profile.street = self.street.clone();
        profile.number = self.number.clone();
        profile.city = self.city.clone();
        profile.state = self.state.clone();
        profile.phone = Some(self.phone.clone());
        profile.email = Some(self.email.clone());
    }
}
