use serde::{Deserialize, Serialize};
use validator::Validate;

use super::account::{check_username, normalize_email};
use super::{FormErrors, collect};
use crate::domain::User;

/// Editable profile fields of the signed-in user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanProfile {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub bio: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
        }
    }

    /// Username uniqueness is checked by the caller.
    pub fn clean(&self) -> Result<CleanProfile, FormErrors> {
        let clean = CleanProfile {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            bio: self.bio.trim().to_string(),
        };

        let mut errors = FormErrors::new();
        collect(self, &mut errors);
        check_username(&clean.username, &mut errors);
        let email = normalize_email(&clean.email, &mut errors);

        errors.into_result(CleanProfile { email, ..clean })
    }
}
