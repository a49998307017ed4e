use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{FormErrors, REQUIRED, collect};

const USERNAME_MAX: usize = 150;

/// Letters, digits and `@ . + - _`, at most 150 characters.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    (1..=USERNAME_MAX).contains(&len)
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

pub(crate) fn check_username(username: &str, errors: &mut FormErrors) {
    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else if !is_valid_username(username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

/// Empty stays empty; anything else has to look like an address.
pub(crate) fn normalize_email(email: &str, errors: &mut FormErrors) -> String {
    if !email.is_empty() && !validator::validate_email(email) {
        errors.add("email", "Enter a valid email address.");
    }
    email.to_string()
}

/// Sign-up form. Passwords are never echoed back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    #[validate(length(min = 8, message = "Password should be at least 8 characters long"))]
    pub password: String,
    #[serde(default, skip_serializing)]
    pub password_confirmation: String,
}

impl RegistrationForm {
    /// Returns the trimmed username and email. Uniqueness is checked by the caller.
    pub fn clean(&self) -> Result<(String, String), FormErrors> {
        let username = self.username.trim().to_string();
        let email = self.email.trim().to_string();

        let mut errors = FormErrors::new();
        collect(self, &mut errors);
        check_username(&username, &mut errors);
        let email = normalize_email(&email, &mut errors);
        if self.password != self.password_confirmation {
            errors.add("password_confirmation", "The two password fields didn't match.");
        }

        errors.into_result((username, email))
    }
}

/// Sign-in form. `next` is where to go after a successful login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(is_valid_username("ada.lovelace+blog@home_1"));
        assert!(is_valid_username("пользователь"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("two words"));
        assert!(!is_valid_username("slash/name"));
        assert!(!is_valid_username(&"a".repeat(151)));
    }

    #[test]
    fn test_registration_requires_matching_passwords() {
        let form = RegistrationForm {
            username: "ada".to_string(),
            email: String::new(),
            password: "correct horse".to_string(),
            password_confirmation: "battery staple".to_string(),
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.has("password_confirmation"));
        assert!(!errors.has("password"));
    }

    #[test]
    fn test_registration_short_password() {
        let form = RegistrationForm {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
            password_confirmation: "short".to_string(),
        };
        assert!(form.clean().unwrap_err().has("password"));
    }

    #[test]
    fn test_registration_valid() {
        let form = RegistrationForm {
            username: " ada ".to_string(),
            email: "ada@example.com".to_string(),
            password: "long enough".to_string(),
            password_confirmation: "long enough".to_string(),
        };
        assert_eq!(
            form.clean().unwrap(),
            ("ada".to_string(), "ada@example.com".to_string())
        );
    }
}
