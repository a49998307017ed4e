//! Form/validation layer - maps submitted fields onto entity mutations.
//!
//! Forms deserialize from `application/x-www-form-urlencoded` bodies, check
//! their fields with `validator` and hand back either cleaned values or a
//! [`FormErrors`] map keyed by field name.

mod account;
mod comment;
mod post;
mod profile;

use std::collections::BTreeMap;

use serde::Serialize;
use validator::ValidationErrors;

pub use account::{LoginForm, RegistrationForm, is_valid_username};
pub use comment::CommentForm;
pub use post::{CleanPost, PUB_DATE_INPUT_FORMAT, PostForm};
pub use profile::{CleanProfile, ProfileForm};

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const INVALID_CHOICE: &str = "Select a valid choice.";

/// Per-field error messages of a rejected submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Run the derived validators, collecting failures into `errors`.
pub(crate) fn collect<F: validator::Validate>(form: &F, errors: &mut FormErrors) {
    if let Err(e) = form.validate() {
        for (field, messages) in FormErrors::from(e).0 {
            for message in messages {
                errors.add(field.clone(), message);
            }
        }
    }
}

/// Treat blank optional inputs as absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
