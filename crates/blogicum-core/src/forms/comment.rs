use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{FormErrors, collect};
use crate::domain::Comment;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
}

impl CommentForm {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }

    /// The trimmed comment text.
    pub fn clean(&self) -> Result<String, FormErrors> {
        let trimmed = Self {
            text: self.text.trim().to_string(),
        };
        let mut errors = FormErrors::new();
        collect(&trimmed, &mut errors);
        errors.into_result(trimmed.text)
    }
}
