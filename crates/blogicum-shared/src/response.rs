//! Response envelopes: rendered documents and RFC 7807 problem bodies.

use serde::{Deserialize, Serialize};

/// A page as the server would render it: the template plus its context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub template: String,
    pub context: T,
}

impl<T> Document<T> {
    pub fn new(template: impl Into<String>, context: T) -> Self {
        Self {
            template: template.into(),
            context,
        }
    }
}

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Template the error page would be rendered with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Request ID for debugging purposes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            template: None,
            request_id: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        let mut problem = Self::new(404, "Not Found").with_detail(detail);
        problem.template = Some("pages/404.html".to_string());
        problem
    }

    pub fn internal_error() -> Self {
        let mut problem = Self::new(500, "Internal Server Error");
        problem.template = Some("pages/500.html".to_string());
        problem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_problem_body() {
        let body = serde_json::to_value(ErrorResponse::not_found("post 3")).unwrap();

        assert_eq!(body["type"], "about:blank");
        assert_eq!(body["status"], 404);
        assert_eq!(body["template"], "pages/404.html");
        assert!(body.get("request_id").is_none());
    }
}
