use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{FormErrors, INVALID_CHOICE, REQUIRED, collect, non_blank};
use crate::domain::{CategoryId, LocationId, Post};

/// Format of the `datetime-local` input the post form renders.
pub const PUB_DATE_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

const PUB_DATE_FORMATS: &[&str] = &[
    PUB_DATE_INPUT_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Submitted post fields. There is deliberately no author field: the author
/// is always the signed-in user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "Title must be between 1 and 256 characters."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Checkbox: present when ticked.
    #[serde(default)]
    pub is_published: Option<String>,
}

/// Validated post fields, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanPost {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub is_published: bool,
    pub category_id: CategoryId,
    pub location_id: Option<LocationId>,
}

impl PostForm {
    /// Pre-filled form for editing an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: Some(post.pub_date.format(PUB_DATE_INPUT_FORMAT).to_string()),
            category: post.category_id.map(|id| id.to_string()),
            location: post.location_id.map(|id| id.to_string()),
            image: post.image.clone(),
            is_published: post.is_published.then(|| "on".to_string()),
        }
    }

    /// Check every field. `now` fills in an omitted publication date.
    ///
    /// Whether the referenced category and location exist is checked by the
    /// caller, which owns the repositories.
    pub fn clean(&self, now: DateTime<Utc>) -> Result<CleanPost, FormErrors> {
        let trimmed = Self {
            title: self.title.trim().to_string(),
            text: self.text.trim().to_string(),
            ..self.clone()
        };

        let mut errors = FormErrors::new();
        collect(&trimmed, &mut errors);

        let pub_date = match non_blank(&self.pub_date) {
            None => Some(now),
            Some(raw) => {
                let parsed = parse_pub_date(raw);
                if parsed.is_none() {
                    errors.add("pub_date", "Enter a valid date/time.");
                }
                parsed
            }
        };

        let category_id = match non_blank(&self.category) {
            None => {
                errors.add("category", REQUIRED);
                None
            }
            Some(raw) => parse_choice(raw, "category", &mut errors),
        };

        let location_id = non_blank(&self.location).and_then(|raw| parse_choice(raw, "location", &mut errors));

        match (pub_date, category_id) {
            (Some(pub_date), Some(category_id)) if errors.is_empty() => Ok(CleanPost {
                title: trimmed.title,
                text: trimmed.text,
                pub_date,
                image: non_blank(&self.image).map(str::to_string),
                is_published: is_checked(&self.is_published),
                category_id,
                location_id,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    PUB_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_choice(raw: &str, field: &'static str, errors: &mut FormErrors) -> Option<i32> {
    match raw.parse::<i32>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

pub(crate) fn is_checked(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form() -> PostForm {
        PostForm {
            title: "Trip to the mountains".to_string(),
            text: "It was cold.".to_string(),
            pub_date: Some("2024-05-01T10:30".to_string()),
            category: Some("2".to_string()),
            location: Some("".to_string()),
            image: None,
            is_published: Some("on".to_string()),
        }
    }

    #[test]
    fn test_clean_valid_form() {
        let clean = form().clean(Utc::now()).unwrap();

        assert_eq!(clean.title, "Trip to the mountains");
        assert_eq!(
            clean.pub_date,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
        );
        assert_eq!(clean.category_id, 2);
        assert_eq!(clean.location_id, None);
        assert!(clean.is_published);
    }

    #[test]
    fn test_missing_pub_date_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let clean = PostForm {
            pub_date: None,
            ..form()
        }
        .clean(now)
        .unwrap();
        assert_eq!(clean.pub_date, now);
    }

    #[test]
    fn test_unticked_checkbox_means_unpublished() {
        let clean = PostForm {
            is_published: None,
            ..form()
        }
        .clean(Utc::now())
        .unwrap();
        assert!(!clean.is_published);
    }

    #[test]
    fn test_blank_title_and_text_are_rejected() {
        let errors = PostForm {
            title: "   ".to_string(),
            text: String::new(),
            ..form()
        }
        .clean(Utc::now())
        .unwrap_err();

        assert!(errors.has("title"));
        assert!(errors.has("text"));
        assert!(!errors.has("category"));
    }

    #[test]
    fn test_title_length_is_bounded() {
        let errors = PostForm {
            title: "x".repeat(257),
            ..form()
        }
        .clean(Utc::now())
        .unwrap_err();
        assert!(errors.has("title"));

        let ok = PostForm {
            title: "x".repeat(256),
            ..form()
        };
        assert!(ok.clean(Utc::now()).is_ok());
    }

    #[test]
    fn test_bad_date_and_choices() {
        let errors = PostForm {
            pub_date: Some("yesterday".to_string()),
            category: None,
            location: Some("north".to_string()),
            ..form()
        }
        .clean(Utc::now())
        .unwrap_err();

        assert_eq!(errors.get("pub_date"), ["Enter a valid date/time.".to_string()]);
        assert_eq!(errors.get("category"), [REQUIRED.to_string()]);
        assert_eq!(errors.get("location"), [INVALID_CHOICE.to_string()]);
    }

    #[test]
    fn test_from_post_round_trips_through_clean() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let post = Post {
            id: 4,
            title: "Saved".to_string(),
            text: "Body".to_string(),
            pub_date: now,
            image: Some("posts_images/a.png".to_string()),
            is_published: false,
            created_at: now,
            author_id: 1,
            category_id: Some(3),
            location_id: Some(8),
        };

        let clean = PostForm::from_post(&post).clean(Utc::now()).unwrap();
        assert_eq!(clean.pub_date, now);
        assert_eq!(clean.location_id, Some(8));
        assert_eq!(clean.image.as_deref(), Some("posts_images/a.png"));
        assert!(!clean.is_published);
    }
}
