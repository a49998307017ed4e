//! View models - the context handed to each document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Link to a category page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLink {
    pub title: String,
    pub slug: String,
}

/// A post as shown in listings and on its detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCard {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_published: bool,
    pub author: String,
    pub category: Option<CategoryLink>,
    pub location: Option<String>,
    pub comment_count: u64,
}

/// A comment under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentItem {
    pub id: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: String,
}

/// Public profile fields of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub username: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub joined: DateTime<Utc>,
}

/// Paginator state shown under a listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: PageMeta,
}

/// Context of `blog/index.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexContext {
    pub page_obj: Paginated<PostCard>,
}

/// Context of `blog/category.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryContext {
    pub category: CategoryLink,
    pub description: String,
    pub page_obj: Paginated<PostCard>,
}

/// Context of `blog/profile.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileContext {
    pub profile: ProfileView,
    pub is_owner: bool,
    pub page_obj: Paginated<PostCard>,
}

/// Context of `blog/detail.html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostContext {
    pub post: PostCard,
    pub is_author: bool,
    pub comments: Vec<CommentItem>,
    /// Present for signed-in viewers, who may comment.
    pub form: Option<serde_json::Value>,
}

/// A select option of the post form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: i32,
    pub label: String,
}

/// Context of every form document: the submitted or pre-filled values plus
/// per-field errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormContext<F> {
    pub form: F,
    pub errors: BTreeMap<String, Vec<String>>,
    /// Category and location options of the post form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<FormChoices>,
    /// The object a delete confirmation is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<serde_json::Value>,
}

impl<F> FormContext<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            errors: BTreeMap::new(),
            choices: None,
            instance: None,
        }
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_choices(mut self, choices: FormChoices) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn with_instance(mut self, instance: serde_json::Value) -> Self {
        self.instance = Some(instance);
        self
    }
}

/// Category and location options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormChoices {
    pub categories: Vec<Choice>,
    pub locations: Vec<Choice>,
}

/// Response containing a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Liveness probe body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}
