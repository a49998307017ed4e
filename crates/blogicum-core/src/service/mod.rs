//! Blog operations - one method per (entity, action) pair.
//!
//! Every method takes the viewer explicitly. Reads fail with
//! [`DomainError::NotFound`] for missing and hidden resources alike. Writes
//! return a [`Submission`], an [`Access`] or an [`Outcome`], carrying only
//! the rejections the operation can actually produce.

mod accounts;
mod comments;
mod listings;
mod posts;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Category, CommentView, Location, PostId, PostListing, User};
use crate::forms::FormErrors;
use crate::pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest};
use crate::ports::{
    CategoryRepository, Clock, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};

/// Result of a form submission on the viewer's own account or content.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
    /// The change was stored.
    Saved(T),
    /// The submission was rejected; nothing was stored.
    Invalid(FormErrors),
}

impl<T> Submission<T> {
    pub fn is_saved(&self) -> bool {
        matches!(self, Submission::Saved(_))
    }
}

/// Result of reaching for a post or comment only its author may change.
#[derive(Debug, Clone, PartialEq)]
pub enum Access<T> {
    /// The viewer wrote it.
    Granted(T),
    /// Somebody else wrote it; callers send the viewer back to the post.
    Denied { post_id: PostId },
}

impl<T> Access<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

/// Result of a form submission against an author-only post or comment.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The change was stored.
    Done(T),
    /// The submission was rejected; nothing was stored.
    Invalid(FormErrors),
    /// The viewer does not own the target; nothing was stored.
    Denied { post_id: PostId },
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

/// The storage ports a [`BlogService`] works against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

/// Posts of one published category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub posts: Page<PostListing>,
}

/// A user's profile and the posts the viewer may see.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub profile: User,
    pub is_owner: bool,
    pub posts: Page<PostListing>,
}

/// A single post with its comments.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostListing,
    pub is_author: bool,
    pub comments: Vec<CommentView>,
}

/// Options offered by the post form.
#[derive(Debug, Clone, Serialize)]
pub struct FormChoices {
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
}

pub struct BlogService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
    page_size: u64,
}

impl BlogService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            repos,
            clock,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Page request for the raw `page` query parameter.
    pub fn page_request(&self, raw: Option<&str>) -> PageRequest {
        PageRequest::from_query(raw, self.page_size)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
