use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, CategoryRef, LocationId, PostId, UserId, short_label};

/// Post entity - a blog publication, possibly scheduled for the future.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub text: String,
    /// Publication moment; a future value schedules the post.
    pub pub_date: DateTime<Utc>,
    /// Path of the uploaded picture, relative to the media root.
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author_id: UserId,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(short_label(&self.title))
    }
}

/// Data required to insert a new [`Post`].
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub is_published: bool,
    pub author_id: UserId,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
}

/// A post with the related rows a listing or detail page shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListing {
    pub post: Post,
    pub author_username: String,
    pub category: Option<CategoryRef>,
    pub location_name: Option<String>,
    pub comment_count: u64,
}
