use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentId, PostId, UserId, short_label};

/// Comment entity - text left by a user under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub post_id: PostId,
    pub author_id: UserId,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(short_label(&self.text))
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub post_id: PostId,
    pub author_id: UserId,
}

/// A comment together with its author's username, as shown under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author_username: String,
}
