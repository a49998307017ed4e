//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;
mod viewer;

pub use category::{Category, CategoryRef, NewCategory};
pub use comment::{Comment, CommentView, NewComment};
pub use location::{Location, NewLocation};
pub use post::{NewPost, Post, PostListing};
pub use user::{NewUser, User};
pub use viewer::Viewer;

pub type UserId = i32;
pub type CategoryId = i32;
pub type LocationId = i32;
pub type PostId = i32;
pub type CommentId = i32;

/// Number of characters shown when an entity is printed as a short label.
pub const LABEL_LIMIT: usize = 30;

pub(crate) fn short_label(text: &str) -> &str {
    match text.char_indices().nth(LABEL_LIMIT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
