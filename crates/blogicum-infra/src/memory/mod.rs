//! In-memory store - used when no database is configured, and in tests.
//!
//! Mirrors the relational schema: usernames and category slugs are unique,
//! deleting a user or a post cascades to what hangs off it, deleting a
//! category or location detaches its posts.
//! Note: Data is lost on process restart.

mod repositories;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use blogicum_core::Repositories;
use blogicum_core::domain::{
    Category, Comment, CommentView, Location, Post, PostId, PostListing, User, UserId,
};
use blogicum_core::error::RepoError;
use blogicum_core::ports::Clock;

use crate::clock::SystemClock;

/// Rows of one table keyed by an auto-increment id.
struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn replace(&mut self, id: i32, row: T) -> Result<T, RepoError> {
        let slot = self.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        *slot = row.clone();
        Ok(row)
    }

    fn remove(&mut self, id: i32) -> Result<T, RepoError> {
        self.rows.remove(&id).ok_or(RepoError::NotFound)
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    categories: Table<Category>,
    locations: Table<Location>,
    posts: Table<Post>,
    comments: Table<Comment>,
}

impl Tables {
    fn username_of(&self, id: UserId) -> String {
        self.users
            .rows
            .get(&id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn category_published(&self, post: &Post) -> Option<bool> {
        post.category_id
            .and_then(|id| self.categories.rows.get(&id))
            .map(|c| c.is_published)
    }

    fn listing(&self, post: &Post) -> PostListing {
        PostListing {
            author_username: self.username_of(post.author_id),
            category: post
                .category_id
                .and_then(|id| self.categories.rows.get(&id))
                .map(Category::to_ref),
            location_name: post
                .location_id
                .and_then(|id| self.locations.rows.get(&id))
                .map(|l| l.name.clone()),
            comment_count: self
                .comments
                .rows
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as u64,
            post: post.clone(),
        }
    }

    fn comments_for(&self, post_id: PostId) -> Vec<CommentView> {
        let mut comments: Vec<_> = self
            .comments
            .rows
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        comments
            .into_iter()
            .map(|comment| CommentView {
                author_username: self.username_of(comment.author_id),
                comment,
            })
            .collect()
    }

    fn username_in_use(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .rows
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    fn slug_in_use(&self, slug: &str, except: Option<i32>) -> bool {
        self.categories
            .rows
            .values()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }

    fn drop_post(&mut self, post_id: PostId) {
        self.posts.rows.remove(&post_id);
        self.comments.rows.retain(|_, c| c.post_id != post_id);
    }
}

/// Thread-safe store behind every repository port, guarded by an async RwLock.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// A store stamping `created_at` from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }

    /// Every repository port, all backed by this store.
    pub fn repositories(self: Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            categories: self.clone(),
            locations: self.clone(),
            posts: self.clone(),
            comments: self,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
