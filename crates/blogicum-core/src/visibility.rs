//! Visibility gate - which posts a viewer may see.
//!
//! A post is public when it is published, its category is published and its
//! publication date has passed. Authors bypass the gate for their own posts.

use chrono::{DateTime, Utc};

use crate::domain::{CategoryId, Post, UserId, Viewer};

/// True when a non-author may see `post`.
///
/// `category_published` is `None` when the post has no category, which keeps
/// it hidden.
pub fn is_public(post: &Post, category_published: Option<bool>, now: DateTime<Utc>) -> bool {
    post.is_published && category_published == Some(true) && post.pub_date <= now
}

/// True when `viewer` may see `post`.
pub fn is_visible_to(
    post: &Post,
    category_published: Option<bool>,
    viewer: Viewer,
    now: DateTime<Utc>,
) -> bool {
    viewer.is(post.author_id) || is_public(post, category_published, now)
}

/// The set of posts a listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Category(CategoryId),
    Author(UserId),
}

/// A listing query: a scope, optionally restricted to public posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    pub scope: PostScope,
    /// When set, only posts public at this moment match.
    pub public_at: Option<DateTime<Utc>>,
}

impl PostFilter {
    /// Only posts public at `now`.
    pub fn public(scope: PostScope, now: DateTime<Utc>) -> Self {
        Self {
            scope,
            public_at: Some(now),
        }
    }

    /// Every post in scope, hidden or not.
    pub fn unrestricted(scope: PostScope) -> Self {
        Self {
            scope,
            public_at: None,
        }
    }

    /// Posts by `author` as seen by `viewer`: everything for the author, the
    /// public ones for anybody else.
    pub fn authored_by(author: UserId, viewer: Viewer, now: DateTime<Utc>) -> Self {
        let scope = PostScope::Author(author);
        if viewer.is(author) {
            Self::unrestricted(scope)
        } else {
            Self::public(scope, now)
        }
    }

    /// In-process evaluation of the filter, used by stores without a query language.
    pub fn matches(&self, post: &Post, category_published: Option<bool>) -> bool {
        let in_scope = match self.scope {
            PostScope::All => true,
            PostScope::Category(id) => post.category_id == Some(id),
            PostScope::Author(id) => post.author_id == id,
        };
        in_scope
            && self
                .public_at
                .is_none_or(|now| is_public(post, category_published, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(author_id: UserId, is_published: bool, pub_date: DateTime<Utc>) -> Post {
        Post {
            id: 1,
            title: "Title".to_string(),
            text: "Text".to_string(),
            pub_date,
            image: None,
            is_published,
            created_at: pub_date,
            author_id,
            category_id: Some(3),
            location_id: None,
        }
    }

    #[test]
    fn test_public_requires_all_three_conditions() {
        let now = Utc::now();
        let past = now - Duration::hours(1);
        let future = now + Duration::hours(1);

        assert!(is_public(&post(1, true, past), Some(true), now));
        assert!(!is_public(&post(1, false, past), Some(true), now));
        assert!(!is_public(&post(1, true, past), Some(false), now));
        assert!(!is_public(&post(1, true, future), Some(true), now));
    }

    #[test]
    fn test_post_without_category_is_hidden() {
        let now = Utc::now();
        assert!(!is_public(&post(1, true, now), None, now));
    }

    #[test]
    fn test_pub_date_equal_to_now_is_public() {
        let now = Utc::now();
        assert!(is_public(&post(1, true, now), Some(true), now));
    }

    #[test]
    fn test_author_bypasses_gate() {
        let now = Utc::now();
        let hidden = post(5, false, now + Duration::days(1));

        assert!(is_visible_to(&hidden, Some(false), Viewer::User(5), now));
        assert!(!is_visible_to(&hidden, Some(false), Viewer::User(6), now));
        assert!(!is_visible_to(&hidden, Some(false), Viewer::Anonymous, now));
    }

    #[test]
    fn test_authored_by_filter_depends_on_viewer() {
        let now = Utc::now();
        let hidden = post(5, false, now);

        let own = PostFilter::authored_by(5, Viewer::User(5), now);
        assert_eq!(own.public_at, None);
        assert!(own.matches(&hidden, Some(true)));

        let other = PostFilter::authored_by(5, Viewer::User(9), now);
        assert_eq!(other.public_at, Some(now));
        assert!(!other.matches(&hidden, Some(true)));
    }

    #[test]
    fn test_scope_filters_by_category() {
        let now = Utc::now();
        let p = post(1, true, now - Duration::minutes(5));

        assert!(PostFilter::public(PostScope::Category(3), now).matches(&p, Some(true)));
        assert!(!PostFilter::public(PostScope::Category(4), now).matches(&p, Some(true)));
    }
}
