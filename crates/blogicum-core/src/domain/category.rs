use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, short_label};

/// Category entity - an administrator-managed grouping of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub description: String,
    /// URL identifier: latin letters, digits, hyphen and underscore.
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            is_published: self.is_published,
        }
    }

    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(short_label(&self.title))
    }
}

/// The slice of a category carried alongside a listed post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_charset() {
        assert!(Category::is_valid_slug("travel_2024-notes"));
        assert!(!Category::is_valid_slug(""));
        assert!(!Category::is_valid_slug("путешествия"));
        assert!(!Category::is_valid_slug("with space"));
    }
}
