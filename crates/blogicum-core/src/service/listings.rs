use super::{BlogService, CategoryPage, ProfilePage};
use crate::domain::{Category, PostListing, Viewer};
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest};
use crate::visibility::{PostFilter, PostScope};

impl BlogService {
    /// Public posts across all categories.
    pub async fn index(&self, page: PageRequest) -> Result<Page<PostListing>, DomainError> {
        let filter = PostFilter::public(PostScope::All, self.now());
        self.list(&filter, page).await
    }

    /// Public posts of a published category. Unpublished categories are
    /// not found, whoever asks.
    pub async fn category_posts(
        &self,
        slug: &str,
        page: PageRequest,
    ) -> Result<CategoryPage, DomainError> {
        if !Category::is_valid_slug(slug) {
            return Err(DomainError::not_found("category", slug));
        }
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let filter = PostFilter::public(PostScope::Category(category.id), self.now());
        let posts = self.list(&filter, page).await?;
        Ok(CategoryPage { category, posts })
    }

    /// A user's posts: all of them for the owner, public ones for others.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Viewer,
        page: PageRequest,
    ) -> Result<ProfilePage, DomainError> {
        let profile = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let filter = PostFilter::authored_by(profile.id, viewer, self.now());
        let posts = self.list(&filter, page).await?;
        Ok(ProfilePage {
            is_owner: viewer.is(profile.id),
            profile,
            posts,
        })
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostListing>, DomainError> {
        let (items, count) = self.repos.posts.list(filter, page).await?;
        tracing::debug!(
            scope = ?filter.scope,
            gated = filter.public_at.is_some(),
            page = page.number,
            count,
            "Listed posts"
        );
        Ok(Page::new(items, page, count))
    }
}
