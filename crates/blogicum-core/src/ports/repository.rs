use async_trait::async_trait;

use crate::domain::{
    Category, CategoryId, Comment, CommentId, CommentView, Location, LocationId, NewCategory,
    NewComment, NewLocation, NewPost, NewUser, Post, PostId, PostListing, User, UserId,
};
use crate::error::RepoError;
use crate::pagination::PageRequest;
use crate::visibility::PostFilter;

/// Generic repository trait defining the operations every table supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Overwrite a stored entity. Fails with [`RepoError::NotFound`] if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Hard-delete an entity by its ID, cascading as the schema dictates.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, UserId> {
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository. Deleting a category detaches its posts.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, CategoryId> {
    async fn create(&self, category: NewCategory) -> Result<Category, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Every category, for form choices, ordered by title.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

/// Location repository. Deleting a location detaches its posts.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, LocationId> {
    async fn create(&self, location: NewLocation) -> Result<Location, RepoError>;

    /// Every location, for form choices, ordered by name.
    async fn list_all(&self) -> Result<Vec<Location>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// A single post with its related rows and comment count.
    async fn find_listing(&self, id: PostId) -> Result<Option<PostListing>, RepoError>;

    /// One page of posts matching `filter`, newest `pub_date` first, plus the
    /// total number of matches.
    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<PostListing>, u64), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, CommentId> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments under a post, oldest first.
    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<CommentView>, RepoError>;
}
