//! PostgreSQL repository implementations.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

use blogicum_core::Repositories;
use blogicum_core::domain::{
    Category, CategoryRef, Comment, CommentView, Location, NewCategory, NewComment, NewLocation,
    NewPost, NewUser, Post, PostId, PostListing, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::PageRequest;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_core::visibility::{PostFilter, PostScope};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// Every repository backed by one connection pool.
pub fn postgres_repositories(db: DbConn) -> Repositories {
    Repositories {
        users: Arc::new(PostgresUserRepository::new(db.clone())),
        categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
        locations: Arc::new(PostgresLocationRepository::new(db.clone())),
        posts: Arc::new(PostgresPostRepository::new(db.clone())),
        comments: Arc::new(PostgresCommentRepository::new(db)),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, category: NewCategory) -> Result<Category, RepoError> {
        let model = category::ActiveModel::from(category)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn create(&self, location: NewLocation) -> Result<Location, RepoError> {
        let model = location::ActiveModel::from(location)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, FromQueryResult)]
struct CommentCount {
    post_id: i32,
    comment_count: i64,
}

impl PostgresPostRepository {
    /// Load authors, categories, locations and comment counts for `posts`,
    /// keeping their order.
    async fn attach_related(&self, posts: Vec<post::Model>) -> Result<Vec<PostListing>, RepoError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<PostId> = posts.iter().map(|p| p.id).collect();
        let author_ids: BTreeSet<i32> = posts.iter().map(|p| p.author_id).collect();
        let category_ids: BTreeSet<i32> = posts.iter().filter_map(|p| p.category_id).collect();
        let location_ids: BTreeSet<i32> = posts.iter().filter_map(|p| p.location_id).collect();

        let authors: HashMap<i32, String> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let categories: HashMap<i32, CategoryRef> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|c| (c.id, Category::from(c).to_ref()))
                .collect()
        };

        let locations: HashMap<i32, String> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            LocationEntity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|l| (l.id, l.name))
                .collect()
        };

        let counts: HashMap<i32, u64> = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(
                Expr::col((CommentEntity, comment::Column::Id)).count(),
                "comment_count",
            )
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_model::<CommentCount>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|c| (c.post_id, u64::try_from(c.comment_count).unwrap_or_default()))
            .collect();

        Ok(posts
            .into_iter()
            .map(|model| {
                let post = Post::from(model);
                PostListing {
                    author_username: authors.get(&post.author_id).cloned().unwrap_or_default(),
                    category: post.category_id.and_then(|id| categories.get(&id).cloned()),
                    location_name: post.location_id.and_then(|id| locations.get(&id).cloned()),
                    comment_count: counts.get(&post.id).copied().unwrap_or(0),
                    post,
                }
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_listing(&self, id: PostId) -> Result<Option<PostListing>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(self.attach_related(vec![model]).await?.pop())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<PostListing>, u64), RepoError> {
        let mut select = match filter.scope {
            PostScope::All => PostEntity::find(),
            PostScope::Category(id) => PostEntity::find().filter(post::Column::CategoryId.eq(id)),
            PostScope::Author(id) => PostEntity::find().filter(post::Column::AuthorId.eq(id)),
        };

        if let Some(now) = filter.public_at {
            select = select
                .join(
                    sea_orm::JoinType::InnerJoin,
                    post::Relation::Category.def(),
                )
                .filter(post::Column::IsPublished.eq(true))
                .filter(category::Column::IsPublished.eq(true))
                .filter(post::Column::PubDate.lte(now));
        }

        let count = select.clone().count(&self.db).await.map_err(map_db_err)?;
        if count == 0 || page.offset() >= count {
            return Ok((Vec::new(), count));
        }

        let posts = select
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok((self.attach_related(posts).await?, count))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(comment)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<CommentView>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(comment, author)| CommentView {
                comment: comment.into(),
                author_username: author.map(|u| u.username).unwrap_or_default(),
            })
            .collect())
    }
}
