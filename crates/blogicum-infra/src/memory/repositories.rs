use async_trait::async_trait;

use blogicum_core::domain::{
    Category, CategoryId, Comment, CommentId, CommentView, Location, LocationId, NewCategory,
    NewComment, NewLocation, NewPost, NewUser, Post, PostId, PostListing, User, UserId,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::PageRequest;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostRepository,
    UserRepository,
};
use blogicum_core::visibility::PostFilter;

use super::InMemoryStore;

fn duplicate(what: &str, value: &str) -> RepoError {
    RepoError::Constraint(format!("duplicate {what}: {value}"))
}

#[async_trait]
impl BaseRepository<User, UserId> for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.username_in_use(&user.username, Some(user.id)) {
            return Err(duplicate("username", &user.username));
        }
        tables.users.replace(user.id, user)
    }

    async fn delete(&self, id: UserId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(id)?;

        let authored: Vec<PostId> = tables
            .posts
            .rows
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            tables.drop_post(post_id);
        }
        tables.comments.rows.retain(|_, c| c.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.username_in_use(&user.username, None) {
            return Err(duplicate("username", &user.username));
        }
        let created_at = self.clock.now();
        Ok(tables.users.insert_with(|id| User {
            id,
            username: user.username,
            email: user.email,
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            password_hash: user.password_hash,
            created_at,
        }))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, CategoryId> for InMemoryStore {
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(id))
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.slug_in_use(&category.slug, Some(category.id)) {
            return Err(duplicate("slug", &category.slug));
        }
        tables.categories.replace(category.id, category)
    }

    async fn delete(&self, id: CategoryId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(id)?;
        for post in tables.posts.rows.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn create(&self, category: NewCategory) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.slug_in_use(&category.slug, None) {
            return Err(duplicate("slug", &category.slug));
        }
        let created_at = self.clock.now();
        Ok(tables.categories.insert_with(|id| Category {
            id,
            title: category.title,
            description: category.description,
            slug: category.slug,
            is_published: category.is_published,
            created_at,
        }))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .rows
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<_> = tables.categories.rows.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

#[async_trait]
impl BaseRepository<Location, LocationId> for InMemoryStore {
    async fn find_by_id(&self, id: LocationId) -> Result<Option<Location>, RepoError> {
        Ok(self.tables.read().await.locations.get(id))
    }

    async fn update(&self, location: Location) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.replace(location.id, location)
    }

    async fn delete(&self, id: LocationId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.locations.remove(id)?;
        for post in tables.posts.rows.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn create(&self, location: NewLocation) -> Result<Location, RepoError> {
        let mut tables = self.tables.write().await;
        let created_at = self.clock.now();
        Ok(tables.locations.insert_with(|id| Location {
            id,
            name: location.name,
            is_published: location.is_published,
            created_at,
        }))
    }

    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<_> = tables.locations.rows.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(id))
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.replace(post.id, post)
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.posts.remove(id)?;
        tables.drop_post(id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(format!(
                "unknown author {}",
                post.author_id
            )));
        }
        let created_at = self.clock.now();
        Ok(tables.posts.insert_with(|id| Post {
            id,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date,
            image: post.image,
            is_published: post.is_published,
            created_at,
            author_id: post.author_id,
            category_id: post.category_id,
            location_id: post.location_id,
        }))
    }

    async fn find_listing(&self, id: PostId) -> Result<Option<PostListing>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.rows.get(&id).map(|post| tables.listing(post)))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<PostListing>, u64), RepoError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Post> = tables
            .posts
            .rows
            .values()
            .filter(|post| filter.matches(post, tables.category_published(post)))
            .collect();
        matching.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        let count = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|post| tables.listing(post))
            .collect();
        Ok((items, count))
    }
}

#[async_trait]
impl BaseRepository<Comment, CommentId> for InMemoryStore {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(id))
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.replace(comment.id, comment)
    }

    async fn delete(&self, id: CommentId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(id).map(|_| ())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.rows.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "unknown post {}",
                comment.post_id
            )));
        }
        let created_at = self.clock.now();
        Ok(tables.comments.insert_with(|id| Comment {
            id,
            text: comment.text,
            created_at,
            post_id: comment.post_id,
            author_id: comment.author_id,
        }))
    }

    async fn list_for_post(&self, post_id: PostId) -> Result<Vec<CommentView>, RepoError> {
        Ok(self.tables.read().await.comments_for(post_id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeDelta, Utc};

    use blogicum_core::visibility::PostScope;

    use super::*;

    async fn seed(store: &InMemoryStore) -> (User, Category, Post) {
        let user = UserRepository::create(
            store,
            NewUser {
                username: "ada".to_string(),
                email: String::new(),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap();
        let category = CategoryRepository::create(
            store,
            NewCategory {
                title: "Travel".to_string(),
                description: String::new(),
                slug: "travel".to_string(),
                is_published: true,
            },
        )
        .await
        .unwrap();
        let post = PostRepository::create(
            store,
            NewPost {
                title: "Hello".to_string(),
                text: "World".to_string(),
                pub_date: Utc::now() - TimeDelta::hours(1),
                image: None,
                is_published: true,
                author_id: user.id,
                category_id: Some(category.id),
                location_id: None,
            },
        )
        .await
        .unwrap();
        (user, category, post)
    }

    #[tokio::test]
    async fn test_duplicate_username_is_constraint_error() {
        let store = InMemoryStore::new();
        seed(&store).await;

        let result = UserRepository::create(
            &store,
            NewUser {
                username: "ada".to_string(),
                email: String::new(),
                password_hash: "x".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_deleting_category_detaches_posts() {
        let store = InMemoryStore::new();
        let (_, category, post) = seed(&store).await;

        BaseRepository::<Category, CategoryId>::delete(&store, category.id)
            .await
            .unwrap();

        let post = BaseRepository::<Post, PostId>::find_by_id(&store, post.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.category_id, None);
    }

    #[tokio::test]
    async fn test_deleting_user_removes_posts_and_comments() {
        let store = Arc::new(InMemoryStore::new());
        let (user, _, post) = seed(&store).await;
        CommentRepository::create(
            store.as_ref(),
            NewComment {
                text: "Nice".to_string(),
                post_id: post.id,
                author_id: user.id,
            },
        )
        .await
        .unwrap();

        BaseRepository::<User, UserId>::delete(store.as_ref(), user.id)
            .await
            .unwrap();

        let repos = store.repositories();
        assert!(repos.posts.find_by_id(post.id).await.unwrap().is_none());
        assert!(repos.comments.list_for_post(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_counts_comments() {
        let store = InMemoryStore::new();
        let (user, _, post) = seed(&store).await;
        for text in ["one", "two"] {
            CommentRepository::create(
                &store,
                NewComment {
                    text: text.to_string(),
                    post_id: post.id,
                    author_id: user.id,
                },
            )
            .await
            .unwrap();
        }

        let filter = PostFilter::public(PostScope::All, Utc::now());
        let (items, count) = store.list(&filter, PageRequest::new(1, 10)).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(items[0].comment_count, 2);
        assert_eq!(items[0].author_username, "ada");
    }
}
