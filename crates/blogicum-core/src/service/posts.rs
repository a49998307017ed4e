use super::{Access, BlogService, FormChoices, Outcome, PostDetail, Submission};
use crate::domain::{NewPost, Post, PostId, PostListing, UserId, Viewer};
use crate::error::DomainError;
use crate::forms::{CleanPost, FormErrors, INVALID_CHOICE, PostForm};
use crate::ports::BaseRepository;
use crate::visibility::is_visible_to;

impl BlogService {
    /// A post the viewer may see, with its comments oldest first.
    pub async fn post_detail(&self, id: PostId, viewer: Viewer) -> Result<PostDetail, DomainError> {
        let post = self.visible_post(id, viewer).await?;
        let comments = self.repos.comments.list_for_post(id).await?;
        Ok(PostDetail {
            is_author: viewer.is(post.post.author_id),
            post,
            comments,
        })
    }

    /// Categories and locations offered by the post form.
    pub async fn form_choices(&self) -> Result<FormChoices, DomainError> {
        Ok(FormChoices {
            categories: self.repos.categories.list_all().await?,
            locations: self.repos.locations.list_all().await?,
        })
    }

    /// Store a new post written by `author`.
    pub async fn create_post(
        &self,
        author: UserId,
        form: &PostForm,
    ) -> Result<Submission<Post>, DomainError> {
        let clean = match self.clean_post(form).await? {
            Ok(clean) => clean,
            Err(errors) => return Ok(Submission::Invalid(errors)),
        };

        let post = self
            .repos
            .posts
            .create(NewPost {
                title: clean.title,
                text: clean.text,
                pub_date: clean.pub_date,
                image: clean.image,
                is_published: clean.is_published,
                author_id: author,
                category_id: Some(clean.category_id),
                location_id: clean.location_id,
            })
            .await?;

        tracing::info!(post_id = post.id, author_id = author, "Post created");
        Ok(Submission::Saved(post))
    }

    /// The post `editor` wants to change, if they wrote it.
    pub async fn post_for_edit(
        &self,
        id: PostId,
        editor: UserId,
    ) -> Result<Access<Post>, DomainError> {
        let post = self.find_post(id).await?;
        if post.author_id != editor {
            tracing::warn!(post_id = id, user_id = editor, "Post change by non-author refused");
            return Ok(Access::Denied { post_id: id });
        }
        Ok(Access::Granted(post))
    }

    pub async fn edit_post(
        &self,
        id: PostId,
        editor: UserId,
        form: &PostForm,
    ) -> Result<Outcome<Post>, DomainError> {
        let post = match self.post_for_edit(id, editor).await? {
            Access::Granted(post) => post,
            Access::Denied { post_id } => return Ok(Outcome::Denied { post_id }),
        };
        let clean = match self.clean_post(form).await? {
            Ok(clean) => clean,
            Err(errors) => return Ok(Outcome::Invalid(errors)),
        };

        let updated = self
            .repos
            .posts
            .update(Post {
                title: clean.title,
                text: clean.text,
                pub_date: clean.pub_date,
                image: clean.image,
                is_published: clean.is_published,
                category_id: Some(clean.category_id),
                location_id: clean.location_id,
                ..post
            })
            .await?;

        tracing::info!(post_id = id, "Post updated");
        Ok(Outcome::Done(updated))
    }

    /// Hard-delete a post and, with it, its comments.
    pub async fn delete_post(
        &self,
        id: PostId,
        editor: UserId,
    ) -> Result<Access<Post>, DomainError> {
        let post = match self.post_for_edit(id, editor).await? {
            Access::Granted(post) => post,
            denied => return Ok(denied),
        };
        self.repos.posts.delete(id).await?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(Access::Granted(post))
    }

    async fn find_post(&self, id: PostId) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    /// Hidden posts are reported exactly like missing ones.
    pub(super) async fn visible_post(
        &self,
        id: PostId,
        viewer: Viewer,
    ) -> Result<PostListing, DomainError> {
        let listing = self
            .repos
            .posts
            .find_listing(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))?;

        let category_published = listing.category.as_ref().map(|c| c.is_published);
        if !is_visible_to(&listing.post, category_published, viewer, self.now()) {
            return Err(DomainError::not_found("post", id));
        }
        Ok(listing)
    }

    /// Field checks plus existence of the chosen category and location.
    async fn clean_post(&self, form: &PostForm) -> Result<Result<CleanPost, FormErrors>, DomainError> {
        let clean = match form.clean(self.now()) {
            Ok(clean) => clean,
            Err(errors) => return Ok(Err(errors)),
        };

        let mut errors = FormErrors::new();
        if self
            .repos
            .categories
            .find_by_id(clean.category_id)
            .await?
            .is_none()
        {
            errors.add("category", INVALID_CHOICE);
        }
        if let Some(location_id) = clean.location_id {
            if self.repos.locations.find_by_id(location_id).await?.is_none() {
                errors.add("location", INVALID_CHOICE);
            }
        }
        Ok(errors.into_result(clean))
    }
}
