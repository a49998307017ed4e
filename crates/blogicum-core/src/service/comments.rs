use super::{Access, BlogService, Outcome, Submission};
use crate::domain::{Comment, CommentId, NewComment, PostId, UserId, Viewer};
use crate::error::DomainError;
use crate::forms::CommentForm;
use crate::ports::BaseRepository;

impl BlogService {
    /// Comment on a post the author is allowed to see.
    pub async fn add_comment(
        &self,
        post_id: PostId,
        author: UserId,
        form: &CommentForm,
    ) -> Result<Submission<Comment>, DomainError> {
        self.visible_post(post_id, Viewer::User(author)).await?;

        let text = match form.clean() {
            Ok(text) => text,
            Err(errors) => return Ok(Submission::Invalid(errors)),
        };

        let comment = self
            .repos
            .comments
            .create(NewComment {
                text,
                post_id,
                author_id: author,
            })
            .await?;

        tracing::info!(post_id, comment_id = comment.id, author_id = author, "Comment added");
        Ok(Submission::Saved(comment))
    }

    /// The comment `editor` wants to change, if they wrote it.
    ///
    /// A comment that exists but hangs under another post is not found.
    pub async fn comment_for_edit(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        editor: UserId,
    ) -> Result<Access<Comment>, DomainError> {
        let comment = self
            .repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;

        if comment.author_id != editor {
            tracing::warn!(
                post_id,
                comment_id,
                user_id = editor,
                "Comment change by non-author refused"
            );
            return Ok(Access::Denied { post_id });
        }
        Ok(Access::Granted(comment))
    }

    pub async fn edit_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        editor: UserId,
        form: &CommentForm,
    ) -> Result<Outcome<Comment>, DomainError> {
        let comment = match self.comment_for_edit(post_id, comment_id, editor).await? {
            Access::Granted(comment) => comment,
            Access::Denied { post_id } => return Ok(Outcome::Denied { post_id }),
        };
        let text = match form.clean() {
            Ok(text) => text,
            Err(errors) => return Ok(Outcome::Invalid(errors)),
        };

        let updated = self
            .repos
            .comments
            .update(Comment { text, ..comment })
            .await?;
        tracing::info!(post_id, comment_id, "Comment updated");
        Ok(Outcome::Done(updated))
    }

    pub async fn delete_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        editor: UserId,
    ) -> Result<Access<Comment>, DomainError> {
        let comment = match self.comment_for_edit(post_id, comment_id, editor).await? {
            Access::Granted(comment) => comment,
            denied => return Ok(denied),
        };
        self.repos.comments.delete(comment_id).await?;
        tracing::info!(post_id, comment_id, "Comment deleted");
        Ok(Access::Granted(comment))
    }
}
