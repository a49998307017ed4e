//! Comment routes, all nested under their post.

use actix_web::{HttpResponse, web};

use blogicum_core::{Access, Outcome, Submission};
use blogicum_core::domain::{Comment, CommentId, PostId};
use blogicum_core::forms::{CommentForm, FormErrors};
use blogicum_shared::dto::FormContext;

use super::views::{post_url, redirect, render};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const TEMPLATE: &str = "blog/comment.html";

fn rejected(post_id: PostId, errors: &FormErrors) -> HttpResponse {
    tracing::debug!(post_id, fields = ?errors.fields().collect::<Vec<_>>(), "Comment rejected");
    redirect(post_url(post_id))
}

/// A comment edit ends on the post whatever happened to it.
fn back_to_post<T>(post_id: PostId, outcome: Outcome<T>) -> HttpResponse {
    match outcome {
        Outcome::Invalid(errors) => rejected(post_id, &errors),
        Outcome::Done(_) => redirect(post_url(post_id)),
        Outcome::Denied { post_id } => redirect(post_url(post_id)),
    }
}

fn comment_page(comment: &Comment, form: Option<CommentForm>) -> HttpResponse {
    let instance = serde_json::to_value(comment).unwrap_or_default();
    render(TEMPLATE, FormContext::new(form).with_instance(instance))
}

/// POST /posts/{id}/comment/
pub async fn add(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    identity: Identity,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    Ok(
        match state
            .blog
            .add_comment(post_id, identity.user_id, &form)
            .await?
        {
            Submission::Saved(_) => redirect(post_url(post_id)),
            Submission::Invalid(errors) => rejected(post_id, &errors),
        },
    )
}

/// GET /posts/{id}/edit_comment/{comment_id}/
pub async fn edit_form(
    state: web::Data<AppState>,
    path: web::Path<(PostId, CommentId)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    Ok(
        match state
            .blog
            .comment_for_edit(post_id, comment_id, identity.user_id)
            .await?
        {
            Access::Granted(comment) => {
                comment_page(&comment, Some(CommentForm::from_comment(&comment)))
            }
            Access::Denied { post_id } => redirect(post_url(post_id)),
        },
    )
}

/// POST /posts/{id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<(PostId, CommentId)>,
    identity: Identity,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let outcome = state
        .blog
        .edit_comment(post_id, comment_id, identity.user_id, &form)
        .await?;
    Ok(back_to_post(post_id, outcome))
}

/// GET /posts/{id}/delete_comment/{comment_id}/
pub async fn delete_form(
    state: web::Data<AppState>,
    path: web::Path<(PostId, CommentId)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    Ok(
        match state
            .blog
            .comment_for_edit(post_id, comment_id, identity.user_id)
            .await?
        {
            Access::Granted(comment) => comment_page(&comment, None),
            Access::Denied { post_id } => redirect(post_url(post_id)),
        },
    )
}

/// POST /posts/{id}/delete_comment/{comment_id}/
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<(PostId, CommentId)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    Ok(
        match state
            .blog
            .delete_comment(post_id, comment_id, identity.user_id)
            .await?
        {
            Access::Granted(_) => redirect(post_url(post_id)),
            Access::Denied { post_id } => redirect(post_url(post_id)),
        },
    )
}
