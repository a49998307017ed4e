//! Post pages: detail, create, edit and delete.

use actix_web::{HttpResponse, web};

use blogicum_core::{Access, Outcome, Submission};
use blogicum_core::domain::{Post, PostId};
use blogicum_core::forms::{CommentForm, FormErrors, PostForm};
use blogicum_shared::dto::{FormContext, PostContext};

use super::views::{choices, comment_item, post_card, post_url, profile_url, redirect, render};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

const FORM_TEMPLATE: &str = "blog/create.html";

/// GET /posts/{id}/
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let detail = state
        .blog
        .post_detail(path.into_inner(), identity.viewer())
        .await?;

    // Only signed-in viewers get the comment form.
    let form = identity
        .0
        .is_some()
        .then(|| serde_json::to_value(CommentForm::default()).unwrap_or_default());

    Ok(render(
        "blog/detail.html",
        PostContext {
            post: post_card(&detail.post),
            is_author: detail.is_author,
            comments: detail.comments.iter().map(comment_item).collect(),
            form,
        },
    ))
}

async fn form_page(
    state: &AppState,
    form: PostForm,
    errors: Option<FormErrors>,
) -> AppResult<HttpResponse> {
    let options = state.blog.form_choices().await?;
    let mut context = FormContext::new(form).with_choices(choices(options));
    if let Some(errors) = errors {
        context = context.with_errors(errors.into_map());
    }
    Ok(render(FORM_TEMPLATE, context))
}

/// Where the signed-in user lands after creating or deleting a post.
async fn own_profile(state: &AppState, identity: &Identity) -> AppResult<HttpResponse> {
    let user = state.blog.current_user(identity.user_id).await?;
    Ok(redirect(profile_url(&user.username)))
}

/// GET /posts/create/
pub async fn create_form(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    form_page(&state, PostForm::default(), None).await
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    tracing::debug!(username = %identity.username, "Post submitted");
    match state.blog.create_post(identity.user_id, &form).await? {
        Submission::Saved(_) => own_profile(&state, &identity).await,
        Submission::Invalid(errors) => form_page(&state, form, Some(errors)).await,
    }
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    match state.blog.post_for_edit(path.into_inner(), identity.user_id).await? {
        Access::Granted(post) => form_page(&state, PostForm::from_post(&post), None).await,
        Access::Denied { post_id } => Ok(redirect(post_url(post_id))),
    }
}

/// POST /posts/{id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    match state
        .blog
        .edit_post(path.into_inner(), identity.user_id, &form)
        .await?
    {
        Outcome::Done(post) => Ok(redirect(post_url(post.id))),
        Outcome::Invalid(errors) => form_page(&state, form, Some(errors)).await,
        Outcome::Denied { post_id } => Ok(redirect(post_url(post_id))),
    }
}

fn delete_page(post: &Post) -> HttpResponse {
    let instance = serde_json::to_value(post).unwrap_or_default();
    render(
        FORM_TEMPLATE,
        FormContext::new(PostForm::from_post(post)).with_instance(instance),
    )
}

/// GET /posts/{id}/delete/
pub async fn delete_form(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    Ok(match state.blog.post_for_edit(path.into_inner(), identity.user_id).await? {
        Access::Granted(post) => delete_page(&post),
        Access::Denied { post_id } => redirect(post_url(post_id)),
    })
}

/// POST /posts/{id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    match state.blog.delete_post(path.into_inner(), identity.user_id).await? {
        Access::Granted(_) => own_profile(&state, &identity).await,
        Access::Denied { post_id } => Ok(redirect(post_url(post_id))),
    }
}
