//! Profile pages.

use actix_web::{HttpRequest, HttpResponse, web};

use blogicum_core::Submission;
use blogicum_core::forms::ProfileForm;
use blogicum_shared::dto::{FormContext, ProfileContext};

use super::views::{page_param, paginated, profile_url, profile_view, redirect, render};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

const EDIT_TEMPLATE: &str = "blog/user.html";

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    identity: OptionalIdentity,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let page = state.blog.page_request(page_param(&req).as_deref());
    let listing = state
        .blog
        .profile(&username, identity.viewer(), page)
        .await?;

    Ok(render(
        "blog/profile.html",
        ProfileContext {
            profile: profile_view(&listing.profile),
            is_owner: listing.is_owner,
            page_obj: paginated(listing.posts),
        },
    ))
}

/// GET /profile/edit/
pub async fn edit_profile_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state.blog.current_user(identity.user_id).await?;
    Ok(render(
        EDIT_TEMPLATE,
        FormContext::new(ProfileForm::from_user(&user)),
    ))
}

/// POST /profile/edit/
pub async fn edit_profile(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<ProfileForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    Ok(match state.blog.edit_profile(identity.user_id, &form).await? {
        Submission::Saved(user) => redirect(profile_url(&user.username)),
        Submission::Invalid(errors) => render(
            EDIT_TEMPLATE,
            FormContext::new(form).with_errors(errors.into_map()),
        ),
    })
}
