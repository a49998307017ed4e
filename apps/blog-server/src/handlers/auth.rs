//! Account handlers: registration, login and logout.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;

use blogicum_core::Submission;
use blogicum_core::forms::{FormErrors, LoginForm, RegistrationForm};
use blogicum_core::ports::TokenService;
use blogicum_shared::dto::{AuthResponse, FormContext};

use super::views::{redirect, render};
use crate::middleware::auth::SESSION_COOKIE;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const REGISTRATION_TEMPLATE: &str = "registration/registration_form.html";
const LOGIN_TEMPLATE: &str = "registration/login.html";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Only same-site paths are followed after login. Browsers read `\` as
/// `/`, so `/\host` would leave the site too.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// GET /auth/registration/
pub async fn registration_form() -> HttpResponse {
    render(
        REGISTRATION_TEMPLATE,
        FormContext::new(RegistrationForm::default()),
    )
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    Ok(
        match state.blog.register(&form, state.passwords.as_ref()).await? {
            Submission::Saved(user) => {
                tracing::info!(username = %user.username, "Registration completed");
                redirect("/")
            }
            Submission::Invalid(errors) => render(
                REGISTRATION_TEMPLATE,
                FormContext::new(form).with_errors(errors.into_map()),
            ),
        },
    )
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

/// GET /auth/login/
pub async fn login_form(query: web::Query<NextQuery>) -> HttpResponse {
    let form = LoginForm {
        next: query.into_inner().next,
        ..LoginForm::default()
    };
    render(LOGIN_TEMPLATE, FormContext::new(form))
}

/// POST /auth/login/
///
/// Sets the session cookie and redirects to `next`. The body carries the
/// token as well, for clients that prefer a Bearer header.
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let user = state
        .blog
        .authenticate(&form.username, &form.password, state.passwords.as_ref())
        .await?;

    let Some(user) = user else {
        tracing::info!(username = %form.username, "Login failed");
        let mut errors = FormErrors::new();
        errors.add("__all__", BAD_CREDENTIALS);
        return Ok(render(
            LOGIN_TEMPLATE,
            FormContext::new(form).with_errors(errors.into_map()),
        ));
    };

    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(AppError::from)?;
    let expires_in = state.tokens.expiration_seconds();

    tracing::info!(user_id = user.id, "User logged in");
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, safe_next(form.next.as_deref())))
        .cookie(session_cookie(token.clone(), expires_in))
        .json(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: u64::try_from(expires_in).unwrap_or_default(),
        }))
}

/// POST /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut expired = session_cookie(String::new(), 0);
    expired.make_removal();

    HttpResponse::Ok()
        .cookie(expired)
        .json(blogicum_shared::Document::new(
            "registration/logged_out.html",
            serde_json::json!({}),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_rejects_foreign_targets() {
        assert_eq!(safe_next(Some("/posts/1/")), "/posts/1/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("/posts/\\1/")), "/");
        assert_eq!(safe_next(Some("/\t/evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
