//! Authentication extractors.
//!
//! The session token travels in the `blogicum_session` cookie set at login,
//! or in an `Authorization: Bearer` header for API clients.

use std::fmt;
use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};

use blogicum_core::domain::{UserId, Viewer};
use blogicum_core::ports::{AuthError, TokenClaims, TokenService};

use crate::state::AppState;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "blogicum_session";

/// Where anonymous visitors are sent to sign in.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Authenticated user identity extractor.
///
/// Handlers taking an `Identity` only run for signed-in users; anybody else
/// is redirected to the login page with a `next` parameter pointing back.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    pub fn viewer(&self) -> Viewer {
        Viewer::User(self.user_id)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Login URL that returns to `next` afterwards.
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={next}")
}

/// Rejection of an anonymous request to a protected route.
#[derive(Debug)]
pub struct LoginRequired {
    pub next: String,
    pub cause: AuthError,
}

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login required: {}", self.cause)
    }
}

impl actix_web::ResponseError for LoginRequired {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, login_url(&self.next)))
            .finish()
    }
}

/// A Bearer header wins; any other `Authorization` scheme is ignored in
/// favour of the session cookie.
fn session_token(req: &HttpRequest) -> Result<String, AuthError> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Ok(token.to_string());
    }

    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAuth)
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not found in app data");
        return Err(AuthError::InvalidToken(
            "Server configuration error".to_string(),
        ));
    };

    let token = session_token(req)?;
    state.tokens.validate_token(&token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|cause| {
            tracing::debug!(path = req.path(), error = %cause, "Login required");
            LoginRequired {
                next: req.path().to_string(),
                cause,
            }
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Viewer {
        self.0.as_ref().map_or(Viewer::Anonymous, Identity::viewer)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn test_login_url_carries_next() {
        assert_eq!(login_url("/posts/create/"), "/auth/login/?next=/posts/create/");
    }

    #[test]
    fn test_bearer_header_preferred_over_cookie() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer header-token"))
            .cookie(Cookie::new(SESSION_COOKIE, "cookie-token"))
            .to_http_request();
        assert_eq!(session_token(&req).unwrap(), "header-token");
    }

    #[test]
    fn test_other_schemes_fall_back_to_cookie() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic YWRhOnNlY3JldA=="))
            .cookie(Cookie::new(SESSION_COOKIE, "cookie-token"))
            .to_http_request();
        assert_eq!(session_token(&req).unwrap(), "cookie-token");

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic YWRhOnNlY3JldA=="))
            .to_http_request();
        assert!(matches!(session_token(&req), Err(AuthError::MissingAuth)));
    }
}
