//! Static pages and the not-found fallback.

use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

use blogicum_shared::ErrorResponse;

use super::views::render;
use crate::observability::RequestId;

/// GET /pages/about/
pub async fn about() -> HttpResponse {
    render("pages/about.html", json!({}))
}

/// GET /pages/rules/
pub async fn rules() -> HttpResponse {
    render("pages/rules.html", json!({}))
}

/// Any route nobody claimed.
pub async fn not_found(req: HttpRequest, request_id: RequestId) -> HttpResponse {
    tracing::debug!(path = req.path(), "No route matched");
    HttpResponse::NotFound().json(
        ErrorResponse::not_found(format!("{} does not exist", req.path()))
            .with_request_id(request_id.as_str()),
    )
}
