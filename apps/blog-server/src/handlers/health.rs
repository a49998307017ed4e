//! Health check endpoint.

use actix_web::{HttpResponse, web};

use blogicum_shared::dto::HealthResponse;

use crate::state::AppState;

/// Liveness probe. Reports degraded when the database stops answering.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    #[cfg(feature = "postgres")]
    let healthy = match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database ping failed");
                false
            }
        },
        None => true,
    };
    #[cfg(not(feature = "postgres"))]
    let healthy = true;

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage().to_string(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
