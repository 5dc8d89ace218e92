//! Top-level router: service routes, `/api/v1` feature routes and the
//! middleware stack

pub mod response;

use crate::config::Config;
use crate::db;
use crate::features::{self, FeatureState};
use crate::middleware;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;

use response::ErrorResponse;

/// Build the application router.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` when
/// rate limiting is enabled.
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let pool = state.db.clone();
    let api_v1 = middleware::rate_limit::apply(features::router(state), &config.rate_limit);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(pool)
        .nest("/api/v1", api_v1)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Neurika Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// `200` with `{"status":"healthy"}` when the database answers, `503` otherwise
async fn health(State(pool): State<PgPool>) -> impl IntoResponse {
    match db::health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("UNAVAILABLE", "Database is not reachable")),
            )
                .into_response()
        },
    }
}
