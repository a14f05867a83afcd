pub mod creatures;

use axum::{http::StatusCode, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

use common::{metrics, types::Health};

use crate::startup::AppState;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn prometheus_metrics() -> (StatusCode, String) {
    match metrics::encode_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "metrics encode failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Catalog routes relative to the configured prefix.
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/creatures", get(creatures::list).post(creatures::create))
        .route(
            "/creatures/:id",
            get(creatures::get_one)
                .patch(creatures::update)
                .delete(creatures::remove),
        )
}

/// Build the application router; `prefix` is a normalized path such as `/api` or `/`.
pub fn build_router(state: AppState, cors: CorsLayer, prefix: &str) -> Router {
    let api = if prefix == "/" || prefix.is_empty() {
        catalog_routes()
    } else {
        Router::new().nest(prefix, catalog_routes())
    };

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx responses are logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
