use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/vote/:id/:side", post(handlers::vote_form))
        .route("/hoodies", get(handlers::list_catalog))
        .route("/api/health", get(handlers::health))
        .route("/api/hoodies", get(handlers::list_hoodies))
        .route("/api/hoodies/:id", get(handlers::get_hoodie))
        .route("/api/hoodies/:id/vote", post(handlers::vote))
        .route("/api/results", get(handlers::get_results))
        .route("/api/shop", get(handlers::get_shop))
        .with_state(state);

    if origins.is_empty() {
        return app;
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
