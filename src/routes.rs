use axum::http::Method;
use axum::{
    Router,
    routing::{any, get},
};
use tower_http::cors::{Any, CorsLayer};

use crate::bookmarks;
use crate::handler::{AppState, bootstrap, healthcheck};

/// Builds the full route table for the service.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(healthcheck))
        .route("/bootstrap", any(bootstrap))
        .merge(bookmarks::routes())
        .layer(cors)
        .with_state(state)
}
