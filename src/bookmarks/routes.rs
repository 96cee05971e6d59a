use axum::{Router, routing::get};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/bookmarks",
        get(handler::list_bookmarks)
            .post(handler::create_bookmark)
            .fallback(handler::method_not_allowed),
    )
}
