use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::api::{BookmarkPresenter, json_response, to_json_bytes};
use crate::auth::{ApiKeyCheck, validate_api_key};
use crate::error::HandlerError;
use crate::handler::AppState;
use crate::iterator::BookmarkIterator;
use crate::model::BookmarkModel;

const API_KEY_HEADER: &str = "apikey";

pub async fn list_bookmarks(State(state): State<AppState>, method: Method) -> Result<Response, HandlerError> {
    tracing::info!(method = %method, "listing bookmarks");

    let cursor = state.db.bookmark_cursor().await?;
    let bookmarks = BookmarkIterator::new(cursor).collect_presenters().await?;

    tracing::debug!(count = bookmarks.len(), "listed bookmarks");
    Ok(json_response(StatusCode::OK, &bookmarks))
}

/// Stores a bookmark for callers holding a known API key. The key is checked
/// before the body is read.
pub async fn create_bookmark(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, HandlerError> {
    tracing::info!("creating bookmark");

    let key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());

    match validate_api_key(&state.db, key).await {
        ApiKeyCheck::Authorized(record) => {
            tracing::info!(company = %record.company, "api key accepted");
        }
        ApiKeyCheck::Unauthorized => return Err(HandlerError::Unauthorized),
        ApiKeyCheck::LookupFailed(e) => return Err(HandlerError::Store(e)),
    }

    let bytes = axum::body::to_bytes(body, state.config.app.max_body_bytes)
        .await
        .map_err(|e| HandlerError::BodyRead(e.to_string()))?;

    let presenter = decode_bookmark(&bytes).map_err(HandlerError::Decode)?;
    if !presenter.is_valid() {
        return Err(HandlerError::InvalidBookmark);
    }

    // Encode the echo before writing so a serialization failure cannot
    // follow a successful insert.
    let echo = to_json_bytes(&presenter).map_err(HandlerError::Serialize)?;

    let bookmark = BookmarkModel::from(presenter);
    let id = state.db.insert_bookmark(&bookmark).await?;
    tracing::info!(id, name = %bookmark.name, "bookmark created");

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], echo).into_response())
}

pub async fn method_not_allowed(method: Method) -> Response {
    tracing::info!(method = %method, "method not allowed on /bookmarks");
    ([(header::ALLOW, "GET,HEAD,POST")], HandlerError::MethodNotAllowed).into_response()
}

/// Decodes the first JSON value in `bytes`; anything after it is ignored.
fn decode_bookmark(bytes: &[u8]) -> Result<BookmarkPresenter, serde_json::Error> {
    let mut values = serde_json::Deserializer::from_slice(bytes).into_iter::<BookmarkPresenter>();
    match values.next() {
        Some(result) => result,
        // Empty or whitespace-only body; the strict decoder reports the EOF.
        None => serde_json::from_slice(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_trailing_values() {
        let p = decode_bookmark(br#"{"name":"a","url":"b","tags":["c"]} {"name":"x"}"#).unwrap();
        assert_eq!(p.name, "a");
        assert!(p.is_valid());
    }

    #[test]
    fn test_decode_rejects_empty_and_malformed_bodies() {
        assert!(decode_bookmark(b"").is_err());
        assert!(decode_bookmark(b"   \n").is_err());
        assert!(decode_bookmark(b"{\"name\":").is_err());
        assert!(decode_bookmark(br#"{"tags":"not-a-list"}"#).is_err());
    }
}
