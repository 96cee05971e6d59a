use crate::model::BookmarkModel;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub const BOOKMARK_VALIDATION_MESSAGE: &str =
    "Bookmark failed validation check, must have all of: name, url, tags";

const FALLBACK_ERROR_BODY: &[u8] = b"{\"summary\":\"internal error\",\"error_details\":\"\"}\n";

/// Wire shape of a bookmark. Missing keys decode to empty values so that an
/// incomplete body is reported by [`BookmarkPresenter::is_valid`] and not by
/// the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BookmarkPresenter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BookmarkPresenter {
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.url.is_empty() && !self.tags.is_empty()
    }
}

impl From<BookmarkPresenter> for BookmarkModel {
    fn from(p: BookmarkPresenter) -> Self {
        BookmarkModel {
            name: p.name,
            url: p.url,
            tags: p.tags,
        }
    }
}

impl From<BookmarkModel> for BookmarkPresenter {
    fn from(m: BookmarkModel) -> Self {
        BookmarkPresenter {
            name: m.name,
            url: m.url,
            tags: m.tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPresenter {
    pub summary: String,
    pub error_details: String,
}

impl ErrorPresenter {
    pub fn from_error(err: &dyn Display) -> Self {
        ErrorPresenter {
            summary: err.to_string(),
            error_details: String::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Serializes `value` and appends a single trailing newline.
pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = serde_json::to_vec(value)?;
    buf.push(b'\n');
    Ok(buf)
}

pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response {
    match to_json_bytes(value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

pub fn error_response(status: StatusCode, err: &dyn Display) -> Response {
    // ErrorPresenter only holds strings, serde_json cannot fail on it.
    let body = to_json_bytes(&ErrorPresenter::from_error(err))
        .unwrap_or_else(|_| FALLBACK_ERROR_BODY.to_vec());

    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
