use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::{error::Error, fmt};

use crate::api::{BOOKMARK_VALIDATION_MESSAGE, error_response};
use crate::auth::API_KEY_NOT_FOUND;

#[derive(Debug)]
pub enum HandlerError {
    Unauthorized,
    InvalidBookmark,
    BodyRead(String),
    Decode(serde_json::Error),
    MethodNotAllowed,
    Store(anyhow::Error),
    Serialize(serde_json::Error),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        use HandlerError::*;
        match self {
            Unauthorized => StatusCode::FORBIDDEN,
            InvalidBookmark | BodyRead(_) | Decode(_) => StatusCode::BAD_REQUEST,
            MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Store(_) | Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Display is what callers see in the `summary` field, so it carries the
// underlying message verbatim with no variant prefix.
impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use HandlerError::*;
        match self {
            Unauthorized => write!(f, "{}", API_KEY_NOT_FOUND),
            InvalidBookmark => write!(f, "{}", BOOKMARK_VALIDATION_MESSAGE),
            BodyRead(s) => write!(f, "{}", s),
            Decode(e) => write!(f, "{}", e),
            MethodNotAllowed => write!(f, "Method not allowed"),
            Store(e) => write!(f, "{}", e),
            Serialize(e) => write!(f, "{}", e),
        }
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use HandlerError::*;
        match self {
            // Display already prints the wrapped error itself.
            Decode(e) | Serialize(e) => e.source(),
            Store(e) => e.source(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(error: anyhow::Error) -> Self {
        HandlerError::Store(error)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %crate::unpack_error(&self), "request failed");
        } else {
            tracing::info!(status = %status, error = %self, "request rejected");
        }
        error_response(status, &self)
    }
}
