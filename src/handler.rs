use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use tracing::info;

use crate::api::{StatusResponse, json_response};
use crate::config::Config;
use crate::db::Database;
use crate::error::HandlerError;
use crate::model::ApiKeyModel;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Config) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}

pub async fn healthcheck() -> Response {
    info!("got healthcheck request");
    json_response(
        StatusCode::OK,
        &StatusResponse {
            status: "ok".to_string(),
        },
    )
}

/// Seeds the configured placeholder API key. Safe to call repeatedly: a key
/// that already exists is left untouched.
pub async fn bootstrap(State(state): State<AppState>, method: Method) -> Result<Response, HandlerError> {
    let seed = ApiKeyModel {
        key_value: state.config.bootstrap.key_value.clone(),
        company: state.config.bootstrap.company.clone(),
    };

    let created = state.db.ensure_api_key(&seed).await?;
    if created {
        info!(method = %method, company = %seed.company, "bootstrap created api key");
    } else {
        info!(method = %method, company = %seed.company, "bootstrap api key already present");
    }

    Ok(StatusCode::OK.into_response())
}
