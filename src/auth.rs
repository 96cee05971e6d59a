use crate::db::Database;
use crate::model::ApiKeyModel;

pub const API_KEY_NOT_FOUND: &str = "API Key not found";

/// Outcome of checking an `apikey` header value against the stored keys.
#[derive(Debug)]
pub enum ApiKeyCheck {
    Authorized(ApiKeyModel),
    Unauthorized,
    LookupFailed(anyhow::Error),
}

/// `None` is a missing or non-UTF-8 header and is rejected without a lookup.
pub async fn validate_api_key(db: &Database, key: Option<&str>) -> ApiKeyCheck {
    let Some(key) = key else {
        return ApiKeyCheck::Unauthorized;
    };

    match db.find_api_key(key).await {
        Ok(Some(record)) => ApiKeyCheck::Authorized(record),
        Ok(None) => ApiKeyCheck::Unauthorized,
        Err(e) => ApiKeyCheck::LookupFailed(e),
    }
}
