use serde::{Deserialize, Serialize};

/// A bookmark as it is persisted in the `bookmarks` table.
///
/// The store-generated row id is not carried here; nothing reads a bookmark
/// back by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BookmarkModel {
    pub name: String,
    pub url: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyModel {
    pub key_value: String,
    pub company: String,
}

impl BookmarkModel {
    pub fn from_row(row: &libsql::Row) -> anyhow::Result<Self> {
        let name = row
            .get::<String>(0)
            .map_err(|e| anyhow::anyhow!("failed to get name: {e}"))?;
        let url = row
            .get::<String>(1)
            .map_err(|e| anyhow::anyhow!("failed to get url: {e}"))?;
        let raw_tags = row
            .get::<String>(2)
            .map_err(|e| anyhow::anyhow!("failed to get tags: {e}"))?;
        let tags: Vec<String> = serde_json::from_str(&raw_tags)
            .map_err(|e| anyhow::anyhow!("failed to decode tags: {e}"))?;

        Ok(BookmarkModel { name, url, tags })
    }

    pub fn tags_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.tags)?)
    }
}

impl ApiKeyModel {
    pub fn from_row(row: &libsql::Row) -> anyhow::Result<Self> {
        let key_value = row
            .get::<String>(0)
            .map_err(|e| anyhow::anyhow!("failed to get key_value: {e}"))?;
        let company = row
            .get::<String>(1)
            .map_err(|e| anyhow::anyhow!("failed to get company: {e}"))?;

        Ok(ApiKeyModel { key_value, company })
    }
}
