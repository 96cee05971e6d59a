use crate::config::Config;
use crate::iterator::RowCursor;
use crate::model::*;
use anyhow::Result;
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::path::Path;
use std::time::Duration;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[("001_schema.sql", include_str!("migrations/001_schema.sql"))];

pub struct Database {
    db: LibsqlDatabase,
    conn: Connection,
    replica: bool,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Pushes pending local writes to the remote primary. No-op for a plain
    /// local database.
    pub async fn sync(&self) -> Result<()> {
        if self.replica {
            self.db
                .sync()
                .await
                .map_err(|e| anyhow::anyhow!("sync failed: {}", e))?;
        }
        Ok(())
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(cfg.app.get_db());

        let (db, replica) = match (cfg.app.turso_url(), cfg.app.turso_auth_token()) {
            (Some(url), Some(token)) => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(cfg.app.sync_interval_seconds);
                let db = Builder::new_synced_database(&path, url.to_string(), token.to_string())
                    .sync_interval(sync_interval)
                    .build()
                    .await?;
                (db, true)
            }
            _ => {
                tracing::info!(path = ?path, "[db] running in local database mode");
                (Builder::new_local(&path).build().await?, false)
            }
        };

        Self::open(db, replica).await
    }

    /// A private in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::open(db, false).await
    }

    async fn open(db: LibsqlDatabase, replica: bool) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        for (filename, sql) in MIGRATIONS {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database { db, conn, replica })
    }

    pub async fn bookmark_cursor(&self) -> Result<RowCursor> {
        let query = "SELECT name, url, tags FROM bookmarks ORDER BY id";
        let rows = self.conn.query(query, ()).await?;
        Ok(RowCursor::new(rows))
    }

    /// Inserts a new bookmark row and returns its store-generated id.
    pub async fn insert_bookmark(&self, bookmark: &BookmarkModel) -> Result<i64> {
        let query = r#"
            INSERT INTO bookmarks (name, url, tags)
            VALUES (?, ?, ?)
            RETURNING id
        "#;

        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![bookmark.name.as_str(), bookmark.url.as_str(), bookmark.tags_json()?],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(row.get::<i64>(0)?)
        } else {
            anyhow::bail!("Failed to create bookmark")
        }
    }

    pub async fn count_bookmarks(&self) -> Result<i64> {
        let mut rows = self.conn.query("SELECT COUNT(*) FROM bookmarks", ()).await?;
        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)?),
            None => Ok(0),
        }
    }

    pub async fn find_api_key(&self, key_value: &str) -> Result<Option<ApiKeyModel>> {
        let query = "SELECT key_value, company FROM api_keys WHERE key_value = ? LIMIT 1";
        let mut rows = self.conn.query(query, libsql::params![key_value]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(ApiKeyModel::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Inserts `key` unless a record with the same key value already exists.
    /// Returns whether a record was created.
    pub async fn ensure_api_key(&self, key: &ApiKeyModel) -> Result<bool> {
        let query = r#"
            INSERT INTO api_keys (key_value, company)
            VALUES (?, ?)
            ON CONFLICT(key_value) DO NOTHING
        "#;
        let inserted = self
            .conn
            .execute(query, libsql::params![key.key_value.as_str(), key.company.as_str()])
            .await?;
        Ok(inserted > 0)
    }

    pub async fn count_api_keys(&self) -> Result<i64> {
        let mut rows = self.conn.query("SELECT COUNT(*) FROM api_keys", ()).await?;
        match rows.next().await? {
            Some(row) => Ok(row.get::<i64>(0)?),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_recorded_once() {
        let db = Database::in_memory().await.unwrap();
        for (filename, sql) in MIGRATIONS {
            Database::run_migration(db.connection(), filename, sql).await.unwrap();
        }

        let mut rows = db
            .connection()
            .query("SELECT COUNT(*) FROM _migrations", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_bookmark_and_read_back() {
        let db = Database::in_memory().await.unwrap();
        let bookmark = BookmarkModel {
            name: "Example".to_string(),
            url: "http://example.com".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        };

        let first = db.insert_bookmark(&bookmark).await.unwrap();
        let second = db.insert_bookmark(&bookmark).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(db.count_bookmarks().await.unwrap(), 2);

        let mut rows = db
            .connection()
            .query("SELECT name, url, tags FROM bookmarks WHERE id = ?", libsql::params![first])
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(BookmarkModel::from_row(&row).unwrap(), bookmark);
    }

    #[tokio::test]
    async fn test_ensure_api_key_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let key = ApiKeyModel {
            key_value: "CHANGE ME".to_string(),
            company: "Wilcox Development Solutions".to_string(),
        };

        assert!(db.ensure_api_key(&key).await.unwrap());
        assert!(!db.ensure_api_key(&key).await.unwrap());
        assert_eq!(db.count_api_keys().await.unwrap(), 1);
        assert_eq!(db.find_api_key("CHANGE ME").await.unwrap(), Some(key));
        assert_eq!(db.find_api_key("nope").await.unwrap(), None);
    }
}
