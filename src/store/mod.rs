//! SQLite-backed page store.
//!
//! Generated pages are cached under a canonical key derived from the
//! matched school name, so any query that resolves to the same school
//! lands on the same row. Reads distinguish "no entry" (`Ok(None)`)
//! from a row we can no longer interpret (`StoreError::Corrupt`).

use chrono::{DateTime, Utc};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

use crate::assets::MigrationAssets;
use crate::config::DatabaseConfig;
use crate::errors::{StoreError, StoreResult};
use crate::models::SchoolPage;
use crate::utils;

/// Derive the cache key for a school name: lowercase, with every run of
/// whitespace collapsed to a single `-`. The derivation is idempotent,
/// so a key fed back through it is unchanged.
pub fn canonical_key(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Clone)]
pub struct PageStore {
    pool: Pool<Sqlite>,
}

impl PageStore {
    pub async fn new(config: &DatabaseConfig) -> anyhow::Result<Self> {
        // In-memory databases exist as soon as we connect to them.
        if !config.url.contains(":memory:")
            && !Sqlite::database_exists(&config.url).await.unwrap_or(false)
        {
            info!("Creating database at {}", config.url);
            Sqlite::create_database(&config.url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> Pool<Sqlite> {
        self.pool.clone()
    }

    /// Apply the embedded schema migrations. Statements are written to be
    /// re-runnable, so calling this on an already-migrated database is safe.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        for (name, sql) in MigrationAssets::get_migrations() {
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration '{}' failed: {}", name, e))?;
            debug!("Applied migration: {}", name);
        }
        Ok(())
    }

    /// Look up the cached page for a canonical key. Returns `Ok(None)` when
    /// no entry exists; a row whose stored fields cannot be decoded comes
    /// back as `StoreError::Corrupt` rather than masquerading as a miss.
    pub async fn get(&self, key: &str) -> StoreResult<Option<SchoolPage>> {
        let row = sqlx::query(
            "SELECT name, html, created_at, expires_at FROM school_pages WHERE cache_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: String = row
            .try_get("name")
            .map_err(|e| StoreError::corrupt(key, e.to_string()))?;
        let html: String = row
            .try_get("html")
            .map_err(|e| StoreError::corrupt(key, e.to_string()))?;
        let created_at_raw: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::corrupt(key, e.to_string()))?;
        let expires_at_raw: Option<String> = row
            .try_get("expires_at")
            .map_err(|e| StoreError::corrupt(key, e.to_string()))?;

        let created_at = utils::parse_datetime(&created_at_raw)
            .map_err(|message| StoreError::corrupt(key, message))?;
        let expires_at = expires_at_raw
            .as_deref()
            .map(utils::parse_datetime)
            .transpose()
            .map_err(|message| StoreError::corrupt(key, message))?;

        Ok(Some(SchoolPage {
            name,
            html,
            created_at,
            expires_at,
        }))
    }

    /// Store a generated page under a canonical key, replacing any previous
    /// entry for that key wholesale.
    pub async fn put(&self, key: &str, page: &SchoolPage) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO school_pages (cache_key, name, html, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(cache_key) DO UPDATE SET
                name = excluded.name,
                html = excluded.html,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(&page.name)
        .bind(&page.html)
        .bind(page.created_at.to_rfc3339())
        .bind(page.expires_at.map(|dt: DateTime<Utc>| dt.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        debug!("Stored page for key '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            // A pooled in-memory database is per-connection; keep one so
            // every query sees the same data.
            max_connections: 1,
        }
    }

    async fn test_store() -> PageStore {
        let store = PageStore::new(&test_config()).await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn sample_page(html: &str) -> SchoolPage {
        SchoolPage {
            name: "Churchill High School".to_string(),
            html: html.to_string(),
            created_at: Utc::now(),
            expires_at: Some(Utc::now() + Duration::days(7)),
        }
    }

    #[test]
    fn canonical_key_lowercases_and_hyphenates() {
        assert_eq!(canonical_key("Churchill High School"), "churchill-high-school");
        assert_eq!(canonical_key("PRINCE EDWARD SCHOOL"), "prince-edward-school");
    }

    #[test]
    fn canonical_key_collapses_whitespace_runs() {
        assert_eq!(canonical_key("  Churchill   High\tSchool "), "churchill-high-school");
        assert_eq!(canonical_key("St Georges\n\nCollege"), "st-georges-college");
    }

    #[test]
    fn canonical_key_is_idempotent() {
        let once = canonical_key("Churchill High School");
        assert_eq!(canonical_key(&once), once);
    }

    #[tokio::test]
    async fn migrate_is_rerunnable() {
        let store = test_store().await;
        store.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_key() {
        let store = test_store().await;
        assert!(store.get("never-stored").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_then_get_round_trips_html_exactly() {
        let store = test_store().await;
        let page = sample_page("<!DOCTYPE html><html><body>Churchill</body></html>");

        store.put("churchill-high-school", &page).await.unwrap();
        let fetched = store
            .get("churchill-high-school")
            .await
            .unwrap()
            .expect("stored page should be readable");

        assert_eq!(fetched.name, page.name);
        assert_eq!(fetched.html, page.html);
        assert_eq!(fetched.expires_at.is_some(), page.expires_at.is_some());
    }

    #[tokio::test]
    async fn put_replaces_existing_entry() {
        let store = test_store().await;

        store
            .put("churchill-high-school", &sample_page("<html>old</html>"))
            .await
            .unwrap();
        store
            .put("churchill-high-school", &sample_page("<html>new</html>"))
            .await
            .unwrap();

        let fetched = store.get("churchill-high-school").await.unwrap().unwrap();
        assert_eq!(fetched.html, "<html>new</html>");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM school_pages")
            .fetch_one(&store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn page_without_expiry_round_trips() {
        let store = test_store().await;
        let page = SchoolPage {
            expires_at: None,
            ..sample_page("<html>eternal</html>")
        };

        store.put("prince-edward-school", &page).await.unwrap();
        let fetched = store.get("prince-edward-school").await.unwrap().unwrap();
        assert!(fetched.expires_at.is_none());
        assert!(fetched.is_fresh(Utc::now() + Duration::days(365 * 10)));
    }

    #[tokio::test]
    async fn corrupt_timestamp_is_an_error_not_a_miss() {
        let store = test_store().await;

        sqlx::query(
            "INSERT INTO school_pages (cache_key, name, html, created_at, expires_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind("broken-school")
        .bind("Broken School")
        .bind("<html></html>")
        .bind("not-a-timestamp")
        .bind(Option::<String>::None)
        .execute(&store.pool())
        .await
        .unwrap();

        let result = store.get("broken-school").await;
        match result {
            Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, "broken-school"),
            other => panic!("expected corrupt-entry error, got {:?}", other.map(|p| p.is_some())),
        }
    }
}
