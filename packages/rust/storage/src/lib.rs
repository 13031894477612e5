//! libSQL-backed Content Store for article metadata.
//!
//! The [`ContentStore`] wraps a local libSQL database holding two
//! append-only tables: published article records and the used-topics log.
//! The pipeline reads the full record set at run start (de-duplication
//! context) and appends exactly once at the end of a successful run.
//!
//! **Access rules:** the Runner is strictly sequential in-process, so the
//! read-then-append sequence is not guarded by a lock. A concurrent or
//! multi-process deployment must add mutual exclusion around it.

mod migrations;

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use postforge_shared::{ArticleRecord, Category, PostforgeError, Result};

/// Primary storage handle wrapping a libSQL database.
pub struct ContentStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl ContentStore {
    /// Open or create a database at `path`, applying pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PostforgeError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| PostforgeError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| PostforgeError::Storage(e.to_string()))?;

        let store = Self { db, conn };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    PostforgeError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Article operations
    // -----------------------------------------------------------------------

    /// Read all article records in publication (append) order.
    pub async fn read_all(&self) -> Result<Vec<ArticleRecord>> {
        let mut rows = self
            .conn
            .query(
                "SELECT slug, title, meta_description, category, keywords_json,
                        date_iso, date_display, read_time, image_alt, content_type
                 FROM articles ORDER BY rowid",
                params![],
            )
            .await
            .map_err(|e| PostforgeError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_article(&row)?);
        }
        Ok(results)
    }

    /// Append one article record. Fails on slug collision; the caller is
    /// expected to have de-collided the slug against [`Self::read_slugs`].
    pub async fn append_article(&self, record: &ArticleRecord) -> Result<()> {
        let keywords_json = serde_json::to_string(&record.keywords)
            .map_err(|e| PostforgeError::Storage(format!("keywords serialization: {e}")))?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO articles (slug, title, meta_description, category, keywords_json,
                                       date_iso, date_display, read_time, image_alt, content_type,
                                       appended_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    record.slug.as_str(),
                    record.title.as_str(),
                    record.meta_description.as_str(),
                    record.category.slug(),
                    keywords_json.as_str(),
                    record.date_iso.as_str(),
                    record.date_display.as_str(),
                    i64::from(record.read_time),
                    record.image_alt.as_str(),
                    record.content_type.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| PostforgeError::Storage(format!("append '{}': {e}", record.slug)))?;
        Ok(())
    }

    /// All persisted slugs, for slug de-collision at topic research time.
    pub async fn read_slugs(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query("SELECT slug FROM articles ORDER BY rowid", params![])
            .await
            .map_err(|e| PostforgeError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(
                row.get::<String>(0)
                    .map_err(|e| PostforgeError::Storage(e.to_string()))?,
            );
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Used-topics log
    // -----------------------------------------------------------------------

    /// Read the raw used-topics log in append order.
    pub async fn read_used_topics(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query("SELECT topic FROM topics_used ORDER BY id", params![])
            .await
            .map_err(|e| PostforgeError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(
                row.get::<String>(0)
                    .map_err(|e| PostforgeError::Storage(e.to_string()))?,
            );
        }
        Ok(results)
    }

    /// Append a raw topic string. Duplicates are tolerated.
    pub async fn append_used_topic(&self, topic: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO topics_used (topic, appended_at) VALUES (?1, ?2)",
                params![topic, now.as_str()],
            )
            .await
            .map_err(|e| PostforgeError::Storage(e.to_string()))?;
        Ok(())
    }
}

/// Convert a database row to an [`ArticleRecord`].
fn row_to_article(row: &libsql::Row) -> Result<ArticleRecord> {
    let keywords_json: String = row
        .get(4)
        .map_err(|e| PostforgeError::Storage(e.to_string()))?;
    let keywords: Vec<String> = serde_json::from_str(&keywords_json)
        .map_err(|e| PostforgeError::Storage(format!("invalid keywords_json: {e}")))?;
    let category_slug: String = row
        .get(3)
        .map_err(|e| PostforgeError::Storage(e.to_string()))?;

    Ok(ArticleRecord {
        slug: row
            .get::<String>(0)
            .map_err(|e| PostforgeError::Storage(e.to_string()))?,
        title: row
            .get::<String>(1)
            .map_err(|e| PostforgeError::Storage(e.to_string()))?,
        meta_description: row
            .get::<String>(2)
            .map_err(|e| PostforgeError::Storage(e.to_string()))?,
        category: Category::from_slug(&category_slug),
        keywords,
        date_iso: row
            .get::<String>(5)
            .map_err(|e| PostforgeError::Storage(e.to_string()))?,
        date_display: row
            .get::<String>(6)
            .map_err(|e| PostforgeError::Storage(e.to_string()))?,
        read_time: row.get::<i64>(7).map_err(|e| {
            PostforgeError::Storage(e.to_string())
        })? as u32,
        image_alt: row
            .get::<String>(8)
            .map_err(|e| PostforgeError::Storage(e.to_string()))?,
        content_type: row
            .get::<String>(9)
            .map_err(|e| PostforgeError::Storage(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_store() -> ContentStore {
        let tmp = std::env::temp_dir().join(format!("pf_test_{}.db", Uuid::now_v7()));
        ContentStore::open(&tmp).await.expect("open test db")
    }

    fn make_record(slug: &str, category: Category) -> ArticleRecord {
        ArticleRecord {
            slug: slug.into(),
            title: "Ankern lernen".into(),
            meta_description: "So ankerst du sicher.".into(),
            category,
            keywords: vec!["ankern".into(), "segeln".into()],
            date_iso: "2026-08-07".into(),
            date_display: "7. August 2026".into(),
            read_time: 8,
            image_alt: "Segelboot vor Anker".into(),
            content_type: "ratgeber".into(),
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let store = test_store().await;
        assert_eq!(store.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("pf_test_{}.db", Uuid::now_v7()));
        let s1 = ContentStore::open(&tmp).await.expect("first open");
        drop(s1);
        let s2 = ContentStore::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn append_and_read_preserves_order() {
        let store = test_store().await;
        store
            .append_article(&make_record("erster", Category::Grundlagen))
            .await
            .expect("append 1");
        store
            .append_article(&make_record("zweiter", Category::Wissen))
            .await
            .expect("append 2");

        let all = store.read_all().await.expect("read all");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].slug, "erster");
        assert_eq!(all[1].slug, "zweiter");
        assert_eq!(all[0].keywords, vec!["ankern", "segeln"]);
        assert_eq!(all[1].category, Category::Wissen);
    }

    #[tokio::test]
    async fn slug_collision_rejected() {
        let store = test_store().await;
        store
            .append_article(&make_record("ankern-lernen", Category::Grundlagen))
            .await
            .expect("first append");
        let result = store
            .append_article(&make_record("ankern-lernen", Category::Grundlagen))
            .await;
        assert!(result.is_err());

        // Store unchanged after the rejected append
        assert_eq!(store.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn read_slugs_lists_all() {
        let store = test_store().await;
        store
            .append_article(&make_record("eins", Category::Boote))
            .await
            .unwrap();
        store
            .append_article(&make_record("zwei", Category::Boote))
            .await
            .unwrap();
        let slugs = store.read_slugs().await.expect("read slugs");
        assert_eq!(slugs, vec!["eins", "zwei"]);
    }

    #[tokio::test]
    async fn used_topics_tolerate_duplicates() {
        let store = test_store().await;
        store.append_used_topic("Ankern lernen").await.unwrap();
        store.append_used_topic("Ankern lernen").await.unwrap();
        let topics = store.read_used_topics().await.expect("read topics");
        assert_eq!(topics, vec!["Ankern lernen", "Ankern lernen"]);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let tmp = std::env::temp_dir().join(format!("pf_test_{}.db", Uuid::now_v7()));
        {
            let store = ContentStore::open(&tmp).await.unwrap();
            store
                .append_article(&make_record("bleibt", Category::Reviere))
                .await
                .unwrap();
        }
        let store = ContentStore::open(&tmp).await.unwrap();
        let all = store.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].slug, "bleibt");
    }
}
