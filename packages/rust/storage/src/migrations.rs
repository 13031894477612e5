//! SQL migration definitions for the Postforge Content Store.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed as a batch.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: articles, topics_used",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Published article metadata, append-only. Insertion order is
-- publication order; feeds read newest-first by rowid.
CREATE TABLE IF NOT EXISTS articles (
    slug             TEXT PRIMARY KEY,
    title            TEXT NOT NULL,
    meta_description TEXT NOT NULL,
    category         TEXT NOT NULL,
    keywords_json    TEXT NOT NULL,
    date_iso         TEXT NOT NULL,
    date_display     TEXT NOT NULL,
    read_time        INTEGER NOT NULL,
    image_alt        TEXT NOT NULL,
    content_type     TEXT NOT NULL,
    appended_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_category ON articles(category);

-- Raw topic strings already used, append-only. Duplicates tolerated:
-- this is avoid-repeating context, not a uniqueness constraint.
CREATE TABLE IF NOT EXISTS topics_used (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    topic       TEXT NOT NULL,
    appended_at TEXT NOT NULL
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
