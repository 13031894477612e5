//! Shared types, error model, and configuration for Postforge.
//!
//! This crate is the foundation depended on by all other Postforge crates.
//! It provides:
//! - [`PostforgeError`] — the unified error type
//! - Domain types ([`TopicRecord`], [`Draft`], [`ArticleRecord`], [`Category`])
//! - Configuration ([`AppConfig`], config loading)
//! - Slug derivation ([`slugify`], [`dedupe_slug`])

pub mod config;
pub mod error;
pub mod slug;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnthropicConfig, AppConfig, ImagesConfig, MonetizationConfig, NotifyConfig, PathsConfig,
    QualityConfig, RunnerConfig, SearchConfig, SiteConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{PostforgeError, Result};
pub use slug::{MAX_SLUG_LEN, dedupe_slug, read_time_minutes, slugify};
pub use types::{
    ArticleRecord, CATEGORIES, CONTENT_TYPES, Category, ContentType, Draft, FactCheckResult,
    FaqEntry, QualityVerdict, RunId, Source, TopicRecord, german_date_display, german_month_name,
};
