//! Application configuration for Postforge.
//!
//! User config lives at `~/.postforge/postforge.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are referenced by environment-variable *name*; the key
//! itself is never stored in the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PostforgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "postforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".postforge";

// ---------------------------------------------------------------------------
// Config structs (matching postforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site identity and URLs.
    #[serde(default)]
    pub site: SiteConfig,

    /// Text-generation adapter settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Image-generation fallback chain settings.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Search/verification adapter. Absence disables fact-check and
    /// monetization lookup entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchConfig>,

    /// Runner cadence.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Quality gate thresholds.
    #[serde(default)]
    pub quality: QualityConfig,

    /// Monetization callout settings.
    #[serde(default)]
    pub monetization: MonetizationConfig,

    /// Completion notification. Absence disables the notify step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,

    /// Filesystem layout.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Path prefix pages are served under (e.g. `/segeln-lernen`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Absolute site URL used in the sitemap and notifications.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Site title.
    #[serde(default = "default_site_title")]
    pub title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            site_url: default_site_url(),
            title: default_site_title(),
        }
    }
}

fn default_base_url() -> String {
    "/segeln-lernen".into()
}
fn default_site_url() -> String {
    "https://nichtagentur.github.io/segeln-lernen".into()
}
fn default_site_title() -> String {
    "Segeln Lernen".into()
}

/// `[anthropic]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_anthropic_key_env")]
    pub api_key_env: String,

    /// Small/fast model for topic research and quality verdicts.
    #[serde(default = "default_topic_model")]
    pub topic_model: String,

    /// Larger model for drafting and revisions.
    #[serde(default = "default_draft_model")]
    pub draft_model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_anthropic_key_env(),
            topic_model: default_topic_model(),
            draft_model: default_draft_model(),
        }
    }
}

fn default_anthropic_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}
fn default_topic_model() -> String {
    "claude-haiku-4-5-20251001".into()
}
fn default_draft_model() -> String {
    "claude-sonnet-4-20250514".into()
}

/// `[images]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Env var name for the Gemini API key (primary generator).
    #[serde(default = "default_gemini_key_env")]
    pub gemini_api_key_env: String,

    /// Env var name for the OpenAI API key (third-party fallback).
    #[serde(default = "default_openai_key_env")]
    pub openai_api_key_env: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            gemini_api_key_env: default_gemini_key_env(),
            openai_api_key_env: default_openai_key_env(),
        }
    }
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".into()
}

/// `[search]` section. Present ⇒ fact-check and product lookup enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Env var name for the search adapter API key.
    #[serde(default = "default_anthropic_key_env")]
    pub api_key_env: String,

    /// Model used for search-grounded calls.
    #[serde(default = "default_topic_model")]
    pub model: String,
}

/// `[runner]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Articles attempted per invocation.
    #[serde(default = "default_articles_per_run")]
    pub articles_per_run: u32,

    /// Cooldown between runs, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            articles_per_run: default_articles_per_run(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

fn default_articles_per_run() -> u32 {
    2
}
fn default_cooldown_secs() -> u64 {
    30
}

/// `[quality]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Minimum passing score (0–10).
    #[serde(default = "default_quality_threshold")]
    pub threshold: u8,

    /// Hard cap on evaluation calls per draft.
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: u8,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            threshold: default_quality_threshold(),
            max_evaluations: default_max_evaluations(),
        }
    }
}

fn default_quality_threshold() -> u8 {
    6
}
fn default_max_evaluations() -> u8 {
    3
}

/// `[monetization]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonetizationConfig {
    /// Only product URLs on this domain (or its subdomains) are accepted.
    #[serde(default = "default_marketplace_domain")]
    pub marketplace_domain: String,
}

impl Default for MonetizationConfig {
    fn default() -> Self {
        Self {
            marketplace_domain: default_marketplace_domain(),
        }
    }
}

fn default_marketplace_domain() -> String {
    "amazon.de".into()
}

/// `[notify]` section. Present ⇒ a completion notification is sent after
/// each published article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Recipient address passed to the notification collaborator.
    pub recipient: String,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Published site output directory.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Content Store database file.
    #[serde(default = "default_store_db")]
    pub store_db: String,

    /// Template directory; built-in templates are used for files missing here.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            store_db: default_store_db(),
            templates_dir: default_templates_dir(),
        }
    }
}

fn default_docs_dir() -> String {
    "docs".into()
}
fn default_store_db() -> String {
    "data/postforge.db".into()
}
fn default_templates_dir() -> String {
    "templates".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.postforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PostforgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.postforge/postforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PostforgeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PostforgeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PostforgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PostforgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PostforgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

impl AppConfig {
    /// Check that the Anthropic API key env var is set and non-empty.
    pub fn validate_api_key(&self) -> Result<()> {
        let var_name = &self.anthropic.api_key_env;
        match std::env::var(var_name) {
            Ok(val) if !val.is_empty() => Ok(()),
            _ => Err(PostforgeError::config(format!(
                "Anthropic API key not found. Set the {var_name} environment variable."
            ))),
        }
    }
}
