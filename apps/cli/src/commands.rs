//! CLI command definitions, routing, and tracing setup.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use postforge_adapters::{
    AnthropicClient, AnthropicSearchClient, GeminiImageClient, HttpProbe, ImageGenerator,
    OpenAiImageClient, SearchProvider,
};
use postforge_core::{
    Collaborators, GitPublisher, LogNotifier, NoopPublisher, Pipeline, Publisher, run_many,
};
use postforge_shared::{AppConfig, init_config, load_config};
use postforge_storage::ContentStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Postforge — generate and publish blog articles end to end.
#[derive(Parser)]
#[command(
    name = "postforge",
    version,
    about = "Generate, check, assemble, and publish blog articles.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate articles: the full pipeline, N times.
    Run {
        /// Number of articles to attempt (overrides the config).
        #[arg(short, long)]
        count: Option<u32>,

        /// Generate exactly this topic instead of researching one
        /// (forces the count to 1).
        #[arg(short, long)]
        topic: Option<String>,

        /// Skip the git commit-and-push step.
        #[arg(long)]
        no_publish: bool,
    },

    /// Rebuild all derived pages from the content store.
    Rebuild,

    /// List all published articles.
    List,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            count,
            topic,
            no_publish,
        } => cmd_run(count, topic.as_deref(), no_publish).await,
        Command::Rebuild => cmd_rebuild().await,
        Command::List => cmd_list().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Collaborator wiring
// ---------------------------------------------------------------------------

/// Read an API key from the env var named in the config; `None` when unset
/// or empty.
fn key_from_env(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.is_empty())
}

/// Wire the production collaborators from config and environment.
fn build_collaborators(config: &AppConfig, no_publish: bool) -> Result<Collaborators> {
    let anthropic_key = key_from_env(&config.anthropic.api_key_env).ok_or_else(|| {
        eyre!(
            "Anthropic API key not found. Set the {} environment variable.",
            config.anthropic.api_key_env
        )
    })?;

    let text = Arc::new(AnthropicClient::new(anthropic_key)?);

    // Search adapter only when the config section exists and its key is set.
    let search: Option<Arc<dyn SearchProvider>> = match &config.search {
        Some(search_config) => match key_from_env(&search_config.api_key_env) {
            Some(key) => Some(Arc::new(AnthropicSearchClient::new(
                key,
                search_config.model.clone(),
            )?)),
            None => None,
        },
        None => None,
    };

    // Image fallback chain, primary first; adapters without keys drop out.
    let mut images: Vec<Arc<dyn ImageGenerator>> = Vec::new();
    if let Some(key) = key_from_env(&config.images.gemini_api_key_env) {
        images.push(Arc::new(GeminiImageClient::new(key)?));
    }
    if let Some(key) = key_from_env(&config.images.openai_api_key_env) {
        images.push(Arc::new(OpenAiImageClient::new(key)?));
    }

    let publisher: Arc<dyn Publisher> = if no_publish {
        Arc::new(NoopPublisher)
    } else {
        let cwd = std::env::current_dir().map_err(|e| eyre!("working directory: {e}"))?;
        Arc::new(GitPublisher::new(cwd))
    };

    Ok(Collaborators {
        text,
        search,
        images,
        probe: Arc::new(HttpProbe::new()?),
        publisher,
        notifier: Arc::new(LogNotifier),
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(count: Option<u32>, topic: Option<&str>, no_publish: bool) -> Result<()> {
    let config = load_config()?;
    config.validate_api_key()?;

    // A forced topic means exactly one article.
    let count = if topic.is_some() {
        1
    } else {
        count.unwrap_or(config.runner.articles_per_run).max(1)
    };
    let cooldown = Duration::from_secs(config.runner.cooldown_secs);

    let collaborators = build_collaborators(&config, no_publish)?;
    let store = ContentStore::open(Path::new(&config.paths.store_db)).await?;
    let pipeline = Pipeline::new(config, collaborators);

    info!(count, forced = topic.is_some(), "starting runner");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Generiere {count} Artikel..."));

    let summary = run_many(&pipeline, &store, count, cooldown, topic).await;
    spinner.finish_and_clear();

    println!();
    println!("  Fertig: {}/{} Artikel", summary.successes(), summary.attempted);
    for record in &summary.published {
        println!(
            "  - {} ({}, {} Min.)",
            record.title,
            record.category.name(),
            record.read_time
        );
        println!(
            "    {}/posts/{}/",
            pipeline.config().site.site_url,
            record.slug
        );
    }
    println!();

    if summary.successes() == 0 {
        return Err(eyre!("no article was published"));
    }
    Ok(())
}

async fn cmd_rebuild() -> Result<()> {
    let config = load_config()?;
    let store = ContentStore::open(Path::new(&config.paths.store_db)).await?;
    let records = store.read_all().await?;

    postforge_core::assemble::rebuild_site(&config, &records, chrono::Utc::now())?;

    println!("Rebuilt: {} Artikel, Feeds, Sitemap", records.len());
    Ok(())
}

async fn cmd_list() -> Result<()> {
    let config = load_config()?;
    let store = ContentStore::open(Path::new(&config.paths.store_db)).await?;
    let records = store.read_all().await?;

    if records.is_empty() {
        println!("Noch keine Artikel.");
        return Ok(());
    }

    for record in records.iter().rev() {
        println!(
            "{}  {:12}  {}",
            record.date_iso,
            record.category.slug(),
            record.title
        );
    }
    println!();
    println!("{} Artikel insgesamt", records.len());
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
