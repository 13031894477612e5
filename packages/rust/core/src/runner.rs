//! Top-level runner: N sequential pipeline runs with a cooldown.
//!
//! Individual run failures are logged and skipped, never retried; the
//! summary reports successes against attempts.

use std::time::Duration;

use tracing::{error, info, instrument};

use postforge_shared::ArticleRecord;
use postforge_storage::ContentStore;

use crate::pipeline::Pipeline;

/// Outcome of one runner invocation.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Runs attempted.
    pub attempted: u32,
    /// Records for the runs that completed.
    pub published: Vec<ArticleRecord>,
}

impl RunSummary {
    pub fn successes(&self) -> u32 {
        self.published.len() as u32
    }
}

/// Run the pipeline `count` times, sleeping `cooldown` between runs to
/// respect external-service rate limits. A forced topic applies to the
/// first run only.
#[instrument(skip_all, fields(count, cooldown_secs = cooldown.as_secs()))]
pub async fn run_many(
    pipeline: &Pipeline,
    store: &ContentStore,
    count: u32,
    cooldown: Duration,
    forced_topic: Option<&str>,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for run in 1..=count {
        if run > 1 && !cooldown.is_zero() {
            info!(secs = cooldown.as_secs(), "cooldown before next run");
            tokio::time::sleep(cooldown).await;
        }

        summary.attempted += 1;
        let forced = if run == 1 { forced_topic } else { None };

        match pipeline.run_one(store, forced).await {
            Ok(record) => {
                info!(run, slug = %record.slug, "run complete");
                summary.published.push(record);
            }
            Err(e) => {
                // Log and continue with the next slot; no retry.
                error!(run, error = %e, "run failed, continuing");
            }
        }
    }

    info!(
        successes = summary.successes(),
        attempted = summary.attempted,
        "runner finished"
    );
    summary
}
