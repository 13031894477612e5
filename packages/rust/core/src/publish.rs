//! Publish collaborator: version-control commit-and-push.
//!
//! Fire-and-forget from the pipeline's point of view: failures are
//! logged, never propagated into the run result.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info, warn};

use postforge_shared::{PostforgeError, Result};

/// Commit the working tree and push.
pub trait Publisher: Send + Sync {
    fn commit_and_push(&self, message: &str) -> Result<()>;
}

/// git-backed publisher running `add -A`, `commit`, `push` in sequence.
pub struct GitPublisher {
    repo_dir: PathBuf,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|e| PostforgeError::io(&self.repo_dir, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PostforgeError::validation(format!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )));
        }
        debug!(args = ?args, "git ok");
        Ok(())
    }
}

impl Publisher for GitPublisher {
    fn commit_and_push(&self, message: &str) -> Result<()> {
        self.git(&["add", "-A"])?;
        self.git(&["commit", "-m", message])?;
        self.git(&["push"])?;
        info!(message, "published");
        Ok(())
    }
}

/// Publisher that only logs; used when no repository is configured and in
/// tests.
pub struct NoopPublisher;

impl Publisher for NoopPublisher {
    fn commit_and_push(&self, message: &str) -> Result<()> {
        warn!(message, "publish skipped (no publisher configured)");
        Ok(())
    }
}
