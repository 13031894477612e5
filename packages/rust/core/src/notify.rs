//! Notification collaborator.
//!
//! Fire-and-forget: the pipeline calls `send` after a successful publish
//! and logs any failure. The default implementation only logs; wiring an
//! actual mail or webhook transport is a deployment concern.

use async_trait::async_trait;
use tracing::info;

use postforge_shared::Result;

/// Deliver a completion notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html: &str) -> Result<()>;
}

/// Notifier that writes the notification to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, html: &str) -> Result<()> {
        info!(recipient, subject, body_len = html.len(), "notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let result = LogNotifier
            .send("skipper@example.com", "Neuer Artikel", "<p>online</p>")
            .await;
        assert!(result.is_ok());
    }
}
