/// Notifier that writes messages to the log
///
/// Used when no mail relay is configured, so a development setup sees exactly
/// what would have been sent.

use crate::notifier::{ensure_recipient, Notification, Notifier, NotifyResult};
use async_trait::async_trait;

/// Logging notifier
pub struct LogNotifier {
    from: String,
}

impl LogNotifier {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, notification: &Notification) -> NotifyResult<()> {
        ensure_recipient(&notification.to)?;

        tracing::info!(
            from = %self.from,
            to = %notification.to,
            subject = %notification.subject,
            "Reminder (not delivered, no mail relay configured):\n{}",
            notification.text
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::NotifyError;

    fn notification(to: &str) -> Notification {
        Notification {
            to: to.to_string(),
            subject: "s".to_string(),
            text: "t".to_string(),
            html: "<p>t</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_valid_recipient() {
        let notifier = LogNotifier::new("reminders@example.com");
        assert_eq!(notifier.name(), "log");
        assert!(notifier.send(&notification("jane@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_notifier_rejects_invalid_recipient() {
        let notifier = LogNotifier::new("reminders@example.com");
        let result = notifier.send(&notification("nobody")).await;
        assert!(matches!(result, Err(NotifyError::InvalidRecipient(_))));
    }
}
