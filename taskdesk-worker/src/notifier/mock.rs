/// Mock notifier for tests and dry runs
///
/// Records every notification it is asked to send. Recipients registered with
/// [`MockNotifier::failing_for`] get a `Rejected` error instead, and an
/// optional delay makes overlapping runs observable.

use crate::notifier::{Notification, Notifier, NotifyError, NotifyResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::time::Duration;

/// Recording notifier
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

impl MockNotifier {
    /// Creates a notifier that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sends to `email` fail
    pub fn failing_for(mut self, email: impl Into<String>) -> Self {
        self.failing.insert(email.into());
        self
    }

    /// Waits this long inside every send
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Notifications delivered so far, in completion order
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, notification: &Notification) -> NotifyResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.contains(&notification.to) {
            return Err(NotifyError::Rejected {
                status: 550,
                body: "mailbox unavailable".to_string(),
            });
        }

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(to: &str) -> Notification {
        Notification {
            to: to.to_string(),
            subject: "s".to_string(),
            text: "t".to_string(),
            html: "h".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_records_and_fails() {
        let notifier = MockNotifier::new().failing_for("bad@example.com");

        notifier.send(&notification("good@example.com")).await.unwrap();
        let err = notifier.send(&notification("bad@example.com")).await.unwrap_err();

        assert!(matches!(err, NotifyError::Rejected { status: 550, .. }));
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "good@example.com");
    }
}
