/// Core Notifier trait and types
///
/// A notifier delivers one rendered [`Notification`] to one recipient. The
/// reminder job owns grouping and rendering; notifiers only move bytes.
///
/// # Contract
///
/// - `send` either delivers the message or returns an error; it never retries
/// - a notifier is shared across concurrent sends (`Send + Sync`)
///
/// # Example
///
/// ```no_run
/// use taskdesk_worker::notifier::{Notification, Notifier, NotifyResult};
/// use async_trait::async_trait;
///
/// struct StdoutNotifier;
///
/// #[async_trait]
/// impl Notifier for StdoutNotifier {
///     fn name(&self) -> &str {
///         "stdout"
///     }
///
///     async fn send(&self, notification: &Notification) -> NotifyResult<()> {
///         println!("{}: {}", notification.to, notification.subject);
///         Ok(())
///     }
/// }
/// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Notifier error types
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Could not reach the delivery service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Delivery service answered with an error status
    #[error("Delivery rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Recipient address is unusable
    #[error("Invalid recipient: {0:?}")]
    InvalidRecipient(String),
}

/// Notifier result type alias
pub type NotifyResult<T> = Result<T, NotifyError>;

/// A rendered message for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Recipient email address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub text: String,

    /// HTML body
    pub html: String,
}

/// Outbound notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Delivers one notification
    async fn send(&self, notification: &Notification) -> NotifyResult<()>;
}

/// Rejects recipients that can't be an email address
pub fn ensure_recipient(to: &str) -> NotifyResult<()> {
    let trimmed = to.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !trimmed.contains(char::is_whitespace),
        None => false,
    };

    if !valid {
        return Err(NotifyError::InvalidRecipient(to.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_recipient() {
        assert!(ensure_recipient("jane@example.com").is_ok());
        assert!(ensure_recipient("").is_err());
        assert!(ensure_recipient("jane").is_err());
        assert!(ensure_recipient("@example.com").is_err());
        assert!(ensure_recipient("jane@").is_err());
        assert!(ensure_recipient("ja ne@example.com").is_err());
    }

    #[test]
    fn test_notify_error_display() {
        let err = NotifyError::Rejected {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Delivery rejected with status 502: bad gateway");
        assert_eq!(
            NotifyError::InvalidRecipient("x".to_string()).to_string(),
            "Invalid recipient: \"x\""
        );
    }
}
