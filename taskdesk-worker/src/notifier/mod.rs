/// Outbound notification channels
///
/// # Notifier Types
///
/// - **Log**: writes the message to the log (no relay configured)
/// - **Webhook**: POSTs the message as JSON to a mail relay
/// - **Mock**: records messages and injects failures, for tests

pub mod log;
pub mod mock;
pub mod notifier_trait;
pub mod webhook;

// Re-export main types
pub use log::LogNotifier;
pub use mock::MockNotifier;
pub use notifier_trait::{ensure_recipient, Notification, Notifier, NotifyError, NotifyResult};
pub use webhook::WebhookNotifier;
