/// Notifier that POSTs messages to a mail relay
///
/// # Request
///
/// ```text
/// POST <MAIL_WEBHOOK_URL>
/// Authorization: Bearer <MAIL_API_KEY>     (when configured)
/// Content-Type: application/json
///
/// { "from": "...", "to": "...", "subject": "...", "text": "...", "html": "..." }
/// ```
///
/// Any 2xx answer counts as delivered.

use crate::notifier::{ensure_recipient, Notification, Notifier, NotifyError, NotifyResult};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Longest relay error body kept in the error
const MAX_ERROR_BODY: usize = 512;

/// Wire payload
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

/// Mail relay notifier
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    from: String,
    api_key: Option<String>,
}

impl WebhookNotifier {
    /// Creates a notifier for the given relay URL
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the HTTP client can't be built
    pub fn new(url: impl Into<String>, from: impl Into<String>, api_key: Option<String>) -> NotifyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            from: from.into(),
            api_key,
        })
    }

    fn payload<'a>(&'a self, notification: &'a Notification) -> RelayMessage<'a> {
        RelayMessage {
            from: &self.from,
            to: &notification.to,
            subject: &notification.subject,
            text: &notification.text,
            html: &notification.html,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, notification: &Notification) -> NotifyResult<()> {
        ensure_recipient(&notification.to)?;

        let mut request = self.client.post(&self.url).json(&self.payload(notification));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
                body.truncate(cut);
            }
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %notification.to, status = status.as_u16(), "Relay accepted notification");
        Ok(())
    }
}
