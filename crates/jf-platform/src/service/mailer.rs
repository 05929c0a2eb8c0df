//! Email Collaborator
//!
//! Thin client for an external email provider. Delivery is always
//! best-effort: callers log failures and move on.

use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Posts a JSON payload to a configured email provider endpoint.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "body": body,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("email provider returned {}", response.status());
        }
        Ok(())
    }
}

/// Used when no email endpoint is configured.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        debug!(to, subject, "email delivery skipped (no provider configured)");
        Ok(())
    }
}
