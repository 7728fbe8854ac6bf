use anyhow::{bail, Context};
use async_trait::async_trait;

use super::throttle::EmailThrottle;
use super::{Mailer, OutboundEmail};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Resend HTTP API client.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    throttle: EmailThrottle,
}

impl ResendMailer {
    pub fn new(api_key: String, throttle: EmailThrottle) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            throttle,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        self.throttle.acquire().await;

        let resp = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "from": email.from,
                "to": [email.to],
                "subject": email.subject,
                "html": email.html,
            }))
            .send()
            .await
            .with_context(|| format!("Resend request failed for {}", email.to))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Resend returned {} for {}: {}", status, email.to, body);
        }

        Ok(())
    }
}
