use async_trait::async_trait;

pub mod resend;
pub mod throttle;

/// One outbound transactional email.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Transactional email sender. Delivery may fail per recipient; callers are
/// responsible for isolating those failures.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()>;
}
