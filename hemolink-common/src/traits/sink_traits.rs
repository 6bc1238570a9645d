use async_trait::async_trait;

use crate::error::Error;

/// Outbound mail delivery. Implementations may fail; callers treat failure
/// as a warning, never as a workflow failure.
#[async_trait]
pub trait MailSink: Send + Sync {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        recipients: &[String],
    ) -> Result<(), Error>;
}
