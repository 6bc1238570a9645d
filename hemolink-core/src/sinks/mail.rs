// src/sinks/mail.rs

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::Error;
pub use hemolink_common::traits::sink_traits::MailSink;

#[derive(Serialize)]
struct MailApiRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    body: &'a str,
}

/// Delivers mail by POSTing JSON to an HTTP mail-API endpoint.
pub struct HttpMailSink {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpMailSink {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl MailSink for HttpMailSink {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        recipients: &[String],
    ) -> Result<(), Error> {
        let payload = MailApiRequest {
            from,
            to: recipients,
            subject,
            body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Sink(format!(
                "mail API returned {} for '{}'",
                response.status(),
                subject
            )));
        }

        debug!("Sent mail '{}' to {} recipient(s)", subject, recipients.len());
        Ok(())
    }
}

/// Logs mail instead of sending it. Used when no mail API is configured.
pub struct NullMailSink;

#[async_trait]
impl MailSink for NullMailSink {
    async fn send(
        &self,
        subject: &str,
        _body: &str,
        _from: &str,
        recipients: &[String],
    ) -> Result<(), Error> {
        info!(
            "Mail delivery disabled; dropping '{}' for {} recipient(s)",
            subject,
            recipients.len()
        );
        Ok(())
    }
}
