//! Outbound mail through an HTTP relay.
//!
//! The relay accepts a JSON message and handles actual SMTP delivery.
//! Callers treat every error as non-fatal — delivery is best-effort.

use std::time::Duration;

use thiserror::Error;

use crate::config::MailConfig;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail relay rejected message: HTTP {status}")]
    Rejected { status: u16 },
}

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    relay_url: String,
    relay_token: String,
    from: String,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            relay_url: config.relay_url.clone(),
            relay_token: config.relay_token.clone(),
            from: config.from.clone(),
        })
    }

    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.relay_url)
            .bearer_auth(&self.relay_token)
            .json(&serde_json::json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "text": text,
                "html": html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::info!(%to, "Email sent successfully");
        Ok(())
    }
}
