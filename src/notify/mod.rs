pub mod dto;
pub mod message;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::MailConfig;

pub use message::{OutgoingEmail, contact_notification};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail transport is not configured")]
    NotConfigured,

    #[error("failed to render notification: {0}")]
    Render(#[from] askama::Error),

    #[error("mail transport request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail transport rejected the message: {status} {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError>;
}

/// Delivers through an HTTP JSON mail relay with bearer authentication.
pub struct HttpMailer {
    client: Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        let request_body = dto::SendEmailRequest::new(&self.config.from_address, email);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_token)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("mail relay accepted message: {}", status);
        Ok(())
    }
}

/// Stand-in when no transport is configured: every send fails.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}
