//! The email transport: a narrow trait plus a SendGrid v3 client.

use crate::address::{RecipientSet, SenderIdentity};
use crate::error::{ConfigError, TransportError};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::task;
use tracing::{debug, instrument};

pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// The API credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }

    /// The only thing about the key that may be logged.
    pub fn redacted_len(&self) -> usize {
        self.0.len()
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted, {} chars>)", self.0.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Personalization {
    pub to: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub value: String,
}

/// A single outbound message in SendGrid's v3 shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub personalizations: Vec<Personalization>,
    pub from: Address,
    pub subject: String,
    pub content: Vec<Content>,
}

impl MailMessage {
    /// Builds a message with one personalization addressed to every
    /// recipient. The plain part always comes first; the HTML part, when
    /// present, is its alternative.
    pub fn new(
        sender: &SenderIdentity,
        recipients: &RecipientSet,
        subject: &str,
        text: &str,
        html: Option<&str>,
    ) -> Self {
        let to = recipients
            .iter()
            .map(|email| Address {
                email: email.to_string(),
                name: None,
            })
            .collect();

        let mut content = vec![Content {
            mime_type: "text/plain".to_string(),
            value: text.to_string(),
        }];
        if let Some(html) = html {
            content.push(Content {
                mime_type: "text/html".to_string(),
                value: html.to_string(),
            });
        }

        Self {
            personalizations: vec![Personalization { to }],
            from: Address {
                email: sender.email.clone(),
                name: Some(sender.name.clone()),
            },
            subject: subject.to_string(),
            content,
        }
    }
}

/// What the provider answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status_code: u16,
    pub body: String,
}

/// Submits a message and reports the provider's answer.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// A short name for logging.
    fn name(&self) -> &str;

    async fn send(&self, message: &MailMessage) -> Result<TransportResponse, TransportError>;
}

/// Sends mail through the SendGrid v3 `mail/send` endpoint.
pub struct SendGridClient {
    api_url: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl SendGridClient {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_url: SENDGRID_API_URL.to_string(),
            api_key,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends the request in a blocking manner.
    fn send_request(
        api_url: &str,
        api_key: &ApiKey,
        timeout: Duration,
        message: &MailMessage,
    ) -> Result<TransportResponse, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        let response = client
            .post(api_url)
            .bearer_auth(api_key.expose())
            .json(message)
            .send()
            .map_err(TransportError::Request)?;

        let status_code = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        Ok(TransportResponse { status_code, body })
    }
}

#[async_trait]
impl MailTransport for SendGridClient {
    fn name(&self) -> &str {
        "sendgrid"
    }

    #[instrument(skip(self, message), fields(subject = %message.subject))]
    async fn send(&self, message: &MailMessage) -> Result<TransportResponse, TransportError> {
        debug!(url = %self.api_url, "Submitting message to SendGrid.");

        let api_url = self.api_url.clone();
        let api_key = self.api_key.clone();
        let timeout = self.timeout;
        let message = message.clone();
        task::spawn_blocking(move || Self::send_request(&api_url, &api_key, timeout, &message))
            .await
            .map_err(|e| TransportError::Task(e.to_string()))?
    }
}
