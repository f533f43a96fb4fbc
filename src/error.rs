//! Error types shared across the notification pipeline.
//!
//! Configuration errors are fatal: they mean the deployment cannot send
//! anything at all and the process exits with status 1. Delivery problems
//! are deliberately absent here; they are folded into
//! [`DeliveryOutcome`](crate::dispatch::DeliveryOutcome) so they can never
//! abort the login they are attached to.

use thiserror::Error;

/// A missing or malformed deployment setting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("empty MAIL_FROM")]
    EmptyFrom,

    #[error("invalid MAIL_FROM: {0:?} does not contain '@'")]
    InvalidFrom(String),

    #[error("empty MAIL_TO")]
    EmptyTo,

    #[error("invalid MAIL_TO: {0:?} does not contain '@'")]
    InvalidTo(String),

    #[error("empty SENDGRID_API_KEY")]
    EmptyApiKey,

    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Failure to hand a message to the email API at all.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to email API failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("email delivery task failed: {0}")]
    Task(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Client(e) | TransportError::Request(e) => e.is_timeout(),
            TransportError::Task(_) => false,
        }
    }
}
