//! A mock mail transport that records every message it is given.

use async_trait::async_trait;
use ssh_login_notify::error::TransportError;
use ssh_login_notify::mail::{ApiKey, MailMessage, MailTransport, TransportResponse};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
enum Reply {
    Status(u16, String),
    Fail(String),
}

#[derive(Clone, Debug)]
pub struct MockTransport {
    reply: Reply,
    pub sent: Arc<Mutex<Vec<MailMessage>>>,
    pub api_key_len: Arc<Mutex<Option<usize>>>,
}

impl MockTransport {
    pub fn accepting() -> Self {
        Self::answering(202, "")
    }

    pub fn answering(status: u16, body: &str) -> Self {
        Self::with_reply(Reply::Status(status, body.to_string()))
    }

    pub fn failing(detail: &str) -> Self {
        Self::with_reply(Reply::Fail(detail.to_string()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            sent: Arc::new(Mutex::new(Vec::new())),
            api_key_len: Arc::new(Mutex::new(None)),
        }
    }

    /// A `connect` closure for `App::run` that hands out this mock.
    pub fn connector(&self) -> impl FnOnce(ApiKey) -> Box<dyn MailTransport> {
        let mock = self.clone();
        move |key| -> Box<dyn MailTransport> {
            *mock.api_key_len.lock().unwrap() = Some(key.redacted_len());
            Box::new(mock)
        }
    }

    pub fn sent_messages(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn was_connected(&self) -> bool {
        self.api_key_len.lock().unwrap().is_some()
    }
}

#[async_trait]
impl MailTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, message: &MailMessage) -> Result<TransportResponse, TransportError> {
        self.sent.lock().unwrap().push(message.clone());
        match &self.reply {
            Reply::Status(status_code, body) => Ok(TransportResponse {
                status_code: *status_code,
                body: body.clone(),
            }),
            Reply::Fail(detail) => Err(TransportError::Task(detail.clone())),
        }
    }
}
