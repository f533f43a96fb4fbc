//! Hands the rendered report to the mail transport and interprets the answer.
//!
//! Delivery is best-effort. Whatever happens on the wire is turned into a
//! [`DeliveryOutcome`] and logged; nothing here can fail the PAM stack.

use crate::address::{RecipientSet, SenderIdentity};
use crate::mail::{MailMessage, MailTransport};
use crate::report::NotificationRequest;
use tracing::{error, info, warn};

/// The status SendGrid uses for "accepted for delivery".
pub const STATUS_ACCEPTED: u16 = 202;

/// The single, terminal result of a dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    RejectedByProvider { status_code: u16, body: String },
    TransportError { detail: String },
}

/// Makes exactly one delivery attempt per request. No retries.
pub struct Dispatcher<'a> {
    transport: &'a dyn MailTransport,
    api_key_len: usize,
}

impl<'a> Dispatcher<'a> {
    /// `api_key_len` is reported on failures in place of the key itself.
    pub fn new(transport: &'a dyn MailTransport, api_key_len: usize) -> Self {
        Self {
            transport,
            api_key_len,
        }
    }

    /// Consumes the request, submits it once and logs the outcome.
    pub async fn deliver(
        &self,
        request: NotificationRequest,
        sender: &SenderIdentity,
        recipients: &RecipientSet,
    ) -> DeliveryOutcome {
        let message = MailMessage::new(
            sender,
            recipients,
            &request.subject,
            &request.text_body,
            request.html_body.as_deref(),
        );

        let outcome = match self.transport.send(&message).await {
            Ok(response) if response.status_code == STATUS_ACCEPTED => DeliveryOutcome::Sent,
            Ok(response) => DeliveryOutcome::RejectedByProvider {
                status_code: response.status_code,
                body: response.body,
            },
            Err(e) => DeliveryOutcome::TransportError {
                detail: e.to_string(),
            },
        };

        log_outcome(self.transport.name(), recipients, self.api_key_len, &outcome);
        outcome
    }
}

fn log_outcome(
    transport: &str,
    recipients: &RecipientSet,
    api_key_len: usize,
    outcome: &DeliveryOutcome,
) {
    match outcome {
        DeliveryOutcome::Sent => {
            info!(transport, recipients = recipients.len(), "success");
        }
        DeliveryOutcome::RejectedByProvider { status_code, body } => {
            warn!(
                transport,
                status_code,
                api_key_len,
                body = %body,
                "failed with StatusCode={}",
                status_code
            );
        }
        DeliveryOutcome::TransportError { detail } => {
            error!(transport, api_key_len, error = %detail, "request failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::event::EventContext;
    use crate::mail::TransportResponse;
    use crate::report::ReportRenderer;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct StubTransport {
        status: Option<u16>,
        sent: Mutex<Vec<MailMessage>>,
    }

    impl StubTransport {
        fn answering(status: u16) -> Self {
            Self {
                status: Some(status),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                status: None,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MailTransport for StubTransport {
        fn name(&self) -> &str {
            "stub"
        }

        async fn send(&self, message: &MailMessage) -> Result<TransportResponse, TransportError> {
            self.sent.lock().unwrap().push(message.clone());
            match self.status {
                Some(status_code) => Ok(TransportResponse {
                    status_code,
                    body: "{}".to_string(),
                }),
                None => Err(TransportError::Task("connection refused".to_string())),
            }
        }
    }

    fn request(html: bool) -> NotificationRequest {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ctx = EventContext {
            service: "sshd".to_string(),
            user: "alice".to_string(),
            event_type: "open_session".to_string(),
            ..Default::default()
        };
        ReportRenderer::new("ssh-login-notify", "1.0.0", "host")
            .with_html(html)
            .render(ctx, at)
    }

    fn addresses() -> (SenderIdentity, RecipientSet) {
        (
            SenderIdentity::resolve("bot@x.com", "", "ssh-login-notify").unwrap(),
            RecipientSet::resolve("a@x.com,b@x.com").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_accepted_is_sent() {
        let transport = StubTransport::answering(202);
        let (sender, recipients) = addresses();

        let outcome = Dispatcher::new(&transport, 11)
            .deliver(request(true), &sender, &recipients)
            .await;

        assert_eq!(outcome, DeliveryOutcome::Sent);
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].personalizations.len(), 1);
        assert_eq!(sent[0].personalizations[0].to.len(), 2);
        assert_eq!(sent[0].content.len(), 2);
        assert_eq!(sent[0].subject, "sshd login on host for account alice");
    }

    #[tokio::test]
    async fn test_other_status_is_rejection() {
        // 200 is a success for HTTP but not SendGrid's "accepted".
        for status in [200, 400, 401, 500] {
            let transport = StubTransport::answering(status);
            let (sender, recipients) = addresses();

            let outcome = Dispatcher::new(&transport, 11)
                .deliver(request(false), &sender, &recipients)
                .await;

            assert_eq!(
                outcome,
                DeliveryOutcome::RejectedByProvider {
                    status_code: status,
                    body: "{}".to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let transport = StubTransport::unreachable();
        let (sender, recipients) = addresses();

        let outcome = Dispatcher::new(&transport, 11)
            .deliver(request(false), &sender, &recipients)
            .await;

        assert!(matches!(outcome, DeliveryOutcome::TransportError { ref detail } if detail.contains("connection refused")));
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
