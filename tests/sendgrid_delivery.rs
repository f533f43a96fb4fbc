//! End-to-end delivery through the real SendGrid client against a mock API.

mod helpers;

use helpers::{sshd_env, test_app, HOSTNAME};
use serde_json::json;
use ssh_login_notify::config::Config;
use ssh_login_notify::mail::{MailTransport, SendGridClient};
use ssh_login_notify::{DeliveryOutcome, RunOutcome};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sendgrid_at(server: &MockServer) -> impl FnOnce(ssh_login_notify::mail::ApiKey) -> Box<dyn MailTransport> {
    let url = format!("{}/v3/mail/send", server.uri());
    move |key| -> Box<dyn MailTransport> {
        Box::new(
            SendGridClient::new(key)
                .with_api_url(url)
                .with_timeout(Duration::from_secs(5)),
        )
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_reaches_sendgrid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("authorization", "Bearer SG.test-key"))
        .and(body_partial_json(json!({
            "personalizations": [{ "to": [{ "email": "ops@x.com" }] }],
            "from": { "email": "bot@x.com", "name": "ssh-login-notify" },
            "subject": format!("sshd login on {} for account alice", HOSTNAME),
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = test_app(Config::default())
        .run(&sshd_env("open_session"), sendgrid_at(&server))
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Delivered(DeliveryOutcome::Sent));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_key_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"errors":[{"message":"The provided authorization grant is invalid"}]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = test_app(Config::default())
        .run(&sshd_env("password"), sendgrid_at(&server))
        .await
        .unwrap();

    match outcome {
        RunOutcome::Delivered(DeliveryOutcome::RejectedByProvider { status_code, body }) => {
            assert_eq!(status_code, 401);
            assert!(body.contains("authorization grant"));
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_session_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = test_app(Config::default())
        .run(&sshd_env("close_session"), sendgrid_at(&server))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Skipped(_)));
}
