//! The notification pipeline: extract, classify, render, resolve, dispatch.

use crate::address::{RecipientSet, SenderIdentity};
use crate::config::Config;
use crate::dispatch::{DeliveryOutcome, Dispatcher};
use crate::error::ConfigError;
use crate::event::{EnvSource, EventContext};
use crate::mail::{ApiKey, MailTransport};
use crate::report::{NotificationRequest, ReportRenderer};
use chrono::NaiveDateTime;
use tracing::{debug, info};

/// The version printed in the report trailer.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How a run ended. Every variant maps to exit status 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The event kind is never mailed.
    Skipped(NotificationRequest),
    /// `dry_run` was set; the message was never handed to the transport.
    DryRun(NotificationRequest),
    Delivered(DeliveryOutcome),
}

/// One notifier run. Everything it needs is passed in at construction.
pub struct App {
    config: Config,
    renderer: ReportRenderer,
    now: Option<NaiveDateTime>,
}

impl App {
    pub fn new(config: Config, hostname: impl Into<String>) -> Self {
        let renderer = ReportRenderer::new(config.app_name.clone(), APP_VERSION, hostname)
            .with_html(config.mail.html);
        Self {
            config,
            renderer,
            now: None,
        }
    }

    /// Pins the report timestamp instead of reading the clock.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Runs the pipeline once against `env`.
    ///
    /// `connect` builds the transport from the validated API key and is
    /// called at most once. Only configuration problems are returned as
    /// errors; delivery failures end up in [`RunOutcome::Delivered`].
    pub async fn run<F>(&self, env: &impl EnvSource, connect: F) -> Result<RunOutcome, ConfigError>
    where
        F: FnOnce(ApiKey) -> Box<dyn MailTransport>,
    {
        let context = EventContext::from_env(env);
        let request = match self.now {
            Some(at) => self.renderer.render(context, at),
            None => self.renderer.render_now(context),
        };
        info!(kind = %request.kind, "mail content: {}", request.text_body);

        if !request.kind.should_dispatch() {
            info!(kind = %request.kind, "Not mailing this event type.");
            return Ok(RunOutcome::Skipped(request));
        }

        let settings = self.config.mail.effective(env);
        debug!(?settings, "Resolved mail settings.");
        let sender = SenderIdentity::resolve(&settings.from, &settings.from_name, &self.config.app_name)?;
        let recipients = RecipientSet::resolve(&settings.to)?;
        let api_key = ApiKey::new(settings.api_key)?;

        if self.config.dry_run {
            info!(
                from = %sender.email,
                to = ?recipients.as_slice(),
                subject = %request.subject,
                "Dry run, not sending."
            );
            return Ok(RunOutcome::DryRun(request));
        }

        let api_key_len = api_key.redacted_len();
        let transport = connect(api_key);
        let outcome = Dispatcher::new(transport.as_ref(), api_key_len)
            .deliver(request, &sender, &recipients)
            .await;
        Ok(RunOutcome::Delivered(outcome))
    }
}
