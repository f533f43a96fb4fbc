//! Renders the human-readable report mailed for each event.

use crate::event::{EventContext, EventKind};
use chrono::{Local, NaiveDateTime};

/// The timestamp format used in the report body.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LABEL_WIDTH: usize = 15;
const RULE: &str = "------------------------------------";

/// A fully rendered notification, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub context: EventContext,
    pub kind: EventKind,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
    /// Local wall-clock time, formatted with [`DATE_FORMAT`].
    pub timestamp: String,
}

/// Static inputs to rendering that do not depend on the event.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    app_name: String,
    app_version: String,
    hostname: String,
    html: bool,
}

impl ReportRenderer {
    pub fn new(
        app_name: impl Into<String>,
        app_version: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            app_version: app_version.into(),
            hostname: hostname.into(),
            html: false,
        }
    }

    /// Also render an HTML alternative of the body.
    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    /// Renders the report stamped with the current local time.
    pub fn render_now(&self, context: EventContext) -> NotificationRequest {
        self.render(context, Local::now().naive_local())
    }

    /// Renders the report for `context` at `at`. Same inputs, same output.
    pub fn render(&self, context: EventContext, at: NaiveDateTime) -> NotificationRequest {
        let kind = context.kind();
        let timestamp = at.format(DATE_FORMAT).to_string();
        let subject = self.subject(&context, kind);
        let text_body = self.text_body(&context, &timestamp);
        let html_body = self.html.then(|| html_body(&text_body));

        NotificationRequest {
            context,
            kind,
            subject,
            text_body,
            html_body,
            timestamp,
        }
    }

    fn subject(&self, ctx: &EventContext, kind: EventKind) -> String {
        format!(
            "{} {} on {} for account {}",
            ctx.service,
            kind.operation_label(),
            self.hostname,
            ctx.user
        )
    }

    fn text_body(&self, ctx: &EventContext, timestamp: &str) -> String {
        let reported_by = format!("{} {}", self.app_name, self.app_version);
        let fields = [
            ("Service", ctx.service.as_str()),
            ("Type", ctx.event_type.as_str()),
            ("TTY", ctx.tty.as_str()),
            ("User", ctx.user.as_str()),
            ("Remote User", ctx.remote_user.as_str()),
            ("Remote Host", ctx.remote_host.as_str()),
            ("Date", timestamp),
            ("Hostname", self.hostname.as_str()),
            ("Reported By", reported_by.as_str()),
        ];

        let mut body = String::with_capacity(512);
        body.push_str(RULE);
        body.push('\n');
        for (label, value) in fields {
            body.push_str(&format!("{label:<LABEL_WIDTH$}: {value}\n"));
        }
        body.push_str(RULE);
        body.push('\n');
        body
    }
}

/// Wraps the plain body in a `<pre>` block. Field values come from the
/// remote side, so the whole body is escaped first.
fn html_body(text: &str) -> String {
    format!("<pre>\n{}</pre>\n", escape_html(text))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
