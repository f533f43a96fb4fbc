//! ssh-login-notify - PAM event email notifier
//!
//! Run by `pam_exec` on every login, logout and password change. It reads
//! the PAM items from the environment, renders a short report and mails it
//! through SendGrid. Delivery is best-effort: only a misconfigured
//! deployment makes the process fail.

pub mod address;
pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod logging;
pub mod mail;
pub mod report;

pub use app::{App, RunOutcome};
pub use dispatch::DeliveryOutcome;
pub use error::ConfigError;
pub use event::{EventContext, EventKind};
