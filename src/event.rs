//! PAM event context and classification.
//!
//! `pam_exec` runs the notifier with the PAM items exported as environment
//! variables: `PAM_RHOST`, `PAM_RUSER`, `PAM_SERVICE`, `PAM_TTY`, `PAM_USER`
//! and `PAM_TYPE`. None of them is guaranteed to be set, and the user may
//! control parts of the environment, so every field is treated as an
//! arbitrary, possibly empty string.

use std::collections::HashMap;
use std::fmt;

pub const PAM_RHOST: &str = "PAM_RHOST";
pub const PAM_RUSER: &str = "PAM_RUSER";
pub const PAM_SERVICE: &str = "PAM_SERVICE";
pub const PAM_TTY: &str = "PAM_TTY";
pub const PAM_USER: &str = "PAM_USER";
pub const PAM_TYPE: &str = "PAM_TYPE";

/// A read-only view of the environment the notifier was started with.
pub trait EnvSource {
    /// Returns the value of `key`, or an empty string when it is unset or
    /// not valid unicode.
    fn var(&self, key: &str) -> String;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> String {
        std::env::var(key).unwrap_or_default()
    }
}

/// An in-memory environment, used by tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> String {
        self.vars.get(key).cloned().unwrap_or_default()
    }
}

/// The context of a single PAM event, captured once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
    pub remote_host: String,
    pub remote_user: String,
    pub service: String,
    pub tty: String,
    pub user: String,
    pub event_type: String,
}

impl EventContext {
    /// Reads the PAM items from `env`. Absent variables become empty strings.
    pub fn from_env(env: &impl EnvSource) -> Self {
        Self {
            remote_host: env.var(PAM_RHOST),
            remote_user: env.var(PAM_RUSER),
            service: env.var(PAM_SERVICE),
            tty: env.var(PAM_TTY),
            user: env.var(PAM_USER),
            event_type: env.var(PAM_TYPE),
        }
    }

    pub fn kind(&self) -> EventKind {
        EventKind::classify(&self.event_type)
    }
}

/// The PAM module type that triggered the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Account,
    Auth,
    Password,
    OpenSession,
    CloseSession,
    Unknown,
}

impl EventKind {
    /// Maps a raw `PAM_TYPE` value onto a kind. Matching is exact and
    /// case-sensitive; anything unrecognised is `Unknown`.
    pub fn classify(event_type: &str) -> Self {
        match event_type {
            "account" => EventKind::Account,
            "auth" => EventKind::Auth,
            "password" => EventKind::Password,
            "open_session" => EventKind::OpenSession,
            "close_session" => EventKind::CloseSession,
            _ => EventKind::Unknown,
        }
    }

    /// Logouts are reported in the log but never mailed.
    pub fn should_dispatch(self) -> bool {
        self != EventKind::CloseSession
    }

    /// The word used for this kind in the mail subject.
    ///
    /// `Account` and `Auth` have no label of their own and share `"unknown"`.
    pub fn operation_label(self) -> &'static str {
        match self {
            EventKind::OpenSession => "login",
            EventKind::CloseSession => "logout",
            EventKind::Password => "password",
            EventKind::Account | EventKind::Auth | EventKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Account => "account",
            EventKind::Auth => "auth",
            EventKind::Password => "password",
            EventKind::OpenSession => "open_session",
            EventKind::CloseSession => "close_session",
            EventKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
