//! Configuration management for ssh-login-notify
//!
//! Settings are layered with `figment`: built-in defaults, an optional TOML
//! file, `LOGIN_NOTIFY_*` environment variables, and finally command-line
//! arguments. The mail settings have one more layer on top: the
//! `MAIL_FROM`, `MAIL_FROM_NAME`, `MAIL_TO` and `SENDGRID_API_KEY` variables
//! that `pam_exec` deployments pass on the command line.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::event::EnvSource;
use crate::mail::SENDGRID_API_URL;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read when no `--config` is given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ssh-login-notify.toml";

pub const ENV_PREFIX: &str = "LOGIN_NOTIFY_";

/// The only settings `LOGIN_NOTIFY_*` variables may change. The PAM user
/// controls part of the environment, so where the API key is sent and
/// whether anything is sent at all stay out of reach.
pub const ENV_OVERRIDABLE: &[&str] = &["log_level", "app_name", "mail.html"];

pub const MAIL_FROM: &str = "MAIL_FROM";
pub const MAIL_FROM_NAME: &str = "MAIL_FROM_NAME";
pub const MAIL_TO: &str = "MAIL_TO";
pub const SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level, overridden by `RUST_LOG` when set.
    pub log_level: String,
    /// Used as the default sender name and in the report trailer.
    pub app_name: String,
    /// Render and validate, but never contact the mail API.
    #[serde(default)]
    pub dry_run: bool,
    pub mail: MailConfig,
    pub sendgrid: SendGridConfig,
}

/// File-level mail settings. Each one yields to its environment variable.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct MailConfig {
    /// Also send an HTML alternative of the report.
    #[serde(default)]
    pub html: bool,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    /// One address, or several separated by commas.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SendGridConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
}

/// The mail settings in effect for this run, not yet validated.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct MailSettings {
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub api_key: String,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("from", &self.from)
            .field("from_name", &self.from_name)
            .field("to", &self.to)
            .field("api_key_len", &self.api_key.len())
            .finish()
    }
}

impl MailConfig {
    /// Applies the environment on top of the file settings. A variable that
    /// is set but empty counts as unset.
    pub fn effective(&self, env: &impl EnvSource) -> MailSettings {
        let pick = |key: &str, fallback: &Option<String>| {
            let value = env.var(key);
            if value.is_empty() {
                fallback.clone().unwrap_or_default()
            } else {
                value
            }
        };

        MailSettings {
            from: pick(MAIL_FROM, &self.from),
            from_name: pick(MAIL_FROM_NAME, &self.from_name),
            to: pick(MAIL_TO, &self.to),
            api_key: pick(SENDGRID_API_KEY, &self.api_key),
        }
    }
}

impl Config {
    /// Loads the configuration, layering defaults, the TOML file,
    /// `LOGIN_NOTIFY_*` variables and the CLI arguments.
    ///
    /// An explicitly requested file must exist; the default one is optional.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        match &cli.config {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Load(format!(
                        "configuration file not found: {}",
                        path.display()
                    )));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if Path::new(DEFAULT_CONFIG_PATH).exists() {
                    figment = figment.merge(Toml::file(DEFAULT_CONFIG_PATH));
                }
            }
        }

        let config = figment
            // e.g. LOGIN_NOTIFY_LOG_LEVEL=debug, LOGIN_NOTIFY_MAIL__HTML=true
            .merge(env_provider())
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

/// `LOGIN_NOTIFY_*` variables, restricted to [`ENV_OVERRIDABLE`].
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .split("__")
        .filter(|key| env_key_allowed(key.as_str()))
}

fn env_key_allowed(key: &str) -> bool {
    ENV_OVERRIDABLE
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(key))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            app_name: env!("CARGO_PKG_NAME").to_string(),
            dry_run: false,
            mail: MailConfig::default(),
            sendgrid: SendGridConfig {
                api_url: SENDGRID_API_URL.to_string(),
                timeout_seconds: 10,
            },
        }
    }
}
