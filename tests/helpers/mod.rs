#![allow(dead_code)]

pub mod mock_transport;

use chrono::{NaiveDate, NaiveDateTime};
use ssh_login_notify::config::{Config, MAIL_FROM, MAIL_TO, SENDGRID_API_KEY};
use ssh_login_notify::event::{MapEnv, PAM_RHOST, PAM_SERVICE, PAM_TTY, PAM_TYPE, PAM_USER};
use ssh_login_notify::App;

pub const HOSTNAME: &str = "bastion";

pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(21, 3, 52)
        .unwrap()
}

/// An environment as `pam_exec` would set it up for an sshd event, with a
/// complete, valid mail configuration.
pub fn sshd_env(event_type: &str) -> MapEnv {
    MapEnv::new()
        .with(PAM_TYPE, event_type)
        .with(PAM_SERVICE, "sshd")
        .with(PAM_USER, "alice")
        .with(PAM_RHOST, "10.0.0.5")
        .with(PAM_TTY, "ssh")
        .with(MAIL_FROM, "bot@x.com")
        .with(MAIL_TO, "ops@x.com")
        .with(SENDGRID_API_KEY, "SG.test-key")
}

pub fn test_app(config: Config) -> App {
    App::new(config, HOSTNAME).at(fixed_time())
}
