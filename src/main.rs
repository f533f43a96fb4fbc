//! ssh-login-notify
//!
//! Hook it into PAM with `pam_exec`, for example in `/etc/pam.d/sshd`:
//!
//! ```text
//! session optional pam_exec.so seteuid /usr/bin/env SENDGRID_API_KEY=... MAIL_FROM=bot@example.com MAIL_TO=ops@example.com /usr/local/bin/ssh-login-notify
//! ```

use anyhow::Result;
use clap::Parser;
use ssh_login_notify::{
    cli::Cli,
    config::Config,
    event::ProcessEnv,
    logging,
    mail::{MailTransport, SendGridClient},
    App, RunOutcome,
};
use std::time::Duration;
use sysinfo::System;
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli).unwrap_or_else(|err| {
        logging::init("info");
        error!("{}", err);
        std::process::exit(1);
    });
    logging::init(&config.log_level);

    let hostname = System::host_name().unwrap_or_default();
    let sendgrid = config.sendgrid.clone();
    let app = App::new(config, hostname);

    let result = app
        .run(&ProcessEnv, move |api_key| -> Box<dyn MailTransport> {
            Box::new(
                SendGridClient::new(api_key)
                    .with_api_url(sendgrid.api_url)
                    .with_timeout(Duration::from_secs(sendgrid.timeout_seconds)),
            )
        })
        .await;

    match result {
        Ok(RunOutcome::Delivered(outcome)) => debug!(?outcome, "Finished."),
        Ok(RunOutcome::Skipped(request)) => {
            debug!(event = %request.kind, "Finished without sending, event is not mailed.")
        }
        Ok(RunOutcome::DryRun(request)) => {
            debug!(subject = %request.subject, "Finished without sending, dry run.")
        }
        // A broken deployment is the one case worth failing the PAM module for.
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    }

    Ok(())
}
