//! Command-Line Interface (CLI) argument parsing.
//!
//! `pam_exec` usually runs the binary without arguments; these flags exist
//! for testing a deployment by hand. They are merged on top of the file
//! and environment configuration.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Emails a report for every PAM login, logout and password event.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Send an HTML alternative along with the plain-text report.
    #[arg(long)]
    pub html: bool,

    /// Render and validate everything, but do not send the email.
    #[arg(long)]
    pub dry_run: bool,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        // Flags only ever switch things on; absent means "leave it to the file".
        if self.dry_run {
            dict.insert("dry_run".into(), Value::from(true));
        }

        if self.html {
            let mut mail = Dict::new();
            mail.insert("html".into(), Value::from(true));
            dict.insert("mail".into(), Value::Dict(Tag::Default, mail));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
