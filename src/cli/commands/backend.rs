use crate::api::DEFAULT_API_URL;
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{path::PathBuf, time::Duration};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_JSON: &str = "json";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Backend base URL")
                .env("LOGISTICA_API_URL")
                .default_value(DEFAULT_API_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long("session-file")
                .help("Where the session is stored (default: <data dir>/logistica/session.json)")
                .env("LOGISTICA_SESSION_FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long("timeout")
                .help("Request timeout in seconds (default: no timeout)")
                .env("LOGISTICA_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
        .arg(
            Arg::new(ARG_JSON)
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue)
                .global(true),
        )
}

#[derive(Debug)]
pub struct Options {
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout: Option<Duration>,
    pub json: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if no session file is given and the platform has no
    /// data directory.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let api_url = matches
            .get_one::<String>(ARG_API_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let session_file = match matches.get_one::<PathBuf>(ARG_SESSION_FILE) {
            Some(path) => path.clone(),
            None => default_session_file()?,
        };

        Ok(Self {
            api_url,
            session_file,
            timeout: matches
                .get_one::<u64>(ARG_TIMEOUT)
                .map(|secs| Duration::from_secs(*secs)),
            json: matches.get_flag(ARG_JSON),
        })
    }
}

/// `<data dir>/logistica/session.json`.
///
/// # Errors
/// Returns an error if the platform has no data directory.
pub fn default_session_file() -> Result<PathBuf> {
    let dir = dirs::data_dir().context("could not determine the data directory, use --session-file")?;
    Ok(dir.join(env!("CARGO_PKG_NAME")).join("session.json"))
}
