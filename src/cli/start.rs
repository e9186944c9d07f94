use crate::cli::{actions::Action, commands, dispatch, globals::GlobalArgs, telemetry};
use anyhow::Result;
use clap::ArgMatches;
use tracing::Level;

/// `-v` count to the most verbose level shown; no flag keeps errors only.
const fn get_verbosity_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

fn init_logging(matches: &ArgMatches) -> Result<()> {
    let verbosity = matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or(0);
    telemetry::init(
        get_verbosity_level(verbosity),
        matches.get_flag(commands::logging::ARG_LOG_JSON),
    )
}

/// Parses the command line, installs the log subscriber and returns the
/// action to run together with the backend settings it runs against.
///
/// # Errors
///
/// Returns an error if telemetry cannot be installed or the arguments do not
/// form a valid action.
pub fn start() -> Result<(Action, GlobalArgs)> {
    let matches = commands::new().get_matches();
    init_logging(&matches)?;

    let globals = dispatch::globals(&matches)?;
    let action = dispatch::handler(&matches)?;
    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(get_verbosity_level(0), None);
        assert_eq!(get_verbosity_level(1), Some(Level::WARN));
        assert_eq!(get_verbosity_level(2), Some(Level::INFO));
        assert_eq!(get_verbosity_level(3), Some(Level::DEBUG));
        assert_eq!(get_verbosity_level(9), Some(Level::TRACE));
    }
}
