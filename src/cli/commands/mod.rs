pub mod auth;
pub mod backend;
pub mod logging;
pub mod packages;
pub mod users;

use crate::GIT_COMMIT_HASH;
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str =
        Box::leak(format!("{} - {}", env!("CARGO_PKG_VERSION"), GIT_COMMIT_HASH).into_boxed_str());

    let command = Command::new(env!("CARGO_PKG_NAME"))
        .about("Logistics console: package tracking, shipments and users")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true);

    let command = backend::with_args(command);
    let command = auth::with_args(command);
    let command = packages::with_args(command);
    let command = users::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logistics::packages::{PackageStatus, StatusFilter};
    use std::path::PathBuf;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "logistica");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Logistics console: package tracking, shipments and users"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_command_definition_is_valid() {
        new().debug_assert();
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("LOGISTICA_API_URL", None::<&str>),
                ("LOGISTICA_TIMEOUT", None::<&str>),
                ("LOGISTICA_SESSION_FILE", None::<&str>),
            ],
            || {
                let matches = new().get_matches_from(vec!["logistica", "whoami"]);
                assert_eq!(
                    matches
                        .get_one::<String>(backend::ARG_API_URL)
                        .map(String::as_str),
                    Some("http://localhost:3001")
                );
                assert_eq!(matches.get_one::<u64>(backend::ARG_TIMEOUT), None);
                assert_eq!(matches.subcommand_name(), Some(auth::CMD_WHOAMI));
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("LOGISTICA_API_URL", Some("https://api.logistica.test")),
                ("LOGISTICA_SESSION_FILE", Some("/tmp/logistica.json")),
                ("LOGISTICA_TIMEOUT", Some("15")),
                ("LOGISTICA_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["logistica", "logout"]);
                assert_eq!(
                    matches
                        .get_one::<String>(backend::ARG_API_URL)
                        .map(String::as_str),
                    Some("https://api.logistica.test")
                );
                assert_eq!(
                    matches.get_one::<PathBuf>(backend::ARG_SESSION_FILE),
                    Some(&PathBuf::from("/tmp/logistica.json"))
                );
                assert_eq!(matches.get_one::<u64>(backend::ARG_TIMEOUT), Some(&15));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("LOGISTICA_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["logistica", "whoami"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("LOGISTICA_LOG_LEVEL", None::<&str>)], || {
                let mut args = vec!["logistica".to_string(), "whoami".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }
                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_login_args() {
        temp_env::with_vars(
            [
                ("LOGISTICA_EMAIL", None::<&str>),
                ("LOGISTICA_PASSWORD", Some("password")),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "logistica",
                    "login",
                    "--email",
                    "juan@example.com",
                    "--token",
                    "123456",
                ]);
                let (name, login) = matches.subcommand().unwrap();
                assert_eq!(name, auth::CMD_LOGIN);
                assert_eq!(
                    login.get_one::<String>(auth::ARG_PASSWORD).map(String::as_str),
                    Some("password")
                );
                assert_eq!(
                    login.get_one::<String>(auth::ARG_TOKEN).map(String::as_str),
                    Some("123456")
                );
            },
        );
    }

    #[test]
    fn test_login_requires_password() {
        temp_env::with_vars([("LOGISTICA_PASSWORD", None::<&str>)], || {
            let result = new().try_get_matches_from(vec![
                "logistica",
                "login",
                "--email",
                "juan@example.com",
            ]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_package_status_and_filter_parsing() {
        let matches = new().get_matches_from(vec![
            "logistica",
            "packages",
            "status",
            "12",
            "out-for-delivery",
        ]);
        let (_, packages_m) = matches.subcommand().unwrap();
        let (_, status) = packages_m.subcommand().unwrap();
        assert_eq!(
            status.get_one::<PackageStatus>(packages::ARG_STATUS),
            Some(&PackageStatus::OutForDelivery)
        );

        let matches =
            new().get_matches_from(vec!["logistica", "report", "--filter", "in-progress"]);
        let (_, report) = matches.subcommand().unwrap();
        assert_eq!(
            report.get_one::<StatusFilter>(packages::ARG_FILTER),
            Some(&StatusFilter::InProgress)
        );

        assert!(new()
            .try_get_matches_from(vec!["logistica", "packages", "status", "12", "lost"])
            .is_err());
    }

    #[test]
    fn test_assign_needs_messenger_or_auto() {
        assert!(new()
            .try_get_matches_from(vec!["logistica", "packages", "assign", "3"])
            .is_err());
        assert!(new()
            .try_get_matches_from(vec!["logistica", "packages", "assign", "3", "--auto"])
            .is_ok());
        assert!(new()
            .try_get_matches_from(vec![
                "logistica",
                "packages",
                "assign",
                "3",
                "--auto",
                "--messenger",
                "7"
            ])
            .is_err());
    }
}
