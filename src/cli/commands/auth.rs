use clap::{Arg, ArgAction, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_VERIFY_EMAIL: &str = "verify-email";
pub const CMD_RESEND_VERIFICATION: &str = "resend-verification";
pub const CMD_DEMO_ACCOUNTS: &str = "demo-accounts";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_TOKEN: &str = "token";
pub const ARG_REQUEST_TOKEN: &str = "request-token";
pub const ARG_DEMO: &str = "demo";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .subcommand(login())
        .subcommand(Command::new(CMD_LOGOUT).about("Close the stored session"))
        .subcommand(Command::new(CMD_WHOAMI).about("Show the logged-in user and what the role may do"))
        .subcommand(
            Command::new(CMD_VERIFY_EMAIL)
                .about("Confirm an email address with the token from the verification link")
                .arg(Arg::new(ARG_TOKEN).help("Verification token").required(true)),
        )
        .subcommand(
            Command::new(CMD_RESEND_VERIFICATION)
                .about("Send the verification email again")
                .arg(Arg::new(ARG_EMAIL).help("Account email").required(true)),
        )
        .subcommand(Command::new(CMD_DEMO_ACCOUNTS).about("List the demo accounts"))
}

fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Log in and store the session")
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long("email")
                .help("Account email")
                .env("LOGISTICA_EMAIL")
                .required_unless_present(ARG_DEMO),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long("password")
                .help("Account password")
                .env("LOGISTICA_PASSWORD")
                .hide_env_values(true)
                .required_unless_present(ARG_DEMO),
        )
        .arg(
            Arg::new(ARG_TOKEN)
                .short('t')
                .long("token")
                .help("Temporary verification token for accounts that are not verified yet"),
        )
        .arg(
            Arg::new(ARG_REQUEST_TOKEN)
                .long("request-token")
                .help("If the account needs verification, generate a temporary token and use it")
                .action(ArgAction::SetTrue)
                .conflicts_with(ARG_TOKEN),
        )
        .arg(
            Arg::new(ARG_DEMO)
                .long("demo")
                .help("Log in with the demo account for a role, ignoring --email and --password")
                .value_parser(["operator", "messenger", "client"]),
        )
}
