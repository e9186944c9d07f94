use crate::session::Role;
use clap::{builder::ValueParser, Arg, Command};

pub const CMD_USERS: &str = "users";
pub const CMD_REGISTER: &str = "register";

pub const CMD_LIST: &str = "list";
pub const CMD_CREATE: &str = "create";
pub const CMD_UPDATE: &str = "update";
pub const CMD_DELETE: &str = "delete";

pub const ARG_ID: &str = "id";
pub const ARG_ROLE: &str = "role";
pub const ARG_FIRST_NAME: &str = "first-name";
pub const ARG_SECOND_NAME: &str = "second-name";
pub const ARG_LAST_NAME: &str = "last-name";
pub const ARG_SECOND_LAST_NAME: &str = "second-last-name";
pub const ARG_DOCUMENT: &str = "document";
pub const ARG_EMAIL: &str = "email";
pub const ARG_ADDRESS: &str = "address";
pub const ARG_PHONE: &str = "phone";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn validator_role() -> ValueParser {
    ValueParser::from(|value: &str| value.parse::<Role>())
}

fn role_arg() -> Arg {
    Arg::new(ARG_ROLE)
        .long("role")
        .help("client, operator, messenger or admin")
        .value_parser(validator_role())
}

/// Account fields. `required` marks the ones a new account needs.
fn user_fields(command: Command, required: bool) -> Command {
    command
        .arg(
            Arg::new(ARG_FIRST_NAME)
                .long("first-name")
                .required(required),
        )
        .arg(Arg::new(ARG_SECOND_NAME).long("second-name"))
        .arg(
            Arg::new(ARG_LAST_NAME)
                .long("last-name")
                .required(required),
        )
        .arg(Arg::new(ARG_SECOND_LAST_NAME).long("second-last-name"))
        .arg(
            Arg::new(ARG_DOCUMENT)
                .long("document")
                .help("Document number")
                .required(required),
        )
        .arg(Arg::new(ARG_EMAIL).long("email").required(required))
        .arg(Arg::new(ARG_ADDRESS).long("address"))
        .arg(Arg::new(ARG_PHONE).long("phone"))
        .arg(
            Arg::new(ARG_PASSWORD)
                .long("password")
                .help("At least 8 characters")
                .env("LOGISTICA_NEW_PASSWORD")
                .hide_env_values(true)
                .required(required),
        )
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .subcommand(user_fields(
            Command::new(CMD_REGISTER).about("Create a client account (email verification required)"),
            true,
        ))
        .subcommand(users())
}

fn users() -> Command {
    Command::new(CMD_USERS)
        .about("User administration")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_LIST)
                .about("List users, optionally by role")
                .arg(role_arg()),
        )
        .subcommand(user_fields(
            Command::new(CMD_CREATE)
                .about("Create a user")
                .arg(role_arg().default_value("client")),
            true,
        ))
        .subcommand(user_fields(
            Command::new(CMD_UPDATE)
                .about("Update a user; omitted fields keep their value")
                .arg(Arg::new(ARG_ID).help("User id").required(true))
                .arg(role_arg()),
            false,
        ))
        .subcommand(
            Command::new(CMD_DELETE)
                .about("Delete a user (admins cannot be deleted)")
                .arg(Arg::new(ARG_ID).help("User id").required(true)),
        )
}
