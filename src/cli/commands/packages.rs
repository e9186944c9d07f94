use crate::logistics::packages::{PackageStatus, StatusFilter};
use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const CMD_TRACK: &str = "track";
pub const CMD_PACKAGES: &str = "packages";
pub const CMD_REPORT: &str = "report";

pub const CMD_LIST: &str = "list";
pub const CMD_MINE: &str = "mine";
pub const CMD_DELIVERIES: &str = "deliveries";
pub const CMD_CREATE: &str = "create";
pub const CMD_STATUS: &str = "status";
pub const CMD_ASSIGN: &str = "assign";
pub const CMD_APPROVE: &str = "approve";
pub const CMD_REJECT: &str = "reject";
pub const CMD_EDIT: &str = "edit";
pub const CMD_QR: &str = "qr";

pub const ARG_CODE: &str = "code";
pub const ARG_ID: &str = "id";
pub const ARG_FILTER: &str = "filter";
pub const ARG_STATUS: &str = "status";
pub const ARG_MESSENGER: &str = "messenger";
pub const ARG_AUTO: &str = "auto";
pub const ARG_SENDER: &str = "sender";
pub const ARG_RECIPIENT: &str = "recipient";
pub const ARG_ADDRESS: &str = "address";
pub const ARG_WEIGHT: &str = "weight";
pub const ARG_PHONE: &str = "phone";

#[must_use]
pub fn validator_status() -> ValueParser {
    ValueParser::from(|value: &str| value.parse::<PackageStatus>())
}

#[must_use]
pub fn validator_filter() -> ValueParser {
    ValueParser::from(|value: &str| value.parse::<StatusFilter>())
}

fn id_arg() -> Arg {
    Arg::new(ARG_ID).help("Package id").required(true)
}

fn filter_arg() -> Arg {
    Arg::new(ARG_FILTER)
        .short('f')
        .long("filter")
        .help("pending, in-progress, delivered or all")
        .default_value("all")
        .value_parser(validator_filter())
}

fn package_fields(command: Command, required: bool) -> Command {
    command
        .arg(
            Arg::new(ARG_SENDER)
                .long("sender")
                .help("Sender name")
                .required(required),
        )
        .arg(
            Arg::new(ARG_RECIPIENT)
                .long("recipient")
                .help("Recipient name")
                .required(required),
        )
        .arg(
            Arg::new(ARG_ADDRESS)
                .long("address")
                .help("Delivery address")
                .required(required),
        )
        .arg(
            Arg::new(ARG_WEIGHT)
                .long("weight")
                .help("Weight in kilograms")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new(ARG_PHONE)
                .long("phone")
                .help("Recipient phone"),
        )
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .subcommand(
            Command::new(CMD_TRACK)
                .about("Look up a package by tracking code")
                .arg(Arg::new(ARG_CODE).help("Tracking code").required(true)),
        )
        .subcommand(packages())
        .subcommand(
            Command::new(CMD_REPORT)
                .about("Shipment summary by status and messenger")
                .arg(filter_arg()),
        )
}

fn packages() -> Command {
    Command::new(CMD_PACKAGES)
        .about("Shipment management")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_LIST)
                .about("All packages (operators and admins)")
                .arg(filter_arg()),
        )
        .subcommand(Command::new(CMD_MINE).about("Packages of the logged-in client"))
        .subcommand(
            Command::new(CMD_DELIVERIES)
                .about("Deliveries assigned to the logged-in messenger")
                .arg(filter_arg()),
        )
        .subcommand(package_fields(
            Command::new(CMD_CREATE).about("Register a package"),
            true,
        ))
        .subcommand(
            Command::new(CMD_STATUS)
                .about("Change the status of a package")
                .arg(id_arg())
                .arg(
                    Arg::new(ARG_STATUS)
                        .help("registered, approved, rejected, in-transit, out-for-delivery, delivered or cancelled")
                        .required(true)
                        .value_parser(validator_status()),
                ),
        )
        .subcommand(
            Command::new(CMD_ASSIGN)
                .about("Assign a messenger to a package")
                .arg(id_arg())
                .arg(
                    Arg::new(ARG_MESSENGER)
                        .long("messenger")
                        .help("Messenger id")
                        .required_unless_present(ARG_AUTO),
                )
                .arg(
                    Arg::new(ARG_AUTO)
                        .long("auto")
                        .help("Let the backend pick a messenger")
                        .action(ArgAction::SetTrue)
                        .conflicts_with(ARG_MESSENGER),
                ),
        )
        .subcommand(
            Command::new(CMD_APPROVE)
                .about("Approve a registered package")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new(CMD_REJECT)
                .about("Reject a registered package")
                .arg(id_arg()),
        )
        .subcommand(package_fields(
            Command::new(CMD_EDIT)
                .about("Edit package details")
                .arg(id_arg()),
            false,
        ))
        .subcommand(
            Command::new(CMD_QR)
                .about("Print the QR label address of a package")
                .arg(id_arg()),
        )
}
