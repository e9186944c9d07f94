//! Maps validated CLI matches to an [`Action`] plus the shared settings.

use crate::{
    cli::{
        actions::{
            auth::LoginArgs,
            packages::PackageAction,
            users::{UserAction, UserChanges},
            Action,
        },
        commands::{auth, backend, packages, users},
        globals::GlobalArgs,
    },
    logistics::{
        packages::{NewPackage, PackageStatus, PackageUpdate, StatusFilter},
        users::UserForm,
    },
    session::{demo::demo_account, RecordId, Role},
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

/// # Errors
/// Returns an error if the session file location cannot be determined.
pub fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let options = backend::Options::parse(matches)?;

    let mut globals = GlobalArgs::new(options.api_url, options.session_file);
    globals.set_timeout(options.timeout);
    globals.json = options.json;

    Ok(globals)
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((auth::CMD_LOGIN, sub_m)) => login(sub_m).map(Action::Login),
        Some((auth::CMD_LOGOUT, _)) => Ok(Action::Logout),
        Some((auth::CMD_WHOAMI, _)) => Ok(Action::Whoami),
        Some((auth::CMD_VERIFY_EMAIL, sub_m)) => Ok(Action::VerifyEmail {
            token: required(sub_m, auth::ARG_TOKEN)?,
        }),
        Some((auth::CMD_RESEND_VERIFICATION, sub_m)) => Ok(Action::ResendVerification {
            email: required(sub_m, auth::ARG_EMAIL)?,
        }),
        Some((auth::CMD_DEMO_ACCOUNTS, _)) => Ok(Action::DemoAccounts),
        Some((packages::CMD_TRACK, sub_m)) => Ok(Action::Track {
            code: required(sub_m, packages::ARG_CODE)?,
        }),
        Some((packages::CMD_PACKAGES, sub_m)) => package_action(sub_m).map(Action::Packages),
        Some((packages::CMD_REPORT, sub_m)) => Ok(Action::Report {
            filter: filter(sub_m),
        }),
        Some((users::CMD_REGISTER, sub_m)) => user_form(sub_m, Role::Client).map(Action::Register),
        Some((users::CMD_USERS, sub_m)) => user_action(sub_m).map(Action::Users),
        Some((other, _)) => Err(anyhow!("unknown command: {other}")),
        None => Err(anyhow!("missing command, see --help")),
    }
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: {name}"))
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches
        .get_one::<String>(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn record_id(matches: &ArgMatches, name: &str) -> Result<RecordId> {
    required(matches, name).map(|id| RecordId::from(id.as_str()))
}

fn filter(matches: &ArgMatches) -> StatusFilter {
    matches
        .get_one::<StatusFilter>(packages::ARG_FILTER)
        .copied()
        .unwrap_or_default()
}

fn login(matches: &ArgMatches) -> Result<LoginArgs> {
    let (email, password) = match matches.get_one::<String>(auth::ARG_DEMO) {
        Some(role) => {
            let role: Role = role.parse().map_err(|err: String| anyhow!(err))?;
            let account =
                demo_account(role).with_context(|| format!("no demo account for {role}"))?;
            (account.email.to_string(), account.password.to_string())
        }
        None => (
            required(matches, auth::ARG_EMAIL)?,
            required(matches, auth::ARG_PASSWORD)?,
        ),
    };

    Ok(LoginArgs {
        email,
        password: SecretString::from(password),
        token: optional(matches, auth::ARG_TOKEN),
        request_token: matches.get_flag(auth::ARG_REQUEST_TOKEN),
    })
}

fn package_action(matches: &ArgMatches) -> Result<PackageAction> {
    match matches.subcommand() {
        Some((packages::CMD_LIST, sub_m)) => Ok(PackageAction::List {
            filter: filter(sub_m),
        }),
        Some((packages::CMD_MINE, _)) => Ok(PackageAction::Mine),
        Some((packages::CMD_DELIVERIES, sub_m)) => Ok(PackageAction::Deliveries {
            filter: filter(sub_m),
        }),
        Some((packages::CMD_CREATE, sub_m)) => Ok(PackageAction::Create(NewPackage {
            sender_name: required(sub_m, packages::ARG_SENDER)?,
            recipient_name: required(sub_m, packages::ARG_RECIPIENT)?,
            delivery_address: required(sub_m, packages::ARG_ADDRESS)?,
            weight: sub_m.get_one::<f64>(packages::ARG_WEIGHT).copied(),
            recipient_phone: optional(sub_m, packages::ARG_PHONE),
        })),
        Some((packages::CMD_STATUS, sub_m)) => Ok(PackageAction::Status {
            id: record_id(sub_m, packages::ARG_ID)?,
            status: sub_m
                .get_one::<PackageStatus>(packages::ARG_STATUS)
                .copied()
                .context("missing required argument: status")?,
        }),
        Some((packages::CMD_ASSIGN, sub_m)) => Ok(PackageAction::Assign {
            id: record_id(sub_m, packages::ARG_ID)?,
            messenger: if sub_m.get_flag(packages::ARG_AUTO) {
                None
            } else {
                Some(record_id(sub_m, packages::ARG_MESSENGER)?)
            },
        }),
        Some((packages::CMD_APPROVE, sub_m)) => Ok(PackageAction::Approve {
            id: record_id(sub_m, packages::ARG_ID)?,
        }),
        Some((packages::CMD_REJECT, sub_m)) => Ok(PackageAction::Reject {
            id: record_id(sub_m, packages::ARG_ID)?,
        }),
        Some((packages::CMD_EDIT, sub_m)) => Ok(PackageAction::Edit {
            id: record_id(sub_m, packages::ARG_ID)?,
            update: PackageUpdate {
                sender_name: optional(sub_m, packages::ARG_SENDER),
                recipient_name: optional(sub_m, packages::ARG_RECIPIENT),
                delivery_address: optional(sub_m, packages::ARG_ADDRESS),
                weight: sub_m.get_one::<f64>(packages::ARG_WEIGHT).copied(),
                recipient_phone: optional(sub_m, packages::ARG_PHONE),
            },
        }),
        Some((packages::CMD_QR, sub_m)) => Ok(PackageAction::Qr {
            id: record_id(sub_m, packages::ARG_ID)?,
        }),
        Some((other, _)) => Err(anyhow!("unknown packages command: {other}")),
        None => Err(anyhow!("missing packages command, see --help")),
    }
}

fn user_form(matches: &ArgMatches, role: Role) -> Result<UserForm> {
    Ok(UserForm {
        first_name: required(matches, users::ARG_FIRST_NAME)?,
        second_name: optional(matches, users::ARG_SECOND_NAME),
        last_name: required(matches, users::ARG_LAST_NAME)?,
        second_last_name: optional(matches, users::ARG_SECOND_LAST_NAME),
        document_number: required(matches, users::ARG_DOCUMENT)?,
        email: required(matches, users::ARG_EMAIL)?,
        address: optional(matches, users::ARG_ADDRESS),
        phone: optional(matches, users::ARG_PHONE),
        role,
        password: matches
            .get_one::<String>(users::ARG_PASSWORD)
            .cloned()
            .map(SecretString::from),
    })
}

fn user_action(matches: &ArgMatches) -> Result<UserAction> {
    match matches.subcommand() {
        Some((users::CMD_LIST, sub_m)) => Ok(UserAction::List {
            role: sub_m.get_one::<Role>(users::ARG_ROLE).copied(),
        }),
        Some((users::CMD_CREATE, sub_m)) => {
            let role = sub_m
                .get_one::<Role>(users::ARG_ROLE)
                .copied()
                .unwrap_or_default();
            user_form(sub_m, role).map(UserAction::Create)
        }
        Some((users::CMD_UPDATE, sub_m)) => Ok(UserAction::Update {
            id: record_id(sub_m, users::ARG_ID)?,
            changes: UserChanges {
                first_name: optional(sub_m, users::ARG_FIRST_NAME),
                second_name: optional(sub_m, users::ARG_SECOND_NAME),
                last_name: optional(sub_m, users::ARG_LAST_NAME),
                second_last_name: optional(sub_m, users::ARG_SECOND_LAST_NAME),
                document_number: optional(sub_m, users::ARG_DOCUMENT),
                email: optional(sub_m, users::ARG_EMAIL),
                address: optional(sub_m, users::ARG_ADDRESS),
                phone: optional(sub_m, users::ARG_PHONE),
                role: sub_m.get_one::<Role>(users::ARG_ROLE).copied(),
                password: optional(sub_m, users::ARG_PASSWORD).map(SecretString::from),
            },
        }),
        Some((users::CMD_DELETE, sub_m)) => Ok(UserAction::Delete {
            id: record_id(sub_m, users::ARG_ID)?,
        }),
        Some((other, _)) => Err(anyhow!("unknown users command: {other}")),
        None => Err(anyhow!("missing users command, see --help")),
    }
}
