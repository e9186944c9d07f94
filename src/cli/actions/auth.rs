use crate::{
    cli::{actions::output, globals::GlobalArgs},
    session::{
        demo, AuthApi, Credentials, KeyValueStore, SessionCommand, SessionState,
        SessionStore,
    },
};
use anyhow::Result;
use secrecy::SecretString;
use serde_json::json;
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct LoginArgs {
    pub email: String,
    pub password: SecretString,
    pub token: Option<String>,
    pub request_token: bool,
}

/// Runs one command and prints its notice. The error is returned unchanged so
/// the binary reports it once.
async fn run<A: AuthApi, K: KeyValueStore>(
    store: &mut SessionStore<A, K>,
    command: SessionCommand,
) -> Result<SessionState> {
    let result = store.dispatch(command).await;
    output::notice(store.notice());
    Ok(result?)
}

/// Logs in. Accounts that need verification either use `--token` up front
/// or, with `--request-token`, generate one and submit it in the same run.
///
/// # Errors
/// Returns an error if the login fails or the session cannot be stored.
#[instrument(skip_all, fields(email = %args.email))]
pub async fn login(args: LoginArgs, globals: &GlobalArgs) -> Result<()> {
    let mut store = globals.session_store()?;
    let LoginArgs {
        email,
        password,
        token,
        request_token,
    } = args;

    let credentials = Credentials {
        email: email.clone(),
        password,
        temporary_token: token,
    };
    let mut state = run(&mut store, SessionCommand::Submit(credentials)).await?;

    if state.is_awaiting_token() {
        if !request_token {
            eprintln!(
                "Run `logistica login --email {email} --token <TOKEN>` with the temporary token, \
                 or add --request-token to generate one."
            );
            return Ok(());
        }

        run(&mut store, SessionCommand::RequestToken(email.clone())).await?;
        let Some(token) = store.controller().issued_token().map(str::to_string) else {
            eprintln!(
                "A temporary token was sent to {email}. Run `logistica login --email {email} --token <TOKEN>`."
            );
            return Ok(());
        };
        debug!("submitting generated token");
        state = run(&mut store, SessionCommand::SubmitToken(token)).await?;
    }

    if let Some(session) = state.session() {
        if globals.json {
            output::json(&session.user)?;
        }
    }
    Ok(())
}

/// # Errors
/// Returns an error if the session file cannot be cleared.
#[instrument(skip_all)]
pub async fn logout(globals: &GlobalArgs) -> Result<()> {
    let mut store = globals.session_store()?;
    if !store.get().is_logged_in() {
        println!("Not logged in.");
        return Ok(());
    }
    run(&mut store, SessionCommand::Logout).await?;
    Ok(())
}

/// # Errors
/// Returns an error if the session file cannot be read.
pub fn whoami(globals: &GlobalArgs) -> Result<()> {
    let store = globals.session_store()?;
    let state = store.get();
    let Some(session) = state.session() else {
        if globals.json {
            return output::json(&json!({ "logged_in": false }));
        }
        println!("Not logged in.");
        return Ok(());
    };

    let role = session.role();
    if globals.json {
        return output::json(&json!({
            "logged_in": true,
            "user": session.user,
            "capabilities": role
                .capabilities()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
        }));
    }

    println!("{}", session.user.display_name());
    if let Some(email) = &session.user.email {
        println!("Email   {email}");
    }
    println!("Role    {}", role.label());
    println!("Can:");
    for capability in role.capabilities() {
        println!("  - {}", capability.description());
    }
    Ok(())
}

/// # Errors
/// Returns an error if the token is rejected.
#[instrument(skip_all)]
pub async fn verify_email(token: &str, globals: &GlobalArgs) -> Result<()> {
    let mut store = globals.session_store()?;
    run(&mut store, SessionCommand::VerifyEmail(token.to_string())).await?;
    Ok(())
}

/// # Errors
/// Returns an error if the request fails.
#[instrument(skip_all)]
pub async fn resend_verification(email: &str, globals: &GlobalArgs) -> Result<()> {
    let mut store = globals.session_store()?;
    run(&mut store, SessionCommand::ResendVerification(email.to_string())).await?;
    Ok(())
}

pub fn demo_accounts(globals: &GlobalArgs) {
    if globals.json {
        let accounts: Vec<_> = demo::demo_accounts()
            .iter()
            .map(|account| {
                json!({
                    "role": account.role,
                    "email": account.email,
                    "password": account.password,
                    "description": account.description,
                })
            })
            .collect();
        if let Ok(text) = serde_json::to_string_pretty(&accounts) {
            println!("{text}");
        }
        return;
    }

    for account in demo::demo_accounts() {
        println!(
            "{:<10} {:<32} {:<10} {}",
            account.role.label(),
            account.email,
            account.password,
            account.description
        );
    }
    println!();
    println!("Use `logistica login --demo <role>` to sign in with one of them.");
}
