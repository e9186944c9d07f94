use crate::cli::{
    actions::{auth, packages, reports, users, Action},
    globals::GlobalArgs,
};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Login(args) => auth::login(args, globals).await,
        Action::Logout => auth::logout(globals).await,
        Action::Whoami => auth::whoami(globals),
        Action::VerifyEmail { token } => auth::verify_email(&token, globals).await,
        Action::ResendVerification { email } => auth::resend_verification(&email, globals).await,
        Action::DemoAccounts => {
            auth::demo_accounts(globals);
            Ok(())
        }
        Action::Track { code } => packages::track(&code, globals).await,
        Action::Packages(action) => packages::execute(action, globals).await,
        Action::Report { filter } => reports::execute(filter, globals).await,
        Action::Register(form) => users::register(&form, globals).await,
        Action::Users(action) => users::execute(action, globals).await,
    }
}
