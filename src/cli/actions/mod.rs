pub mod auth;
pub mod packages;
pub mod reports;
pub mod users;

mod output;
// Internal "interpreter" for `Action`.
mod run;

use crate::{
    cli::globals::GlobalArgs,
    logistics::{packages::StatusFilter, users::UserForm},
};

#[derive(Debug)]
pub enum Action {
    Login(auth::LoginArgs),
    Logout,
    Whoami,
    VerifyEmail { token: String },
    ResendVerification { email: String },
    DemoAccounts,
    Track { code: String },
    Packages(packages::PackageAction),
    Report { filter: StatusFilter },
    Register(UserForm),
    Users(users::UserAction),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
