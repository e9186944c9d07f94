use crate::{
    cli::{actions::output, globals::GlobalArgs},
    logistics::users::{UserForm, UsersClient},
    session::{RecordId, Role, User},
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use tracing::instrument;

#[derive(Debug)]
pub enum UserAction {
    List { role: Option<Role> },
    Create(UserForm),
    Update { id: RecordId, changes: UserChanges },
    Delete { id: RecordId },
}

/// Fields given on `users update`; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub last_name: Option<String>,
    pub second_last_name: Option<String>,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub password: Option<SecretString>,
}

impl UserChanges {
    fn apply(self, user: &User) -> UserForm {
        let current = UserForm::from(user);
        UserForm {
            first_name: self.first_name.unwrap_or(current.first_name),
            second_name: self.second_name.or(current.second_name),
            last_name: self.last_name.unwrap_or(current.last_name),
            second_last_name: self.second_last_name.or(current.second_last_name),
            document_number: self.document_number.unwrap_or(current.document_number),
            email: self.email.unwrap_or(current.email),
            address: self.address.or(current.address),
            phone: self.phone.or(current.phone),
            role: self.role.unwrap_or(current.role),
            password: self.password,
        }
    }
}

/// Public sign-up, no session needed.
///
/// # Errors
/// Returns an error if validation or the request fails.
#[instrument(skip_all)]
pub async fn register(form: &UserForm, globals: &GlobalArgs) -> Result<()> {
    let api = globals.api_client()?;
    let ack = UsersClient::new(&api, None).register(form).await?;
    output::ack(
        &ack,
        "Account created. Check your email to verify it before logging in.",
    );
    Ok(())
}

fn find(users: Vec<User>, id: &RecordId) -> Result<User> {
    users
        .into_iter()
        .find(|user| user.id.as_ref() == Some(id))
        .ok_or_else(|| anyhow!("user {id} not found"))
}

/// # Errors
/// Returns an error if the role is not allowed or the request fails.
#[instrument(skip_all)]
pub async fn execute(action: UserAction, globals: &GlobalArgs) -> Result<()> {
    let store = globals.session_store()?;
    let state = store.get();
    let api = globals.api_client()?;
    let client = UsersClient::new(&api, state.session());

    match action {
        UserAction::List { role } => {
            let users = match role {
                Some(role) => client.list_by_role(role).await?,
                None => client.list().await?,
            };
            output::users(globals, &users)
        }
        UserAction::Create(form) => {
            let ack = client.create(&form).await?;
            output::ack(&ack, &format!("User {} created.", form.email.trim()));
            Ok(())
        }
        UserAction::Update { id, changes } => {
            let user = find(client.list().await?, &id)?;
            let form = changes.apply(&user);
            let ack = client.update(&id, &form).await?;
            output::ack(&ack, &format!("User {id} updated."));
            Ok(())
        }
        UserAction::Delete { id } => {
            let user = find(client.list().await?, &id)?;
            client.delete(&user).await?;
            println!("User {} deleted.", user.display_name());
            Ok(())
        }
    }
}
