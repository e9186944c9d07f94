//! User administration. Public self-registration creates clients; everything
//! else needs [`Capability::ManageUsers`] except listing messengers.

use crate::{
    api::{encode_path, ApiClient, ApiError},
    logistics::{require_field, Ack, LogisticsError},
    session::{authorize, Capability, RecordId, Role, Session, User},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};
use tracing::{debug, instrument};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Create/edit form for a user account.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UserForm {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_name: Option<String>,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_last_name: Option<String>,
    pub document_number: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    /// Required on create. On update it is sent only when non-blank.
    #[serde(
        serialize_with = "expose_password",
        skip_serializing_if = "is_blank_password"
    )]
    pub password: Option<SecretString>,
}

fn expose_password<S: Serializer>(
    password: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match password {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn is_blank_password(password: &Option<SecretString>) -> bool {
    !password
        .as_ref()
        .is_some_and(|secret| !secret.expose_secret().trim().is_empty())
}

impl From<&User> for UserForm {
    /// Edit form pre-filled from an existing account, password left blank.
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            second_name: None,
            last_name: user.last_name.clone(),
            second_last_name: None,
            document_number: user.document_number.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            address: user.address.clone(),
            phone: user.phone.clone(),
            role: user.role,
            password: None,
        }
    }
}

impl UserForm {
    fn validate_common(&self) -> Result<(), LogisticsError> {
        require_field(&self.first_name, "First name")?;
        require_field(&self.last_name, "Last name")?;
        require_field(&self.document_number, "Document number")?;
        require_field(&self.email, "Email")?;
        if !self.email.contains('@') {
            return Err(LogisticsError::Validation(
                "Email is not valid.".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_password(&self) -> Result<(), LogisticsError> {
        match &self.password {
            Some(secret) if !secret.expose_secret().trim().is_empty() => {
                if secret.expose_secret().chars().count() < MIN_PASSWORD_LEN {
                    Err(LogisticsError::Validation(format!(
                        "Password must be at least {MIN_PASSWORD_LEN} characters."
                    )))
                } else {
                    Ok(())
                }
            }
            _ => Err(LogisticsError::Validation(
                "Password is required.".to_string(),
            )),
        }
    }

    /// Validation for new accounts: password is mandatory.
    ///
    /// # Errors
    /// Returns `LogisticsError::Validation` describing the first problem.
    pub fn validate_create(&self) -> Result<(), LogisticsError> {
        self.validate_common()?;
        self.validate_password()
    }

    /// Validation for edits: a blank password keeps the current one.
    ///
    /// # Errors
    /// Returns `LogisticsError::Validation` describing the first problem.
    pub fn validate_update(&self) -> Result<(), LogisticsError> {
        self.validate_common()?;
        if is_blank_password(&self.password) {
            Ok(())
        } else {
            self.validate_password()
        }
    }
}

fn user_path(id: &RecordId) -> Result<String, ApiError> {
    let id = id.to_string();
    encode_path(&["api", "users", id.as_str()])
}

#[derive(Clone, Copy, Debug)]
pub struct UsersClient<'a> {
    api: &'a ApiClient,
    session: Option<&'a Session>,
}

impl<'a> UsersClient<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: Option<&'a Session>) -> Self {
        Self { api, session }
    }

    fn bearer(&self, capability: Capability) -> Result<&'a str, LogisticsError> {
        Ok(authorize(self.session, capability)?.auth_token.as_str())
    }

    /// Public sign-up. The account is always created as a client and must
    /// verify its email before it can log in.
    ///
    /// # Errors
    /// Returns `LogisticsError` on validation or request failure.
    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn register(&self, form: &UserForm) -> Result<Ack, LogisticsError> {
        let form = UserForm {
            role: Role::Client,
            ..form.clone()
        };
        form.validate_create()?;
        Ok(self
            .api
            .post_json("/api/users/register", &form, None)
            .await?)
    }

    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, LogisticsError> {
        let bearer = self.bearer(Capability::ManageUsers)?;
        let users: Vec<User> = self.api.get_json("/api/users", Some(bearer)).await?;
        debug!(count = users.len(), "users listed");
        Ok(users)
    }

    /// Users with the given role. Messenger lookups are open to shipment
    /// managers; other roles need user management.
    ///
    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, LogisticsError> {
        let capability = if role == Role::Messenger {
            Capability::ListMessengers
        } else {
            Capability::ManageUsers
        };
        let bearer = self.bearer(capability)?;
        Ok(self
            .api
            .get_json(
                &encode_path(&["api", "users", "role", role.as_str()])?,
                Some(bearer),
            )
            .await?)
    }

    /// # Errors
    /// Returns `LogisticsError` on validation, permission or request failure.
    #[instrument(skip(self, form), fields(role = %form.role))]
    pub async fn create(&self, form: &UserForm) -> Result<Ack, LogisticsError> {
        let bearer = self.bearer(Capability::ManageUsers)?;
        form.validate_create()?;
        Ok(self
            .api
            .post_json("/api/users/register", form, Some(bearer))
            .await?)
    }

    /// # Errors
    /// Returns `LogisticsError` on validation, permission or request failure.
    #[instrument(skip(self, form))]
    pub async fn update(&self, id: &RecordId, form: &UserForm) -> Result<Ack, LogisticsError> {
        let bearer = self.bearer(Capability::ManageUsers)?;
        form.validate_update()?;
        Ok(self
            .api
            .put_json(&user_path(id)?, form, Some(bearer))
            .await?)
    }

    /// Deletes a user. Admin accounts cannot be deleted.
    ///
    /// # Errors
    /// Returns `LogisticsError` when the target is an admin, when not
    /// permitted, or when the request fails.
    #[instrument(skip(self, user), fields(id = ?user.id))]
    pub async fn delete(&self, user: &User) -> Result<(), LogisticsError> {
        let bearer = self.bearer(Capability::ManageUsers)?;
        if user.role == Role::Admin {
            return Err(LogisticsError::Validation(
                "Admin accounts cannot be deleted.".to_string(),
            ));
        }
        let id = user.id.as_ref().ok_or_else(|| {
            LogisticsError::Validation("User has no id.".to_string())
        })?;
        self.api
            .delete(&user_path(id)?, Some(bearer))
            .await?;
        Ok(())
    }
}
