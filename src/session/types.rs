//! Request, response and session types for the auth endpoints. Login payloads
//! carry passwords and temporary tokens, so they are only ever borrowed for
//! serialization and never derive `Debug`.

use crate::session::role::Role;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier as sent by the backend, which uses both numeric and string ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(formatter, "{id}"),
            Self::Text(id) => formatter.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        id.trim()
            .parse::<i64>()
            .map_or_else(|_| Self::Text(id.trim().to_string()), Self::Number)
    }
}

/// User record as returned by login, email verification and the users API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl User {
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone().unwrap_or_else(|| "unknown user".to_string())
        } else {
            full.to_string()
        }
    }
}

/// An authenticated session. Persisted on login and removed on logout.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub auth_token: String,
    pub user: User,
    /// Server id of the verified temporary-token exchange, if one happened.
    pub session_id: Option<String>,
}

impl Session {
    #[must_use]
    pub const fn role(&self) -> Role {
        self.user.role
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("auth_token", &"***")
            .field("user", &self.user)
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// Login form state. Transient: never persisted.
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
    pub temporary_token: Option<String>,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            temporary_token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.temporary_token = Some(token.into());
        self
    }

    /// Trimmed email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.trim()
    }

    /// Temporary token, ignoring blank input.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.temporary_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Checks required fields before any network call.
    ///
    /// # Errors
    /// Returns a user-facing message naming the missing field.
    pub fn validate(&self) -> Result<(), String> {
        if self.email().is_empty() {
            return Err("Email is required.".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("Password is required.".to_string());
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("temporary_token", &self.temporary_token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct VerifyTokenRequest<'a> {
    pub email: &'a str,
    pub token: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VerifyTokenResponse {
    pub session_id: RecordId,
}

#[derive(Clone, Debug, Serialize)]
pub struct SendTokenRequest<'a> {
    pub email: &'a str,
}

/// `send-token` answer. Demo backends echo the generated token.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SendTokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LogoutRequest<'a> {
    pub email: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResendVerificationRequest<'a> {
    pub email: &'a str,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerifyEmailResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
