use crate::{api::ApiError, session::role::AccessError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session storage at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Login and session failures. Every variant is recoverable: the caller shows
/// the message and the user may retry or log out.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Missing or blank form fields, detected before any network call.
    #[error("{0}")]
    ClientValidation(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("Account not verified: a temporary token is required to sign in.")]
    VerificationRequired,
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),
    #[error("Server error: {}", .0.user_message())]
    Server(#[source] ApiError),
    #[error("{0}")]
    InvalidState(&'static str),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Classifies a login call failure.
    #[must_use]
    pub fn from_login(err: ApiError) -> Self {
        match err {
            ApiError::Http {
                status: 401,
                message,
                ..
            } => Self::InvalidCredentials(message),
            ApiError::Http {
                status: 403,
                requires_token: true,
                ..
            } => Self::VerificationRequired,
            other => Self::Server(other),
        }
    }

    /// Classifies a token verification failure: client errors mean the token
    /// was rejected, anything else is a server problem.
    #[must_use]
    pub fn from_token_check(err: ApiError) -> Self {
        match err {
            ApiError::Http {
                status, message, ..
            } if (400..500).contains(&status) => Self::InvalidToken(message),
            other => Self::Server(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, requires_token: bool) -> ApiError {
        ApiError::Http {
            status,
            message: "nope".to_string(),
            requires_token,
        }
    }

    #[test]
    fn login_errors_are_classified() {
        assert!(matches!(
            SessionError::from_login(http(401, false)),
            SessionError::InvalidCredentials(message) if message == "nope"
        ));
        assert!(matches!(
            SessionError::from_login(http(403, true)),
            SessionError::VerificationRequired
        ));
        assert!(matches!(
            SessionError::from_login(http(403, false)),
            SessionError::Server(_)
        ));
        assert!(matches!(
            SessionError::from_login(ApiError::Network("down".to_string())),
            SessionError::Server(_)
        ));
    }

    #[test]
    fn token_errors_are_classified() {
        assert!(matches!(
            SessionError::from_token_check(http(400, false)),
            SessionError::InvalidToken(_)
        ));
        assert!(matches!(
            SessionError::from_token_check(http(500, false)),
            SessionError::Server(_)
        ));
    }

    #[test]
    fn server_error_shows_backend_message() {
        let err = SessionError::Server(http(500, false));
        assert_eq!(err.to_string(), "Server error: nope");
    }
}
