use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        /// Set when the backend flags the account as needing a temporary token.
        requires_token: bool,
    },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status for `Http` errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend-provided message for `Http` errors, otherwise the display text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_status() {
        let err = ApiError::Http {
            status: 401,
            message: "Credenciales inválidas".to_string(),
            requires_token: false,
        };
        assert_eq!(err.to_string(), "Request failed (401): Credenciales inválidas");
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.user_message(), "Credenciales inválidas");
    }

    #[test]
    fn non_http_errors_have_no_status() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.user_message(), "Network error: connection refused");
    }
}
