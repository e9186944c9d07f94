//! Package and user endpoints plus client-side reporting. Clients borrow the
//! shared [`ApiClient`](crate::api::ApiClient) and the current session; each
//! privileged call checks the role capability before any request is sent.

pub mod packages;
pub mod reports;
pub mod users;

use crate::{api::ApiError, session::AccessError};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogisticsError {
    /// Form validation failure, detected before any network call.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Generic `{ message }` acknowledgement returned by mutating endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Accepts numbers, numeric strings (decimal columns arrive as text), blank
/// strings and null.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

pub(crate) fn require_field(value: &str, name: &str) -> Result<(), LogisticsError> {
    if value.trim().is_empty() {
        Err(LogisticsError::Validation(format!("{name} is required.")))
    } else {
        Ok(())
    }
}
