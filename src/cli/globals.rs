use crate::{
    api::{ApiClient, ApiError},
    session::{FileStore, HttpAuthApi, SessionStorage, SessionStore},
};
use anyhow::Context;
use std::{path::PathBuf, time::Duration};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout: Option<Duration>,
    pub json: bool,
}

impl GlobalArgs {
    #[must_use]
    pub const fn new(api_url: String, session_file: PathBuf) -> Self {
        Self {
            api_url,
            session_file,
            timeout: None,
            json: false,
        }
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// # Errors
    /// Returns `ApiError::Config` when the backend URL is not usable.
    pub fn api_client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(&self.api_url, self.timeout)
    }

    /// Opens the session store backed by the session file.
    ///
    /// # Errors
    /// Returns an error if the backend URL is invalid or the session file
    /// cannot be read.
    pub fn session_store(&self) -> anyhow::Result<SessionStore<HttpAuthApi, FileStore>> {
        let api = HttpAuthApi::new(self.api_client()?);
        let storage = SessionStorage::new(FileStore::new(self.session_file.clone()));
        SessionStore::restore(api, storage)
            .with_context(|| format!("could not open {}", self.session_file.display()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let mut args = GlobalArgs::new(
            "http://localhost:3001".to_string(),
            PathBuf::from("/tmp/session.json"),
        );
        assert_eq!(args.timeout, None);
        args.set_timeout(Some(Duration::from_secs(5)));
        assert_eq!(args.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            args.api_client().unwrap().base_url().as_str(),
            "http://localhost:3001/"
        );
    }

    #[test]
    fn test_session_store_starts_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let args = GlobalArgs::new(
            "http://localhost:3001".to_string(),
            dir.path().join("session.json"),
        );
        let store = args.session_store().unwrap();
        assert!(!store.get().is_logged_in());
    }

    #[test]
    fn test_invalid_url() {
        let args = GlobalArgs::new("ftp://nope".to_string(), PathBuf::from("session.json"));
        assert!(args.api_client().is_err());
    }
}
