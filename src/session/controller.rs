//! Session controller: the login state machine.
//!
//! ```text
//! LoggedOut --submit--> LoggedIn                         (200 token + user)
//! LoggedOut --submit--> AwaitingVerificationToken        (403 requires_token, no token given)
//! AwaitingVerificationToken --submit_token--> LoggedIn   (verify-token, then login with session_id)
//! any --logout--> LoggedOut                              (best-effort notify, always clears)
//! ```
//!
//! Failed calls (401, 5xx, transport) leave the state unchanged and record an
//! error notice. Entering `LoggedIn` persists the session; nothing else
//! writes to storage.

use crate::{
    api::ApiError,
    session::{
        client::AuthApi,
        errors::{SessionError, StorageError},
        role::{authorize, Capability},
        storage::{KeyValueStore, SessionStorage},
        types::{
            Credentials, LoginRequest, LogoutRequest, ResendVerificationRequest, SendTokenRequest,
            Session, User, VerifyTokenRequest,
        },
    },
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    /// The backend asked for a temporary token for this login attempt.
    AwaitingVerificationToken { email: String },
    LoggedIn(Session),
}

impl SessionState {
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::LoggedIn(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }

    #[must_use]
    pub const fn is_awaiting_token(&self) -> bool {
        matches!(self, Self::AwaitingVerificationToken { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// User-facing banner describing the outcome of the last operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Credentials kept between the 403 answer and the token submission.
struct PendingLogin {
    email: String,
    password: SecretString,
}

pub struct SessionController<A, K> {
    api: A,
    storage: SessionStorage<K>,
    state: SessionState,
    pending: Option<PendingLogin>,
    notice: Option<Notice>,
    issued_token: Option<String>,
}

impl<A: AuthApi, K: KeyValueStore> SessionController<A, K> {
    /// Builds the controller from durable storage. A stored session yields
    /// `LoggedIn` without any network call; an unreadable storage file is
    /// discarded and yields `LoggedOut`.
    ///
    /// # Errors
    /// Returns `SessionError::Storage` if storage cannot be read or cleaned.
    pub fn restore(api: A, mut storage: SessionStorage<K>) -> Result<Self, SessionError> {
        let state = match storage.load() {
            Ok(Some(session)) => {
                debug!(role = %session.role(), "restored stored session");
                SessionState::LoggedIn(session)
            }
            Ok(None) => SessionState::LoggedOut,
            Err(err @ StorageError::Corrupt { .. }) => {
                warn!("ignoring unreadable session storage: {err}");
                storage.clear()?;
                SessionState::LoggedOut
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            api,
            storage,
            state,
            pending: None,
            notice: None,
            issued_token: None,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Temporary token echoed by a demo backend on the last `request_token`.
    #[must_use]
    pub fn issued_token(&self) -> Option<&str> {
        self.issued_token.as_deref()
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn storage(&self) -> &SessionStorage<K> {
        &self.storage
    }

    /// The current session when its role grants `capability`.
    ///
    /// # Errors
    /// Returns `SessionError::Access` when logged out or not permitted.
    pub fn require(&self, capability: Capability) -> Result<&Session, SessionError> {
        Ok(authorize(self.session(), capability)?)
    }

    /// Submits the login form. With a temporary token the token is verified
    /// first and the login call carries the resulting session id.
    ///
    /// # Errors
    /// Returns a `SessionError`; the state is left unchanged on error.
    #[instrument(skip_all, fields(email = %credentials.email()))]
    pub async fn submit(&mut self, credentials: Credentials) -> Result<&SessionState, SessionError> {
        let outcome = self.try_submit(credentials).await;
        self.settle(outcome)
    }

    /// Submits the temporary token while awaiting verification.
    ///
    /// # Errors
    /// Returns a `SessionError`; the controller keeps awaiting on error.
    #[instrument(skip_all)]
    pub async fn submit_token(&mut self, token: &str) -> Result<&SessionState, SessionError> {
        let outcome = self.try_submit_token(token).await;
        self.settle(outcome)
    }

    /// Asks the backend to generate a temporary token for `email`. A blank
    /// email falls back to the pending login's email. Returns the token when
    /// the backend echoes it.
    ///
    /// # Errors
    /// Returns a `SessionError` on validation or network failure.
    #[instrument(skip_all)]
    pub async fn request_token(&mut self, email: &str) -> Result<Option<String>, SessionError> {
        let outcome = self.try_request_token(email).await;
        match outcome {
            Ok(token) => Ok(token),
            Err(err) => {
                self.notice = Some(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Consumes an email verification link token and logs in with the
    /// returned session.
    ///
    /// # Errors
    /// Returns a `SessionError` when the token is rejected or the call fails.
    #[instrument(skip_all)]
    pub async fn verify_email(&mut self, token: &str) -> Result<&SessionState, SessionError> {
        let outcome = self.try_verify_email(token).await;
        self.settle(outcome)
    }

    /// Requests a new verification email.
    ///
    /// # Errors
    /// Returns a `SessionError` on validation or network failure.
    #[instrument(skip_all)]
    pub async fn resend_verification(&mut self, email: &str) -> Result<(), SessionError> {
        let email = email.trim();
        let outcome = if email.is_empty() {
            Err(SessionError::ClientValidation("Email is required.".to_string()))
        } else {
            self.api
                .resend_verification(&ResendVerificationRequest { email })
                .await
                .map_err(SessionError::Server)
        };

        match outcome {
            Ok(()) => {
                self.notice = Some(Notice::success(
                    "Verification email sent. Check your inbox.",
                ));
                Ok(())
            }
            Err(err) => {
                self.notice = Some(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Abandons a pending verification and returns to `LoggedOut`.
    pub fn cancel_verification(&mut self) {
        if self.state.is_awaiting_token() {
            self.state = SessionState::LoggedOut;
            self.pending = None;
            self.issued_token = None;
            self.notice = None;
        }
    }

    /// Logs out. The backend is notified best-effort; local state and storage
    /// are cleared whatever the network outcome.
    ///
    /// # Errors
    /// Returns `SessionError::Storage` only if clearing storage fails; the
    /// state is `LoggedOut` either way.
    #[instrument(skip_all)]
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        let email = match &self.state {
            SessionState::LoggedIn(session) => session.user.email.clone(),
            _ => None,
        };

        if let Some(email) = email {
            if let Err(err) = self.api.logout(&LogoutRequest { email: &email }).await {
                warn!("logout notification failed: {err}");
            }
        }

        self.state = SessionState::LoggedOut;
        self.pending = None;
        self.issued_token = None;
        let cleared = self.storage.clear();
        self.notice = Some(Notice::success("Session closed."));
        info!("logged out");
        cleared.map_err(SessionError::from)
    }

    fn settle(
        &mut self,
        outcome: Result<(), SessionError>,
    ) -> Result<&SessionState, SessionError> {
        match outcome {
            Ok(()) => Ok(&self.state),
            Err(err) => {
                debug!("session operation failed: {err}");
                self.notice = Some(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    async fn try_submit(&mut self, credentials: Credentials) -> Result<(), SessionError> {
        if self.state.is_logged_in() {
            return Err(SessionError::InvalidState("Already logged in; log out first."));
        }
        credentials
            .validate()
            .map_err(SessionError::ClientValidation)?;

        let email = credentials.email().to_string();
        let session_id = match credentials.token() {
            Some(token) => Some(self.exchange_token(&email, token).await?),
            None => None,
        };

        let result = self
            .api
            .login(&LoginRequest {
                email: &email,
                password: credentials.password.expose_secret(),
                session_id: session_id.as_deref(),
            })
            .await;

        match result {
            Ok(response) => self.enter_logged_in(response.token, response.user, &email, session_id),
            Err(ApiError::Http {
                status: 403,
                requires_token: true,
                ..
            }) if session_id.is_none() => {
                info!("login requires a temporary token");
                self.pending = Some(PendingLogin {
                    email: email.clone(),
                    password: credentials.password,
                });
                self.issued_token = None;
                self.state = SessionState::AwaitingVerificationToken { email };
                self.notice = Some(Notice::warning(
                    "Account not verified: enter the temporary token to finish signing in.",
                ));
                Ok(())
            }
            Err(err) => Err(SessionError::from_login(err)),
        }
    }

    async fn try_submit_token(&mut self, token: &str) -> Result<(), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::ClientValidation(
                "The temporary token is required.".to_string(),
            ));
        }
        let Some(pending) = self.pending.take() else {
            return Err(SessionError::InvalidState(
                "No login is waiting for a verification token.",
            ));
        };

        let outcome = self.login_with_token(&pending, token).await;
        if outcome.is_err() {
            self.pending = Some(pending);
        }
        outcome
    }

    async fn login_with_token(
        &mut self,
        pending: &PendingLogin,
        token: &str,
    ) -> Result<(), SessionError> {
        let session_id = self.exchange_token(&pending.email, token).await?;

        let response = self
            .api
            .login(&LoginRequest {
                email: &pending.email,
                password: pending.password.expose_secret(),
                session_id: Some(&session_id),
            })
            .await
            .map_err(SessionError::from_login)?;

        self.enter_logged_in(response.token, response.user, &pending.email, Some(session_id))
    }

    async fn exchange_token(&self, email: &str, token: &str) -> Result<String, SessionError> {
        let response = self
            .api
            .verify_token(&VerifyTokenRequest { email, token })
            .await
            .map_err(SessionError::from_token_check)?;
        debug!("temporary token accepted");
        Ok(response.session_id.to_string())
    }

    async fn try_request_token(&mut self, email: &str) -> Result<Option<String>, SessionError> {
        if self.state.is_logged_in() {
            return Err(SessionError::InvalidState("Already logged in; log out first."));
        }
        let email = match (email.trim(), &self.pending) {
            ("", Some(pending)) => pending.email.clone(),
            ("", None) => {
                return Err(SessionError::ClientValidation(
                    "Enter your email to generate a token.".to_string(),
                ))
            }
            (email, _) => email.to_string(),
        };

        let response = self
            .api
            .send_token(&SendTokenRequest { email: &email })
            .await
            .map_err(SessionError::Server)?;

        self.issued_token.clone_from(&response.token);
        let text = match &response.token {
            Some(token) => format!("Temporary token for {email}: {token}"),
            None => response.message.unwrap_or_else(|| {
                format!("A temporary token was generated for {email}. Check the server console.")
            }),
        };
        self.notice = Some(Notice::success(text));
        Ok(response.token)
    }

    async fn try_verify_email(&mut self, token: &str) -> Result<(), SessionError> {
        if self.state.is_logged_in() {
            return Err(SessionError::InvalidState("Already logged in; log out first."));
        }
        let token = token.trim();
        if matches!(token, "" | "." | "..") {
            return Err(SessionError::ClientValidation(
                "Verification token is not valid.".to_string(),
            ));
        }

        let response = self
            .api
            .verify_email(token)
            .await
            .map_err(SessionError::from_token_check)?;

        match (response.success, response.token, response.user) {
            (true, Some(auth_token), Some(user)) => {
                let email = user.email.clone().unwrap_or_default();
                self.enter_logged_in(auth_token, user, &email, None)
            }
            (_, _, _) => Err(SessionError::InvalidToken(
                response
                    .error
                    .or(response.message)
                    .unwrap_or_else(|| "Email verification failed.".to_string()),
            )),
        }
    }

    fn enter_logged_in(
        &mut self,
        auth_token: String,
        mut user: User,
        email: &str,
        session_id: Option<String>,
    ) -> Result<(), SessionError> {
        if auth_token.trim().is_empty() {
            return Err(SessionError::Server(ApiError::Parse(
                "Login response did not include a token.".to_string(),
            )));
        }
        if user.email.is_none() && !email.is_empty() {
            user.email = Some(email.to_string());
        }

        let session = Session {
            auth_token,
            user,
            session_id,
        };
        self.storage.save(&session)?;

        info!(role = %session.role(), "logged in");
        self.notice = Some(Notice::success(format!(
            "Welcome {}!",
            session.user.first_name.trim()
        )));
        self.pending = None;
        self.issued_token = None;
        self.state = SessionState::LoggedIn(session);
        Ok(())
    }
}
