//! Application-owned session store. Wraps the controller and publishes every
//! state change on a `watch` channel so views can subscribe instead of
//! reading shared mutable state.

use crate::session::{
    client::AuthApi,
    controller::{Notice, SessionController, SessionState},
    errors::SessionError,
    storage::{KeyValueStore, SessionStorage},
    types::Credentials,
};
use tokio::sync::watch;

#[derive(Debug)]
pub enum SessionCommand {
    Submit(Credentials),
    SubmitToken(String),
    RequestToken(String),
    VerifyEmail(String),
    ResendVerification(String),
    CancelVerification,
    Logout,
}

pub struct SessionStore<A, K> {
    controller: SessionController<A, K>,
    sender: watch::Sender<SessionState>,
}

impl<A: AuthApi, K: KeyValueStore> SessionStore<A, K> {
    /// Initializes the store from durable storage.
    ///
    /// # Errors
    /// Returns `SessionError::Storage` if storage cannot be read.
    pub fn restore(api: A, storage: SessionStorage<K>) -> Result<Self, SessionError> {
        let controller = SessionController::restore(api, storage)?;
        let (sender, _receiver) = watch::channel(controller.state().clone());
        Ok(Self { controller, sender })
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn get(&self) -> SessionState {
        self.sender.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.sender.subscribe()
    }

    #[must_use]
    pub const fn controller(&self) -> &SessionController<A, K> {
        &self.controller
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.controller.notice()
    }

    /// Runs one command. `&mut self` keeps a single command in flight.
    /// Subscribers are notified only when the state actually changes.
    ///
    /// # Errors
    /// Returns the command's `SessionError`; the published state still
    /// reflects whatever the controller settled on.
    pub async fn dispatch(&mut self, command: SessionCommand) -> Result<SessionState, SessionError> {
        let result = match command {
            SessionCommand::Submit(credentials) => {
                self.controller.submit(credentials).await.map(|_| ())
            }
            SessionCommand::SubmitToken(token) => {
                self.controller.submit_token(&token).await.map(|_| ())
            }
            SessionCommand::RequestToken(email) => {
                self.controller.request_token(&email).await.map(|_| ())
            }
            SessionCommand::VerifyEmail(token) => {
                self.controller.verify_email(&token).await.map(|_| ())
            }
            SessionCommand::ResendVerification(email) => {
                self.controller.resend_verification(&email).await
            }
            SessionCommand::CancelVerification => {
                self.controller.cancel_verification();
                Ok(())
            }
            SessionCommand::Logout => self.controller.logout().await,
        };

        self.publish();
        result.map(|()| self.get())
    }

    fn publish(&self) {
        let state = self.controller.state();
        self.sender.send_if_modified(|current| {
            if current == state {
                false
            } else {
                current.clone_from(state);
                true
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{controller::tests::StubAuth, role::Role, storage::MemoryStore};

    fn store(stub: StubAuth) -> SessionStore<StubAuth, MemoryStore> {
        SessionStore::restore(stub, SessionStorage::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn subscribers_see_login_and_logout() {
        let mut store = store(StubAuth::default().login_ok("abc", "Juan", Role::Client));
        let mut receiver = store.subscribe();
        assert_eq!(*receiver.borrow_and_update(), SessionState::LoggedOut);

        let state = store
            .dispatch(SessionCommand::Submit(Credentials::new(
                "juan@example.com",
                "password",
            )))
            .await
            .unwrap();
        assert!(state.is_logged_in());
        assert!(receiver.has_changed().unwrap());
        assert!(receiver.borrow_and_update().is_logged_in());

        store.dispatch(SessionCommand::Logout).await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), SessionState::LoggedOut);
        assert_eq!(store.get(), SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn failed_command_does_not_notify() {
        let mut store = store(StubAuth::default().login_err(401, false));
        let mut receiver = store.subscribe();
        receiver.borrow_and_update();

        let result = store
            .dispatch(SessionCommand::Submit(Credentials::new(
                "juan@example.com",
                "wrong",
            )))
            .await;
        assert!(matches!(result, Err(SessionError::InvalidCredentials(_))));
        assert!(!receiver.has_changed().unwrap());
        assert!(store.notice().is_some());
    }

    #[tokio::test]
    async fn cancel_verification_publishes_logged_out() {
        let mut store = store(StubAuth::default().login_err(403, true));
        store
            .dispatch(SessionCommand::Submit(Credentials::new(
                "juan@example.com",
                "password",
            )))
            .await
            .unwrap();
        assert!(store.get().is_awaiting_token());

        let state = store
            .dispatch(SessionCommand::CancelVerification)
            .await
            .unwrap();
        assert_eq!(state, SessionState::LoggedOut);
    }
}
