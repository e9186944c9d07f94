//! Client authentication: session state machine, durable storage, auth
//! endpoint bindings and role capabilities. This module touches security
//! boundaries and must avoid logging passwords or token material.
//!
//! Flow overview: a login either succeeds directly or, for accounts that are
//! not verified, the backend answers 403 with `requires_token`. The user then
//! submits a temporary token (optionally generated via `send-token`), which is
//! exchanged for a session id and replayed on a second login call.

pub mod client;
pub mod controller;
pub mod demo;
mod errors;
pub mod role;
pub mod storage;
pub mod store;
pub mod types;

pub use client::{AuthApi, HttpAuthApi};
pub use controller::{Notice, NoticeKind, SessionController, SessionState};
pub use errors::{SessionError, StorageError};
pub use role::{authorize, AccessError, Capability, Role};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SessionStorage};
pub use store::{SessionCommand, SessionStore};
pub use types::{Credentials, RecordId, Session, User};
