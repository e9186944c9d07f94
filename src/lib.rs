//! # Logistica (Logistics console)
//!
//! `logistica` is the client side of a logistics platform: package tracking,
//! shipment management and user administration against a REST backend.
//!
//! ## Session
//!
//! Authentication runs through a small state machine
//! ([`session::SessionController`]) with three states: logged out, awaiting a
//! temporary verification token, and logged in. The session (`token` and
//! `user`) is kept in durable storage so a restart resumes it without a
//! network call. Logout always clears the stored session, even when the
//! backend cannot be reached.
//!
//! ## Authorization
//!
//! Roles (`client`, `operator`, `messenger`, `admin`) are a closed enumeration
//! and every privileged call checks a [`session::Capability`] before it leaves
//! the client. This is a UX guard only; the backend remains the authority.
//!
//! ## Logistics
//!
//! [`logistics`] holds typed bindings for the package and user endpoints plus
//! client-side shipment reports.

pub mod api;
pub mod cli;
pub mod logistics;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
