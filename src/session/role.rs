//! Roles and capability checks. Every privileged client call asks
//! [`Role::can`] first; this is a UX guard and the backend still enforces
//! access.

use crate::session::types::Session;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Self-registered accounts arrive as `"user"`.
    #[default]
    #[serde(alias = "user")]
    Client,
    Operator,
    Messenger,
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    TrackPackages,
    ViewOwnPackages,
    ViewOwnDeliveries,
    ManageShipments,
    CreatePackages,
    UpdatePackageStatus,
    ListMessengers,
    ManageUsers,
    ViewReports,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Client, Self::Operator, Self::Messenger, Self::Admin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Operator => "operator",
            Self::Messenger => "messenger",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Operator => "Operator",
            Self::Messenger => "Messenger",
            Self::Admin => "Administrator",
        }
    }

    #[must_use]
    pub const fn can(self, capability: Capability) -> bool {
        use Capability::{
            CreatePackages, ListMessengers, ManageShipments, ManageUsers, TrackPackages,
            UpdatePackageStatus, ViewOwnDeliveries, ViewOwnPackages, ViewReports,
        };

        match capability {
            TrackPackages => true,
            ViewOwnPackages => matches!(self, Self::Client),
            ViewOwnDeliveries => matches!(self, Self::Messenger),
            ManageShipments | CreatePackages | ListMessengers | ViewReports => {
                matches!(self, Self::Operator | Self::Admin)
            }
            UpdatePackageStatus => matches!(self, Self::Operator | Self::Admin | Self::Messenger),
            ManageUsers => matches!(self, Self::Admin),
        }
    }

    /// Capabilities granted to this role, in declaration order.
    #[must_use]
    pub fn capabilities(self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.can(*capability))
            .collect()
    }
}

impl Capability {
    pub const ALL: [Self; 9] = [
        Self::TrackPackages,
        Self::ViewOwnPackages,
        Self::ViewOwnDeliveries,
        Self::ManageShipments,
        Self::CreatePackages,
        Self::UpdatePackageStatus,
        Self::ListMessengers,
        Self::ManageUsers,
        Self::ViewReports,
    ];

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::TrackPackages => "track packages",
            Self::ViewOwnPackages => "view own packages",
            Self::ViewOwnDeliveries => "view assigned deliveries",
            Self::ManageShipments => "manage shipments",
            Self::CreatePackages => "register packages",
            Self::UpdatePackageStatus => "update package status",
            Self::ListMessengers => "list messengers",
            Self::ManageUsers => "manage users",
            Self::ViewReports => "view reports",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "client" | "user" => Ok(Self::Client),
            "operator" => Ok(Self::Operator),
            "messenger" => Ok(Self::Messenger),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("You must be logged in to {0}.")]
    NotLoggedIn(Capability),
    #[error("Role {role} is not allowed to {capability}.")]
    Forbidden { role: Role, capability: Capability },
}

/// Returns the session when it exists and its role has `capability`.
///
/// # Errors
/// Returns `AccessError` when there is no session or the role lacks the capability.
pub fn authorize(session: Option<&Session>, capability: Capability) -> Result<&Session, AccessError> {
    let session = session.ok_or(AccessError::NotLoggedIn(capability))?;
    let role = session.role();
    if role.can(capability) {
        Ok(session)
    } else {
        Err(AccessError::Forbidden { role, capability })
    }
}
