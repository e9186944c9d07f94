//! Package tracking and shipment management endpoints.

use crate::{
    api::{encode_path, ApiClient, ApiError},
    logistics::{lenient_f64, require_field, Ack, LogisticsError},
    session::{authorize, Capability, RecordId, Session},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{debug, instrument};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    Registered,
    Approved,
    Rejected,
    InTransit,
    OutForDelivery,
    Delivered,
    Cancelled,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl PackageStatus {
    /// Statuses a user can set through `update_status`.
    pub const SETTABLE: [Self; 7] = [
        Self::Registered,
        Self::Approved,
        Self::Rejected,
        Self::InTransit,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::InTransit => "in_transit",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Registered => "Registered",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::InTransit => "In transit",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PackageStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        Self::SETTABLE
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown package status: {value}"))
    }
}

/// Dashboard buckets used to filter package lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    Pending,
    InProgress,
    Delivered,
    #[default]
    All,
}

impl StatusFilter {
    #[must_use]
    pub const fn matches(self, status: PackageStatus) -> bool {
        match self {
            Self::Pending => matches!(
                status,
                PackageStatus::Registered | PackageStatus::Approved | PackageStatus::Rejected
            ),
            Self::InProgress => {
                matches!(status, PackageStatus::InTransit | PackageStatus::OutForDelivery)
            }
            Self::Delivered => matches!(status, PackageStatus::Delivered),
            Self::All => true,
        }
    }

    #[must_use]
    pub fn apply(self, packages: &[Package]) -> Vec<&Package> {
        packages
            .iter()
            .filter(|package| self.matches(package.status))
            .collect()
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "delivered" => Ok(Self::Delivered),
            "all" => Ok(Self::All),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: RecordId,
    #[serde(default)]
    pub tracking_code: Option<String>,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub recipient_phone: Option<String>,
    pub status: PackageStatus,
    #[serde(default)]
    pub messenger_id: Option<RecordId>,
    #[serde(default)]
    pub messenger_name: Option<String>,
    #[serde(default)]
    pub client_id: Option<RecordId>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// New package form.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewPackage {
    pub sender_name: String,
    pub recipient_name: String,
    pub delivery_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,
}

impl NewPackage {
    /// # Errors
    /// Returns `LogisticsError::Validation` naming the first missing field.
    pub fn validate(&self) -> Result<(), LogisticsError> {
        require_field(&self.sender_name, "Sender name")?;
        require_field(&self.recipient_name, "Recipient name")?;
        require_field(&self.delivery_address, "Delivery address")?;
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(LogisticsError::Validation(
                    "Weight must be a positive number.".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Partial update for `PUT /api/packages/:id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PackageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,
}

impl PackageUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sender_name.is_none()
            && self.recipient_name.is_none()
            && self.delivery_address.is_none()
            && self.weight.is_none()
            && self.recipient_phone.is_none()
    }
}

#[derive(Serialize)]
struct RegisterPackageRequest<'a> {
    #[serde(flatten)]
    package: &'a NewPackage,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<&'a RecordId>,
}

#[derive(Serialize)]
struct StatusRequest {
    status: PackageStatus,
}

#[derive(Serialize)]
struct AssignMessengerRequest<'a> {
    messenger_id: &'a RecordId,
}

/// Result of registering a package. Backends answer either with the package
/// or with a message plus the tracking code.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegisteredPackage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tracking_code: Option<String>,
    #[serde(default)]
    pub package: Option<Package>,
}

/// `/api/packages/{id}`, optionally followed by an action segment.
fn package_path(id: &RecordId, action: Option<&str>) -> Result<String, ApiError> {
    let id = id.to_string();
    match action {
        Some(action) => encode_path(&["api", "packages", id.as_str(), action]),
        None => encode_path(&["api", "packages", id.as_str()]),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PackagesClient<'a> {
    api: &'a ApiClient,
    session: Option<&'a Session>,
}

impl<'a> PackagesClient<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: Option<&'a Session>) -> Self {
        Self { api, session }
    }

    fn bearer(&self, capability: Capability) -> Result<&'a str, LogisticsError> {
        Ok(authorize(self.session, capability)?.auth_token.as_str())
    }

    /// Looks up a package by tracking code. Works without a session; the
    /// bearer is attached when logged in.
    ///
    /// # Errors
    /// Returns `LogisticsError` for a blank code or a failed request.
    #[instrument(skip(self))]
    pub async fn track(&self, code: &str) -> Result<Package, LogisticsError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(LogisticsError::Validation(
                "Enter a tracking code.".to_string(),
            ));
        }
        let bearer = self.session.map(|session| session.auth_token.as_str());
        let package: Package = self
            .api
            .get_json(&encode_path(&["api", "packages", "tracking", code])?, bearer)
            .await?;
        debug!(status = %package.status, "package found");
        Ok(package)
    }

    /// All packages (operators and admins).
    ///
    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Package>, LogisticsError> {
        let bearer = self.bearer(Capability::ManageShipments)?;
        Ok(self.api.get_json("/api/packages", Some(bearer)).await?)
    }

    /// Deliveries assigned to the logged-in messenger.
    ///
    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn my_deliveries(&self) -> Result<Vec<Package>, LogisticsError> {
        let bearer = self.bearer(Capability::ViewOwnDeliveries)?;
        Ok(self
            .api
            .get_json("/api/packages/messenger/my-deliveries", Some(bearer))
            .await?)
    }

    /// Packages owned by the logged-in client.
    ///
    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn my_packages(&self) -> Result<Vec<Package>, LogisticsError> {
        let bearer = self.bearer(Capability::ViewOwnPackages)?;
        Ok(self
            .api
            .get_json("/api/packages/client/my-packages", Some(bearer))
            .await?)
    }

    /// Registers a package on behalf of the current user.
    ///
    /// # Errors
    /// Returns `LogisticsError` on validation, permission or request failure.
    #[instrument(skip(self, package))]
    pub async fn create(&self, package: &NewPackage) -> Result<RegisteredPackage, LogisticsError> {
        let session = authorize(self.session, Capability::CreatePackages)?;
        package.validate()?;

        let request = RegisterPackageRequest {
            package,
            client_id: session.user.id.as_ref(),
        };
        Ok(self
            .api
            .post_json("/api/packages/register", &request, Some(session.auth_token.as_str()))
            .await?)
    }

    /// # Errors
    /// Returns `LogisticsError` if not permitted, the status is not settable,
    /// or the request fails.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &RecordId,
        status: PackageStatus,
    ) -> Result<Ack, LogisticsError> {
        let bearer = self.bearer(Capability::UpdatePackageStatus)?;
        if status == PackageStatus::Unknown {
            return Err(LogisticsError::Validation(
                "Choose a valid package status.".to_string(),
            ));
        }
        Ok(self
            .api
            .put_json(
                &package_path(id, Some("status"))?,
                &StatusRequest { status },
                Some(bearer),
            )
            .await?)
    }

    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn assign_messenger(
        &self,
        id: &RecordId,
        messenger_id: &RecordId,
    ) -> Result<Ack, LogisticsError> {
        let bearer = self.bearer(Capability::ManageShipments)?;
        Ok(self
            .api
            .put_json(
                &package_path(id, Some("assign-messenger"))?,
                &AssignMessengerRequest { messenger_id },
                Some(bearer),
            )
            .await?)
    }

    /// Lets the backend pick a messenger.
    ///
    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn assign_automatic(&self, id: &RecordId) -> Result<Ack, LogisticsError> {
        let bearer = self.bearer(Capability::ManageShipments)?;
        Ok(self
            .api
            .put_empty(&package_path(id, Some("assign-automatic"))?, Some(bearer))
            .await?)
    }

    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn approve(&self, id: &RecordId) -> Result<Ack, LogisticsError> {
        let bearer = self.bearer(Capability::ManageShipments)?;
        Ok(self
            .api
            .put_empty(&package_path(id, Some("approve"))?, Some(bearer))
            .await?)
    }

    /// # Errors
    /// Returns `LogisticsError` if not permitted or the request fails.
    #[instrument(skip(self))]
    pub async fn reject(&self, id: &RecordId) -> Result<Ack, LogisticsError> {
        let bearer = self.bearer(Capability::ManageShipments)?;
        Ok(self
            .api
            .put_empty(&package_path(id, Some("reject"))?, Some(bearer))
            .await?)
    }

    /// Edits package details.
    ///
    /// # Errors
    /// Returns `LogisticsError` for an empty update, missing permission or a
    /// failed request.
    #[instrument(skip(self, update))]
    pub async fn edit(&self, id: &RecordId, update: &PackageUpdate) -> Result<Ack, LogisticsError> {
        let bearer = self.bearer(Capability::ManageShipments)?;
        if update.is_empty() {
            return Err(LogisticsError::Validation("Nothing to update.".to_string()));
        }
        Ok(self
            .api
            .put_json(&package_path(id, None)?, update, Some(bearer))
            .await?)
    }

    /// Address of the printable QR label for a package.
    ///
    /// # Errors
    /// Returns `LogisticsError` if not permitted.
    pub fn qr_url(&self, id: &RecordId) -> Result<String, LogisticsError> {
        self.bearer(Capability::ManageShipments)?;
        let path = package_path(id, Some("qr"))?;
        Ok(self.api.url(&path))
    }
}
