//! Client-side shipment report built from a package listing.

use crate::logistics::packages::{Package, PackageStatus, StatusFilter};
use serde::Serialize;
use std::collections::BTreeMap;

/// Label used for packages with no messenger assigned.
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ShipmentReport {
    pub total: usize,
    pub by_status: BTreeMap<PackageStatus, usize>,
    pub pending: usize,
    pub in_progress: usize,
    pub delivered: usize,
    pub unassigned: usize,
    pub by_messenger: BTreeMap<String, usize>,
}

impl ShipmentReport {
    #[must_use]
    pub fn from_packages(packages: &[Package]) -> Self {
        let mut report = Self {
            total: packages.len(),
            ..Self::default()
        };

        for package in packages {
            *report.by_status.entry(package.status).or_default() += 1;

            if StatusFilter::Pending.matches(package.status) {
                report.pending += 1;
            } else if StatusFilter::InProgress.matches(package.status) {
                report.in_progress += 1;
            } else if StatusFilter::Delivered.matches(package.status) {
                report.delivered += 1;
            }

            let messenger = package
                .messenger_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .or_else(|| package.messenger_id.as_ref().map(|id| format!("#{id}")));
            match messenger {
                Some(name) => *report.by_messenger.entry(name).or_default() += 1,
                None => report.unassigned += 1,
            }
        }

        report
    }

    /// Delivered packages over all packages, as a percentage. Zero for an
    /// empty listing.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn delivery_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.delivered as f64 * 100.0 / self.total as f64
        }
    }

    #[must_use]
    pub fn count(&self, status: PackageStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
