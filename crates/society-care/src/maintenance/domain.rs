use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::property::PropertyId;
use crate::session::UserId;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaintenanceRequestId(pub String);

impl fmt::Display for MaintenanceRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Completed and cancelled requests keep their status for good.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.is_open()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Staff member attached to a request, copied from the user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedWorker {
    pub staff_id: UserId,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: MaintenanceRequestId,
    pub property_id: PropertyId,
    pub tenant_id: UserId,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub description: String,
    pub priority: Priority,
    pub status: RequestStatus,
    #[serde(default)]
    pub assigned_worker: Option<AssignedWorker>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    pub fn is_assigned_to(&self, staff_id: &UserId) -> bool {
        self.assigned_worker
            .as_ref()
            .is_some_and(|worker| &worker.staff_id == staff_id)
    }
}

/// What a tenant fills in when raising a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaintenanceRequest {
    pub property_id: PropertyId,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub description: String,
    pub priority: Priority,
}

/// A request ready to be stored; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceRequestDraft {
    pub property_id: PropertyId,
    pub tenant_id: UserId,
    pub category: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub priority: Priority,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl MaintenanceRequestDraft {
    pub fn into_request(self, id: MaintenanceRequestId) -> MaintenanceRequest {
        MaintenanceRequest {
            id,
            property_id: self.property_id,
            tenant_id: self.tenant_id,
            category: self.category,
            subcategory: self.subcategory,
            description: self.description,
            priority: self.priority,
            status: self.status,
            assigned_worker: None,
            notes: None,
            created_at: self.created_at,
        }
    }
}

/// Equality filter applied to the `maintenance_requests` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFilter {
    All,
    Tenant(UserId),
    AssignedTo(UserId),
    Property(PropertyId),
}

impl RequestFilter {
    pub fn matches(&self, request: &MaintenanceRequest) -> bool {
        match self {
            Self::All => true,
            Self::Tenant(user) => &request.tenant_id == user,
            Self::AssignedTo(staff) => request.is_assigned_to(staff),
            Self::Property(property) => &request.property_id == property,
        }
    }
}

/// Open requests per property, counted client-side from a full result set.
pub fn open_counts(requests: &[MaintenanceRequest]) -> BTreeMap<PropertyId, usize> {
    let mut counts = BTreeMap::new();
    for request in requests.iter().filter(|request| request.status.is_open()) {
        *counts.entry(request.property_id.clone()).or_insert(0) += 1;
    }
    counts
}
