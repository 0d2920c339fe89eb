use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::UserId;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    PendingApproval,
    Active,
    Rejected,
    Expired,
}

impl PropertyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingApproval => "Pending approval",
            Self::Active => "Active",
            Self::Rejected => "Rejected",
            Self::Expired => "Expired",
        }
    }
}

/// Free-text address as typed by the owner. These are not links into the
/// location tree even though the picker is used to fill them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAddress {
    pub country: String,
    pub state: String,
    pub city: String,
    pub society: String,
    pub building: String,
    pub flat_no: String,
}

impl PropertyAddress {
    pub fn is_complete(&self) -> bool {
        !self.society.trim().is_empty() && !self.flat_no.trim().is_empty()
    }
}

impl fmt::Display for PropertyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            self.flat_no.as_str(),
            self.building.as_str(),
            self.society.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
        ];
        let mut first = true;
        for part in parts.iter().map(|part| part.trim()).filter(|part| !part.is_empty()) {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub address: PropertyAddress,
    pub status: PropertyStatus,
    pub owner_id: UserId,
    #[serde(default)]
    pub tenant_id: Option<UserId>,
}

impl Property {
    pub fn involves(&self, user: &UserId) -> bool {
        &self.owner_id == user || self.tenant_id.as_ref() == Some(user)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProperty {
    pub address: PropertyAddress,
    #[serde(default)]
    pub tenant_id: Option<UserId>,
}

/// Equality filter applied to the `properties` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyFilter {
    All,
    /// Owned or rented by the user.
    Member(UserId),
}

impl PropertyFilter {
    pub fn matches(&self, property: &Property) -> bool {
        match self {
            Self::All => true,
            Self::Member(user) => property.involves(user),
        }
    }
}
