use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::property::domain::{
    NewProperty, Property, PropertyAddress, PropertyFilter, PropertyId, PropertyStatus,
};
use crate::property::repository::PropertyRepository;
use crate::session::{AuthSession, UserId, UserRole};

pub(super) fn owner() -> AuthSession {
    AuthSession::new("owner-1", UserRole::Tenant)
}

pub(super) fn manager() -> AuthSession {
    AuthSession::new("manager-1", UserRole::Manager)
}

pub(super) fn address(flat_no: &str) -> PropertyAddress {
    PropertyAddress {
        country: "India".to_string(),
        state: "Maharashtra".to_string(),
        city: "Pune".to_string(),
        society: "Green Acres".to_string(),
        building: "Block A".to_string(),
        flat_no: flat_no.to_string(),
    }
}

#[derive(Default)]
pub(super) struct MemoryProperties {
    records: Mutex<Vec<Property>>,
    sequence: AtomicU64,
    offline: AtomicBool,
}

impl MemoryProperties {
    pub(super) fn seeded() -> Arc<Self> {
        let repository = Self::default();
        repository
            .records
            .lock()
            .expect("property mutex poisoned")
            .extend([
                Property {
                    id: PropertyId("prop-a".to_string()),
                    address: address("A-101"),
                    status: PropertyStatus::Active,
                    owner_id: UserId("owner-1".to_string()),
                    tenant_id: None,
                },
                Property {
                    id: PropertyId("prop-b".to_string()),
                    address: address("B-202"),
                    status: PropertyStatus::PendingApproval,
                    owner_id: UserId("owner-2".to_string()),
                    tenant_id: Some(UserId("owner-1".to_string())),
                },
                Property {
                    id: PropertyId("prop-c".to_string()),
                    address: address("C-303"),
                    status: PropertyStatus::Active,
                    owner_id: UserId("owner-3".to_string()),
                    tenant_id: None,
                },
            ]);
        Arc::new(repository)
    }

    pub(super) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(super) fn stored(&self, id: &str) -> Option<Property> {
        let guard = self.records.lock().expect("property mutex poisoned");
        guard.iter().find(|property| property.id.0 == id).cloned()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable("firestore offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn authorize(session: &AuthSession, property: &Property) -> Result<(), RepositoryError> {
        if session.is_manager() || property.owner_id == session.user_id {
            Ok(())
        } else {
            Err(RepositoryError::Forbidden(format!(
                "{} does not own {}",
                session.user_id, property.id
            )))
        }
    }
}

#[async_trait]
impl PropertyRepository for MemoryProperties {
    async fn list(
        &self,
        _session: &AuthSession,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, RepositoryError> {
        self.check()?;
        let guard = self.records.lock().expect("property mutex poisoned");
        Ok(guard.iter().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn get(
        &self,
        _session: &AuthSession,
        id: &PropertyId,
    ) -> Result<Option<Property>, RepositoryError> {
        self.check()?;
        let guard = self.records.lock().expect("property mutex poisoned");
        Ok(guard.iter().find(|p| &p.id == id).cloned())
    }

    async fn insert(
        &self,
        session: &AuthSession,
        property: NewProperty,
    ) -> Result<Property, RepositoryError> {
        self.check()?;
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = Property {
            id: PropertyId(format!("prop-{id}")),
            address: property.address,
            status: PropertyStatus::PendingApproval,
            owner_id: session.user_id.clone(),
            tenant_id: property.tenant_id,
        };
        self.records
            .lock()
            .expect("property mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, session: &AuthSession, property: Property) -> Result<(), RepositoryError> {
        self.check()?;
        let mut guard = self.records.lock().expect("property mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|p| p.id == property.id)
            .ok_or(RepositoryError::NotFound)?;
        Self::authorize(session, slot)?;
        *slot = property;
        Ok(())
    }

    async fn delete(&self, session: &AuthSession, id: &PropertyId) -> Result<(), RepositoryError> {
        self.check()?;
        let mut guard = self.records.lock().expect("property mutex poisoned");
        let index = guard
            .iter()
            .position(|p| &p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Self::authorize(session, &guard[index])?;
        guard.remove(index);
        Ok(())
    }
}
