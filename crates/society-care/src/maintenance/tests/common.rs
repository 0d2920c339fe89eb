use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use crate::error::RepositoryError;
use crate::maintenance::domain::{
    AssignedWorker, MaintenanceRequest, MaintenanceRequestDraft, MaintenanceRequestId, Priority,
    RequestFilter, RequestStatus,
};
use crate::maintenance::repository::MaintenanceRepository;
use crate::property::PropertyId;
use crate::session::{AuthSession, UserId, UserRole};
use crate::users::{UserProfile, UserRepository};

pub(super) fn tenant() -> AuthSession {
    AuthSession::new("tenant-1", UserRole::Tenant)
}

pub(super) fn plumber() -> AuthSession {
    AuthSession::new("staff-1", UserRole::Staff)
}

pub(super) fn manager() -> AuthSession {
    AuthSession::new("manager-1", UserRole::Manager)
}

fn worker(id: &str, name: &str) -> AssignedWorker {
    AssignedWorker {
        staff_id: UserId(id.to_string()),
        name: name.to_string(),
        phone: "+91 98200 00000".to_string(),
    }
}

fn request(
    id: &str,
    property: &str,
    tenant: &str,
    status: RequestStatus,
    assigned: Option<AssignedWorker>,
    hour: u32,
) -> MaintenanceRequest {
    MaintenanceRequest {
        id: MaintenanceRequestId(id.to_string()),
        property_id: PropertyId(property.to_string()),
        tenant_id: UserId(tenant.to_string()),
        category: "Plumbing".to_string(),
        subcategory: Some("Leak".to_string()),
        description: format!("issue {id}"),
        priority: Priority::Medium,
        status,
        assigned_worker: assigned,
        notes: None,
        created_at: Utc
            .with_ymd_and_hms(2025, 10, 1, 0, 0, 0)
            .unwrap()
            + Duration::hours(i64::from(hour)),
    }
}

/// Five requests: three assigned to `staff-1` (two open on prop-a, one
/// completed on prop-b), one on `staff-2`, one unassigned.
#[derive(Default)]
pub(super) struct MemoryRequests {
    records: Mutex<Vec<MaintenanceRequest>>,
    sequence: AtomicU64,
    offline: AtomicBool,
}

impl MemoryRequests {
    pub(super) fn seeded() -> Arc<Self> {
        let repository = Self::default();
        repository
            .records
            .lock()
            .expect("request mutex poisoned")
            .extend([
                request("req-1", "prop-a", "tenant-1", RequestStatus::Pending, Some(worker("staff-1", "Ravi")), 1),
                request("req-2", "prop-a", "tenant-2", RequestStatus::InProgress, Some(worker("staff-1", "Ravi")), 2),
                request("req-3", "prop-b", "tenant-1", RequestStatus::Completed, Some(worker("staff-1", "Ravi")), 3),
                request("req-4", "prop-c", "tenant-3", RequestStatus::Pending, Some(worker("staff-2", "Meera")), 4),
                request("req-5", "prop-a", "tenant-1", RequestStatus::Pending, None, 5),
            ]);
        Arc::new(repository)
    }

    pub(super) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(super) fn stored(&self, id: &str) -> Option<MaintenanceRequest> {
        let guard = self.records.lock().expect("request mutex poisoned");
        guard.iter().find(|request| request.id.0 == id).cloned()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable("firestore offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MaintenanceRepository for MemoryRequests {
    async fn list(
        &self,
        _session: &AuthSession,
        filter: &RequestFilter,
    ) -> Result<Vec<MaintenanceRequest>, RepositoryError> {
        self.check()?;
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn get(
        &self,
        _session: &AuthSession,
        id: &MaintenanceRequestId,
    ) -> Result<Option<MaintenanceRequest>, RepositoryError> {
        self.check()?;
        let guard = self.records.lock().expect("request mutex poisoned");
        Ok(guard.iter().find(|r| &r.id == id).cloned())
    }

    async fn insert(
        &self,
        _session: &AuthSession,
        draft: MaintenanceRequestDraft,
    ) -> Result<MaintenanceRequest, RepositoryError> {
        self.check()?;
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = draft.into_request(MaintenanceRequestId(format!("new-{id}")));
        self.records
            .lock()
            .expect("request mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        _session: &AuthSession,
        request: MaintenanceRequest,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut guard = self.records.lock().expect("request mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = request;
        Ok(())
    }

    async fn delete(
        &self,
        _session: &AuthSession,
        id: &MaintenanceRequestId,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut guard = self.records.lock().expect("request mutex poisoned");
        let index = guard
            .iter()
            .position(|r| &r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        guard.remove(index);
        Ok(())
    }
}

pub(super) struct MemoryUsers {
    profiles: Vec<UserProfile>,
}

impl MemoryUsers {
    pub(super) fn seeded() -> Arc<Self> {
        let profile = |id: &str, name: &str, role| UserProfile {
            id: UserId(id.to_string()),
            name: name.to_string(),
            phone: format!("phone-{id}"),
            role,
        };
        Arc::new(Self {
            profiles: vec![
                profile("tenant-1", "Asha", UserRole::Tenant),
                profile("staff-2", "meera", UserRole::Staff),
                profile("staff-1", "Ravi", UserRole::Staff),
                profile("manager-1", "Kiran", UserRole::Manager),
            ],
        })
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn get(
        &self,
        _session: &AuthSession,
        id: &UserId,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.profiles.iter().find(|p| &p.id == id).cloned())
    }

    async fn with_role(
        &self,
        _session: &AuthSession,
        role: UserRole,
    ) -> Result<Vec<UserProfile>, RepositoryError> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.role == role)
            .cloned()
            .collect())
    }
}
