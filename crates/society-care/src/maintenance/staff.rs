use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use super::desk::MaintenanceError;
use super::domain::{
    open_counts, MaintenanceRequest, MaintenanceRequestId, RequestFilter, RequestStatus,
};
use super::repository::MaintenanceRepository;
use crate::error::RepositoryError;
use crate::property::PropertyId;
use crate::response::{OperationTracker, Response};
use crate::session::{AuthSession, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffOperation {
    FetchAssigned,
    UpdateStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StaffSnapshot {
    pub staff_id: Option<UserId>,
    pub requests: Vec<MaintenanceRequest>,
    /// Pending or in-progress requests per property.
    pub open_counts: BTreeMap<PropertyId, usize>,
    pub operations: OperationTracker<StaffOperation>,
}

/// Work queue for a staff member.
pub struct StaffDesk<R> {
    repository: Arc<R>,
    session: AuthSession,
    state: Mutex<StaffSnapshot>,
}

impl<R> StaffDesk<R>
where
    R: MaintenanceRepository + 'static,
{
    pub fn new(repository: Arc<R>, session: AuthSession) -> Self {
        Self {
            repository,
            session,
            state: Mutex::new(StaffSnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> StaffSnapshot {
        self.lock().clone()
    }

    pub fn operation(&self, operation: StaffOperation) -> Option<Response<()>> {
        self.lock().operations.get(operation).cloned()
    }

    /// Loads the requests assigned to `staff_id` and regroups the open ones by
    /// property from the full result.
    pub async fn fetch_assigned_requests(&self, staff_id: UserId) -> Response<()> {
        self.lock().operations.begin(StaffOperation::FetchAssigned);

        let filter = RequestFilter::AssignedTo(staff_id.clone());
        let result = self.repository.list(&self.session, &filter).await;

        let mut desk = self.lock();
        match result {
            Ok(requests) => {
                desk.open_counts = open_counts(&requests);
                debug!(staff = %staff_id, total = requests.len(), open_properties = desk.open_counts.len(), "assigned requests loaded");
                desk.requests = requests;
                desk.staff_id = Some(staff_id);
                desk.operations
                    .finish(StaffOperation::FetchAssigned, Ok::<(), RepositoryError>(()))
            }
            Err(err) => {
                warn!(staff = %staff_id, error = %err, "assigned request fetch failed");
                desk.operations.finish(StaffOperation::FetchAssigned, Err(err))
            }
        }
    }

    /// Moves an assigned request to `status`, optionally replacing its notes,
    /// then reloads the queue.
    pub async fn update_status(
        &self,
        request_id: MaintenanceRequestId,
        status: RequestStatus,
        notes: Option<String>,
    ) -> Response<()> {
        self.lock().operations.begin(StaffOperation::UpdateStatus);

        let result = self.apply_status(&request_id, status, notes).await;
        if let Err(err) = &result {
            warn!(request = %request_id, error = %err, "status update failed");
        }
        let succeeded = result.is_ok();
        let response = self
            .lock()
            .operations
            .finish(StaffOperation::UpdateStatus, result);

        if succeeded {
            let staff_id = self
                .lock()
                .staff_id
                .clone()
                .unwrap_or_else(|| self.session.user_id.clone());
            self.fetch_assigned_requests(staff_id).await;
        }
        response
    }

    async fn apply_status(
        &self,
        request_id: &MaintenanceRequestId,
        status: RequestStatus,
        notes: Option<String>,
    ) -> Result<(), MaintenanceError> {
        let mut request = self
            .repository
            .get(&self.session, request_id)
            .await?
            .ok_or_else(|| MaintenanceError::Missing(request_id.clone()))?;

        if !self.session.is_manager() && !request.is_assigned_to(&self.session.user_id) {
            return Err(MaintenanceError::NotAssigned(request_id.clone()));
        }
        if !request.status.can_transition_to(status) {
            return Err(MaintenanceError::InvalidTransition {
                from: request.status,
                to: status,
            });
        }

        request.status = status;
        if let Some(notes) = notes.filter(|notes| !notes.trim().is_empty()) {
            request.notes = Some(notes);
        }
        self.repository.update(&self.session, request).await?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, StaffSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
