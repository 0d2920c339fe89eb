use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use super::domain::{
    AssignedWorker, MaintenanceRequest, MaintenanceRequestDraft, MaintenanceRequestId,
    NewMaintenanceRequest, RequestFilter, RequestStatus,
};
use super::repository::MaintenanceRepository;
use crate::error::RepositoryError;
use crate::property::PropertyId;
use crate::response::{OperationTracker, Response};
use crate::session::{AuthSession, UserId, UserRole};
use crate::users::{UserProfile, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceOperation {
    Fetch,
    Add,
    Update,
    Delete,
    Assign,
    StaffDirectory,
}

#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error("a category is required")]
    BlankCategory,
    #[error("describe the issue before submitting")]
    BlankDescription,
    #[error("only managers may assign workers")]
    AssignForbidden,
    #[error("user {0} not found")]
    UnknownUser(UserId),
    #[error("user {0} is not a staff member")]
    NotStaff(UserId),
    #[error("maintenance request {0} not found")]
    Missing(MaintenanceRequestId),
    #[error("request {0} is not assigned to you")]
    NotAssigned(MaintenanceRequestId),
    #[error("cannot move a {from} request to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MaintenanceSnapshot {
    pub requests: Vec<MaintenanceRequest>,
    pub staff: Vec<UserProfile>,
    pub operations: OperationTracker<MaintenanceOperation>,
}

/// Maintenance requests as seen by a tenant (their own) or a manager (all).
pub struct MaintenanceDesk<R, U> {
    repository: Arc<R>,
    users: Arc<U>,
    session: AuthSession,
    state: Mutex<MaintenanceSnapshot>,
}

impl<R, U> MaintenanceDesk<R, U>
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    pub fn new(repository: Arc<R>, users: Arc<U>, session: AuthSession) -> Self {
        Self {
            repository,
            users,
            session,
            state: Mutex::new(MaintenanceSnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> MaintenanceSnapshot {
        self.lock().clone()
    }

    pub fn operation(&self, operation: MaintenanceOperation) -> Option<Response<()>> {
        self.lock().operations.get(operation).cloned()
    }

    pub fn filter(&self) -> RequestFilter {
        match self.session.role {
            UserRole::Manager => RequestFilter::All,
            UserRole::Staff => RequestFilter::AssignedTo(self.session.user_id.clone()),
            UserRole::Tenant => RequestFilter::Tenant(self.session.user_id.clone()),
        }
    }

    pub async fn fetch_requests(&self) -> Response<()> {
        self.load(self.filter()).await
    }

    /// Requests raised against one property, still limited to what the
    /// session's role may see.
    pub async fn fetch_property_requests(&self, property_id: PropertyId) -> Response<()> {
        self.load(RequestFilter::Property(property_id)).await
    }

    async fn load(&self, filter: RequestFilter) -> Response<()> {
        self.lock().operations.begin(MaintenanceOperation::Fetch);

        let scope = self.filter();
        let result = self.repository.list(&self.session, &filter).await;

        let mut desk = self.lock();
        match result {
            Ok(mut requests) => {
                requests.retain(|request| scope.matches(request));
                requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                desk.requests = requests;
                desk.operations
                    .finish(MaintenanceOperation::Fetch, Ok::<(), RepositoryError>(()))
            }
            Err(err) => {
                warn!(user = %self.session.user_id, error = %err, "maintenance fetch failed");
                desk.operations.finish(MaintenanceOperation::Fetch, Err(err))
            }
        }
    }

    /// Raises a pending request on behalf of the session user.
    pub async fn add_request(&self, request: NewMaintenanceRequest) -> Response<()> {
        self.mutate(MaintenanceOperation::Add, async {
            let category = request.category.trim();
            if category.is_empty() {
                return Err(MaintenanceError::BlankCategory);
            }
            let description = request.description.trim();
            if description.is_empty() {
                return Err(MaintenanceError::BlankDescription);
            }

            let draft = MaintenanceRequestDraft {
                property_id: request.property_id.clone(),
                tenant_id: self.session.user_id.clone(),
                category: category.to_string(),
                subcategory: request.subcategory.clone(),
                description: description.to_string(),
                priority: request.priority,
                status: RequestStatus::Pending,
                created_at: Utc::now(),
            };
            self.repository.insert(&self.session, draft).await?;
            Ok(())
        })
        .await
    }

    /// Whole-document replace, subject to the status transition rules.
    /// Non-managers cannot move a request to another tenant, backdate it or
    /// change its assignment.
    pub async fn update_request(&self, mut request: MaintenanceRequest) -> Response<()> {
        self.mutate(MaintenanceOperation::Update, async {
            if request.description.trim().is_empty() {
                return Err(MaintenanceError::BlankDescription);
            }
            let stored = self
                .repository
                .get(&self.session, &request.id)
                .await?
                .ok_or_else(|| MaintenanceError::Missing(request.id.clone()))?;
            if !stored.status.can_transition_to(request.status) {
                return Err(MaintenanceError::InvalidTransition {
                    from: stored.status,
                    to: request.status,
                });
            }
            if !self.session.is_manager() {
                request.tenant_id = stored.tenant_id;
                request.created_at = stored.created_at;
                request.assigned_worker = stored.assigned_worker;
            }
            self.repository.update(&self.session, request).await?;
            Ok(())
        })
        .await
    }

    pub async fn delete_request(&self, id: MaintenanceRequestId) -> Response<()> {
        self.mutate(MaintenanceOperation::Delete, async {
            self.repository.delete(&self.session, &id).await?;
            Ok(())
        })
        .await
    }

    /// Attaches a staff member, copying their name and phone onto the request.
    pub async fn assign_worker(
        &self,
        request_id: MaintenanceRequestId,
        staff_id: UserId,
    ) -> Response<()> {
        self.mutate(MaintenanceOperation::Assign, async {
            if !self.session.is_manager() {
                return Err(MaintenanceError::AssignForbidden);
            }

            let profile = self
                .users
                .get(&self.session, &staff_id)
                .await?
                .ok_or_else(|| MaintenanceError::UnknownUser(staff_id.clone()))?;
            if profile.role != UserRole::Staff {
                return Err(MaintenanceError::NotStaff(staff_id.clone()));
            }

            let mut request = self
                .repository
                .get(&self.session, &request_id)
                .await?
                .ok_or_else(|| MaintenanceError::Missing(request_id.clone()))?;
            request.assigned_worker = Some(AssignedWorker {
                staff_id: profile.id,
                name: profile.name,
                phone: profile.phone,
            });
            self.repository.update(&self.session, request).await?;
            Ok(())
        })
        .await
    }

    /// Loads every `STAFF` user for the assignment picker.
    pub async fn fetch_staff_directory(&self) -> Response<()> {
        self.lock().operations.begin(MaintenanceOperation::StaffDirectory);

        let result = self.users.with_role(&self.session, UserRole::Staff).await;

        let mut desk = self.lock();
        match result {
            Ok(mut staff) => {
                staff.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                desk.staff = staff;
                desk.operations.finish(
                    MaintenanceOperation::StaffDirectory,
                    Ok::<(), RepositoryError>(()),
                )
            }
            Err(err) => {
                warn!(error = %err, "staff directory fetch failed");
                desk.operations
                    .finish(MaintenanceOperation::StaffDirectory, Err(err))
            }
        }
    }

    async fn mutate<F>(&self, operation: MaintenanceOperation, call: F) -> Response<()>
    where
        F: Future<Output = Result<(), MaintenanceError>>,
    {
        self.lock().operations.begin(operation);

        let result = call.await;
        if let Err(err) = &result {
            warn!(?operation, user = %self.session.user_id, error = %err, "maintenance mutation failed");
        }
        let succeeded = result.is_ok();
        let response = self.lock().operations.finish(operation, result);

        if succeeded {
            self.fetch_requests().await;
        }
        response
    }

    fn lock(&self) -> MutexGuard<'_, MaintenanceSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
