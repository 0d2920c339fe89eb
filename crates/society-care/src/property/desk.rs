use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::warn;

use super::domain::{NewProperty, Property, PropertyFilter, PropertyId, PropertyStatus};
use super::repository::PropertyRepository;
use crate::error::RepositoryError;
use crate::response::{OperationTracker, Response};
use crate::session::{AuthSession, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOperation {
    Fetch,
    Add,
    Update,
    Delete,
    Review,
}

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("society and flat number are required")]
    IncompleteAddress,
    #[error("only managers may review properties")]
    ReviewForbidden,
    #[error("a review must approve, reject, or expire the property")]
    InvalidReview,
    #[error("property {0} not found")]
    Missing(PropertyId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertySnapshot {
    pub properties: Vec<Property>,
    pub operations: OperationTracker<PropertyOperation>,
}

/// Property list for one signed-in user.
pub struct PropertyDesk<R> {
    repository: Arc<R>,
    session: AuthSession,
    state: Mutex<PropertySnapshot>,
}

impl<R> PropertyDesk<R>
where
    R: PropertyRepository + 'static,
{
    pub fn new(repository: Arc<R>, session: AuthSession) -> Self {
        Self {
            repository,
            session,
            state: Mutex::new(PropertySnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> PropertySnapshot {
        self.lock().clone()
    }

    pub fn operation(&self, operation: PropertyOperation) -> Option<Response<()>> {
        self.lock().operations.get(operation).cloned()
    }

    /// Managers and staff see every property; tenants see what they own or rent.
    pub fn filter(&self) -> PropertyFilter {
        match self.session.role {
            UserRole::Manager | UserRole::Staff => PropertyFilter::All,
            UserRole::Tenant => PropertyFilter::Member(self.session.user_id.clone()),
        }
    }

    pub async fn fetch_properties(&self) -> Response<()> {
        self.lock().operations.begin(PropertyOperation::Fetch);

        let result = self.repository.list(&self.session, &self.filter()).await;

        let mut desk = self.lock();
        match result {
            Ok(properties) => {
                desk.properties = properties;
                desk.operations
                    .finish(PropertyOperation::Fetch, Ok::<(), RepositoryError>(()))
            }
            Err(err) => {
                warn!(user = %self.session.user_id, error = %err, "property fetch failed");
                desk.operations.finish(PropertyOperation::Fetch, Err(err))
            }
        }
    }

    pub async fn add_property(&self, property: NewProperty) -> Response<()> {
        self.mutate(PropertyOperation::Add, async {
            if !property.address.is_complete() {
                return Err(PropertyError::IncompleteAddress);
            }
            self.repository.insert(&self.session, property).await?;
            Ok(())
        })
        .await
    }

    /// Whole-document replace; there is no version check. Only managers may
    /// change the status or owner, everyone else keeps the stored values.
    pub async fn update_property(&self, mut property: Property) -> Response<()> {
        self.mutate(PropertyOperation::Update, async {
            if !property.address.is_complete() {
                return Err(PropertyError::IncompleteAddress);
            }
            if !self.session.is_manager() {
                let stored = self
                    .repository
                    .get(&self.session, &property.id)
                    .await?
                    .ok_or_else(|| PropertyError::Missing(property.id.clone()))?;
                property.status = stored.status;
                property.owner_id = stored.owner_id;
            }
            self.repository.update(&self.session, property).await?;
            Ok(())
        })
        .await
    }

    pub async fn delete_property(&self, id: PropertyId) -> Response<()> {
        self.mutate(PropertyOperation::Delete, async {
            self.repository.delete(&self.session, &id).await?;
            Ok(())
        })
        .await
    }

    /// Manager decision on a listing awaiting approval.
    pub async fn review_property(&self, id: PropertyId, status: PropertyStatus) -> Response<()> {
        self.mutate(PropertyOperation::Review, async {
            if !self.session.is_manager() {
                return Err(PropertyError::ReviewForbidden);
            }
            if status == PropertyStatus::PendingApproval {
                return Err(PropertyError::InvalidReview);
            }
            let mut property = self
                .repository
                .get(&self.session, &id)
                .await?
                .ok_or_else(|| PropertyError::Missing(id.clone()))?;
            property.status = status;
            self.repository.update(&self.session, property).await?;
            Ok(())
        })
        .await
    }

    async fn mutate<F>(&self, operation: PropertyOperation, call: F) -> Response<()>
    where
        F: Future<Output = Result<(), PropertyError>>,
    {
        self.lock().operations.begin(operation);

        let result = call.await;
        if let Err(err) = &result {
            warn!(?operation, user = %self.session.user_id, error = %err, "property mutation failed");
        }
        let succeeded = result.is_ok();
        let response = self.lock().operations.finish(operation, result);

        if succeeded {
            self.fetch_properties().await;
        }
        response
    }

    fn lock(&self) -> MutexGuard<'_, PropertySnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
