use async_trait::async_trait;

use super::domain::{
    MaintenanceRequest, MaintenanceRequestDraft, MaintenanceRequestId, RequestFilter,
};
use crate::error::RepositoryError;
use crate::session::AuthSession;

/// The `maintenance_requests` collection, scoped to the caller's session.
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    async fn list(
        &self,
        session: &AuthSession,
        filter: &RequestFilter,
    ) -> Result<Vec<MaintenanceRequest>, RepositoryError>;

    async fn get(
        &self,
        session: &AuthSession,
        id: &MaintenanceRequestId,
    ) -> Result<Option<MaintenanceRequest>, RepositoryError>;

    async fn insert(
        &self,
        session: &AuthSession,
        draft: MaintenanceRequestDraft,
    ) -> Result<MaintenanceRequest, RepositoryError>;

    /// Whole-document replace.
    async fn update(
        &self,
        session: &AuthSession,
        request: MaintenanceRequest,
    ) -> Result<(), RepositoryError>;

    async fn delete(
        &self,
        session: &AuthSession,
        id: &MaintenanceRequestId,
    ) -> Result<(), RepositoryError>;
}
