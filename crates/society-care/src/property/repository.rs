use async_trait::async_trait;

use super::domain::{NewProperty, Property, PropertyFilter, PropertyId};
use crate::error::RepositoryError;
use crate::session::AuthSession;

/// The `properties` collection, scoped to the caller's session.
///
/// Implementations reject writes to another owner's document with
/// [`RepositoryError::Forbidden`] unless the session belongs to a manager.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn list(
        &self,
        session: &AuthSession,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, RepositoryError>;

    async fn get(
        &self,
        session: &AuthSession,
        id: &PropertyId,
    ) -> Result<Option<Property>, RepositoryError>;

    /// Stores the property as pending approval, owned by the session user.
    async fn insert(
        &self,
        session: &AuthSession,
        property: NewProperty,
    ) -> Result<Property, RepositoryError>;

    async fn update(&self, session: &AuthSession, property: Property)
        -> Result<(), RepositoryError>;

    async fn delete(&self, session: &AuthSession, id: &PropertyId) -> Result<(), RepositoryError>;
}
