use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;
use crate::session::{AuthSession, UserId, UserRole};

/// Document stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub phone: String,
    pub role: UserRole,
}

/// Read access to user documents.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, session: &AuthSession, id: &UserId)
        -> Result<Option<UserProfile>, RepositoryError>;

    /// Equality-filtered query on the `role` field.
    async fn with_role(
        &self,
        session: &AuthSession,
        role: UserRole,
    ) -> Result<Vec<UserProfile>, RepositoryError>;
}
