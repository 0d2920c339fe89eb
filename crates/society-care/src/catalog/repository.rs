use async_trait::async_trait;

use super::domain::{Category, CategoryId, NewCategory};
use crate::error::RepositoryError;

/// The `categories` collection.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn get(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError>;
    /// Stores a new document and returns it with the assigned id.
    async fn insert(&self, category: NewCategory) -> Result<Category, RepositoryError>;
    /// Whole-document replace.
    async fn update(&self, category: Category) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &CategoryId) -> Result<(), RepositoryError>;
    /// Array-union: appends `name` unless an identical entry exists.
    async fn add_subcategory(&self, id: &CategoryId, name: &str) -> Result<(), RepositoryError>;
    /// Array-remove: drops every entry equal to `name`.
    async fn remove_subcategory(&self, id: &CategoryId, name: &str)
        -> Result<(), RepositoryError>;
}
