use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::warn;

use super::domain::{sort_categories, Category, CategoryId, NewCategory, SortOrder};
use super::repository::CategoryRepository;
use crate::error::RepositoryError;
use crate::response::{OperationTracker, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOperation {
    Fetch,
    AddCategory,
    UpdateCategory,
    DeleteCategory,
    AddSubcategory,
    UpdateSubcategory,
    DeleteSubcategory,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("category name must not be blank")]
    BlankCategoryName,
    #[error("subcategory name must not be blank")]
    BlankSubcategoryName,
    #[error("category {0} not found")]
    CategoryMissing(CategoryId),
    #[error("subcategory '{name}' not found in category {category}")]
    SubcategoryMissing { category: CategoryId, name: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategorySnapshot {
    pub categories: Vec<Category>,
    pub order: SortOrder,
    pub operations: OperationTracker<CategoryOperation>,
}

/// Category list with per-operation status.
///
/// Every mutation is followed by a full re-fetch, which resets the order to
/// ascending and drops any manual reordering.
pub struct CategoryBoard<R> {
    repository: Arc<R>,
    state: Mutex<CategorySnapshot>,
}

impl<R> CategoryBoard<R>
where
    R: CategoryRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            state: Mutex::new(CategorySnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> CategorySnapshot {
        self.lock().clone()
    }

    pub fn operation(&self, operation: CategoryOperation) -> Option<Response<()>> {
        self.lock().operations.get(operation).cloned()
    }

    /// Loads every category sorted ascending by case-folded name. On failure the
    /// previously loaded list is kept.
    pub async fn fetch_categories(&self) -> Response<()> {
        self.lock().operations.begin(CategoryOperation::Fetch);

        let result = self.repository.list().await;

        let mut board = self.lock();
        match result {
            Ok(mut categories) => {
                sort_categories(&mut categories, SortOrder::Ascending);
                board.categories = categories;
                board.order = SortOrder::Ascending;
                board
                    .operations
                    .finish(CategoryOperation::Fetch, Ok::<(), RepositoryError>(()))
            }
            Err(err) => {
                warn!(error = %err, "category fetch failed");
                board.operations.finish(CategoryOperation::Fetch, Err(err))
            }
        }
    }

    /// Flips between ascending and descending order on the loaded list.
    pub fn toggle_sort_categories(&self) -> SortOrder {
        let mut board = self.lock();
        let order = board.order.flipped();
        sort_categories(&mut board.categories, order);
        board.order = order;
        order
    }

    /// Swaps `index` with its predecessor. Returns false at the top of the list
    /// or when `index` is out of range.
    pub fn move_category_up(&self, index: usize) -> bool {
        let mut board = self.lock();
        if index == 0 || index >= board.categories.len() {
            return false;
        }
        board.categories.swap(index - 1, index);
        true
    }

    /// Swaps `index` with its successor. Returns false at the bottom of the list.
    pub fn move_category_down(&self, index: usize) -> bool {
        let mut board = self.lock();
        if index >= board.categories.len().saturating_sub(1) {
            return false;
        }
        board.categories.swap(index, index + 1);
        true
    }

    pub async fn add_category(&self, category: NewCategory) -> Response<()> {
        let repository = self.repository.clone();
        self.mutate(CategoryOperation::AddCategory, async move {
            let name = non_blank(&category.name).ok_or(CatalogError::BlankCategoryName)?;
            let category = NewCategory {
                name,
                subcategories: category.subcategories,
            };
            repository.insert(category).await?;
            Ok(())
        })
        .await
    }

    pub async fn update_category(&self, category: Category) -> Response<()> {
        let repository = self.repository.clone();
        self.mutate(CategoryOperation::UpdateCategory, async move {
            let name = non_blank(&category.name).ok_or(CatalogError::BlankCategoryName)?;
            repository.update(Category { name, ..category }).await?;
            Ok(())
        })
        .await
    }

    pub async fn delete_category(&self, id: CategoryId) -> Response<()> {
        let repository = self.repository.clone();
        self.mutate(CategoryOperation::DeleteCategory, async move {
            repository.delete(&id).await?;
            Ok(())
        })
        .await
    }

    pub async fn add_subcategory(&self, id: CategoryId, name: &str) -> Response<()> {
        let repository = self.repository.clone();
        let name = non_blank(name);
        self.mutate(CategoryOperation::AddSubcategory, async move {
            let name = name.ok_or(CatalogError::BlankSubcategoryName)?;
            repository.add_subcategory(&id, &name).await?;
            Ok(())
        })
        .await
    }

    pub async fn delete_subcategory(&self, id: CategoryId, name: &str) -> Response<()> {
        let repository = self.repository.clone();
        let name = name.to_string();
        self.mutate(CategoryOperation::DeleteSubcategory, async move {
            repository.remove_subcategory(&id, &name).await?;
            Ok(())
        })
        .await
    }

    /// Renames the first entry equal to `old_name`. This is a read-modify-write
    /// with no version check, so two concurrent renames can overwrite each other.
    pub async fn update_subcategory(
        &self,
        id: CategoryId,
        old_name: &str,
        new_name: &str,
    ) -> Response<()> {
        let repository = self.repository.clone();
        let old_name = old_name.to_string();
        let new_name = non_blank(new_name);
        self.mutate(CategoryOperation::UpdateSubcategory, async move {
            let new_name = new_name.ok_or(CatalogError::BlankSubcategoryName)?;
            let mut category = repository
                .get(&id)
                .await?
                .ok_or_else(|| CatalogError::CategoryMissing(id.clone()))?;
            let slot = category
                .subcategories
                .iter_mut()
                .find(|existing| **existing == old_name)
                .ok_or_else(|| CatalogError::SubcategoryMissing {
                    category: id.clone(),
                    name: old_name.clone(),
                })?;
            *slot = new_name;
            repository.update(category).await?;
            Ok(())
        })
        .await
    }

    async fn mutate<F>(&self, operation: CategoryOperation, call: F) -> Response<()>
    where
        F: Future<Output = Result<(), CatalogError>>,
    {
        self.lock().operations.begin(operation);

        let result = call.await;
        if let Err(err) = &result {
            warn!(?operation, error = %err, "category mutation failed");
        }
        let succeeded = result.is_ok();
        let response = self.lock().operations.finish(operation, result);

        if succeeded {
            self.fetch_categories().await;
        }
        response
    }

    fn lock(&self) -> MutexGuard<'_, CategorySnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
