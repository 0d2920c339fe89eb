use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::catalog::domain::{Category, CategoryId, NewCategory};
use crate::catalog::repository::CategoryRepository;
use crate::catalog::CategoryBoard;
use crate::error::RepositoryError;

#[derive(Default)]
pub(super) struct MemoryCategories {
    records: Mutex<Vec<Category>>,
    sequence: AtomicU64,
    offline: AtomicBool,
}

impl MemoryCategories {
    pub(super) fn with(categories: Vec<(&str, Vec<&str>)>) -> Arc<Self> {
        let repository = Self::default();
        {
            let mut guard = repository.records.lock().expect("category mutex poisoned");
            for (name, subcategories) in categories {
                let id = repository.next_id();
                guard.push(Category {
                    id,
                    name: name.to_string(),
                    subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
        Arc::new(repository)
    }

    pub(super) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(super) fn stored(&self, id: &str) -> Option<Category> {
        let guard = self.records.lock().expect("category mutex poisoned");
        guard.iter().find(|category| category.id.0 == id).cloned()
    }

    fn next_id(&self) -> CategoryId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        CategoryId(format!("cat-{id}"))
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable("firestore offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn with_record<T>(
        &self,
        id: &CategoryId,
        edit: impl FnOnce(&mut Category) -> T,
    ) -> Result<T, RepositoryError> {
        self.check()?;
        let mut guard = self.records.lock().expect("category mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|category| &category.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(edit(record))
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategories {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        self.check()?;
        Ok(self.records.lock().expect("category mutex poisoned").clone())
    }

    async fn get(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        self.check()?;
        let guard = self.records.lock().expect("category mutex poisoned");
        Ok(guard.iter().find(|category| &category.id == id).cloned())
    }

    async fn insert(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        self.check()?;
        let stored = Category {
            id: self.next_id(),
            name: category.name,
            subcategories: category.subcategories,
        };
        self.records
            .lock()
            .expect("category mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, category: Category) -> Result<(), RepositoryError> {
        let id = category.id.clone();
        self.with_record(&id, |record| *record = category)
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), RepositoryError> {
        self.check()?;
        let mut guard = self.records.lock().expect("category mutex poisoned");
        let before = guard.len();
        guard.retain(|category| &category.id != id);
        if guard.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }

    async fn add_subcategory(&self, id: &CategoryId, name: &str) -> Result<(), RepositoryError> {
        self.with_record(id, |record| {
            if !record.has_subcategory(name) {
                record.subcategories.push(name.to_string());
            }
        })
    }

    async fn remove_subcategory(&self, id: &CategoryId, name: &str) -> Result<(), RepositoryError> {
        self.with_record(id, |record| record.subcategories.retain(|s| s != name))
    }
}

pub(super) fn names(board: &CategoryBoard<MemoryCategories>) -> Vec<String> {
    board
        .snapshot()
        .categories
        .into_iter()
        .map(|category| category.name)
        .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
