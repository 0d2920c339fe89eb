//! Maintenance categories and their subcategory names.

mod board;
pub mod domain;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use board::{CatalogError, CategoryBoard, CategoryOperation, CategorySnapshot};
pub use domain::{sort_categories, Category, CategoryId, NewCategory, SortOrder};
pub use repository::CategoryRepository;
pub use router::category_router;
