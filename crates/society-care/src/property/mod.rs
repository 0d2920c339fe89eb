//! Owner-submitted properties and their approval status.

mod desk;
pub mod domain;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use desk::{PropertyDesk, PropertyError, PropertyOperation, PropertySnapshot};
pub use domain::{
    NewProperty, Property, PropertyAddress, PropertyFilter, PropertyId, PropertyStatus,
};
pub use repository::PropertyRepository;
pub use router::property_router;
