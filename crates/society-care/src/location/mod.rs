//! Country → state → city → society → block/tower → flat reference data and
//! the cascading picker that walks it.

mod cascade;
pub mod domain;
mod import;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use cascade::{CascadeEvent, CascadeSnapshot, LocationCascade};
pub use domain::{
    Block, BuildingRef, City, Country, Flat, LocationId, LocationLevel, LocationNode, Society,
    State, Tower,
};
pub use import::{ImportSummary, LocationImportError, LocationImporter};
pub use repository::LocationRepository;
pub use router::location_router;
