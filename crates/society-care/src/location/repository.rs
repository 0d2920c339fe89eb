use async_trait::async_trait;

use super::domain::{
    Block, BuildingRef, City, Country, Flat, LocationId, LocationLevel, LocationNode, Society,
    State, Tower,
};
use crate::error::RepositoryError;

/// Reference-data collections for the location hierarchy.
///
/// Child queries are equality filters on the parent link.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn countries(&self) -> Result<Vec<Country>, RepositoryError>;
    async fn states(&self, country_id: LocationId) -> Result<Vec<State>, RepositoryError>;
    async fn cities(&self, state_id: LocationId) -> Result<Vec<City>, RepositoryError>;
    async fn societies(&self, city_id: LocationId) -> Result<Vec<Society>, RepositoryError>;
    async fn blocks(&self, society_id: LocationId) -> Result<Vec<Block>, RepositoryError>;
    async fn towers(&self, society_id: LocationId) -> Result<Vec<Tower>, RepositoryError>;
    async fn flats(&self, building: BuildingRef) -> Result<Vec<Flat>, RepositoryError>;

    /// Whole-document write keyed by level and id.
    async fn save(&self, node: LocationNode) -> Result<LocationNode, RepositoryError>;
    async fn remove(&self, level: LocationLevel, id: LocationId) -> Result<(), RepositoryError>;
}
