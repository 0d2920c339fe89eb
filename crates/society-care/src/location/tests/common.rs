use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::RepositoryError;
use crate::location::domain::{
    Block, BuildingRef, City, Country, Flat, LocationId, LocationLevel, LocationNode, Society,
    State, Tower,
};
use crate::location::repository::LocationRepository;

pub(super) fn india() -> Country {
    Country {
        id: 1,
        name: "India".to_string(),
    }
}

pub(super) fn nepal() -> Country {
    Country {
        id: 2,
        name: "Nepal".to_string(),
    }
}

pub(super) fn maharashtra() -> State {
    State {
        id: 10,
        name: "Maharashtra".to_string(),
        country_id: 1,
    }
}

pub(super) fn pune() -> City {
    City {
        id: 100,
        name: "Pune".to_string(),
        state_id: 10,
    }
}

pub(super) fn green_acres() -> Society {
    Society {
        id: 200,
        name: "Green Acres".to_string(),
        city_id: 100,
    }
}

pub(super) fn block_a() -> Block {
    Block {
        id: 300,
        name: "Block A".to_string(),
        society_id: 200,
    }
}

pub(super) fn tower_one() -> Tower {
    Tower {
        id: 400,
        name: "Tower 1".to_string(),
        society_id: 200,
    }
}

pub(super) fn seeded_nodes() -> Vec<LocationNode> {
    vec![
        india().into(),
        nepal().into(),
        maharashtra().into(),
        State {
            id: 11,
            name: "Karnataka".to_string(),
            country_id: 1,
        }
        .into(),
        State {
            id: 20,
            name: "Bagmati".to_string(),
            country_id: 2,
        }
        .into(),
        pune().into(),
        City {
            id: 101,
            name: "Mumbai".to_string(),
            state_id: 10,
        }
        .into(),
        green_acres().into(),
        block_a().into(),
        tower_one().into(),
        Flat {
            id: 9001,
            name: "A-101".to_string(),
            building: BuildingRef::Block(300),
        }
        .into(),
        Flat {
            id: 9002,
            name: "T1-1204".to_string(),
            building: BuildingRef::Tower(400),
        }
        .into(),
    ]
}

#[derive(Default)]
pub(super) struct MemoryLocations {
    nodes: Mutex<Vec<LocationNode>>,
}

impl MemoryLocations {
    pub(super) fn seeded() -> Self {
        Self {
            nodes: Mutex::new(seeded_nodes()),
        }
    }

    fn children<T>(&self, pick: impl Fn(&LocationNode) -> Option<T>) -> Vec<T> {
        let guard = self.nodes.lock().expect("location mutex poisoned");
        guard.iter().filter_map(pick).collect()
    }
}

#[async_trait]
impl LocationRepository for MemoryLocations {
    async fn countries(&self) -> Result<Vec<Country>, RepositoryError> {
        Ok(self.children(|node| match node {
            LocationNode::Country(item) => Some(item.clone()),
            _ => None,
        }))
    }

    async fn states(&self, country_id: LocationId) -> Result<Vec<State>, RepositoryError> {
        Ok(self.children(|node| match node {
            LocationNode::State(item) if item.country_id == country_id => Some(item.clone()),
            _ => None,
        }))
    }

    async fn cities(&self, state_id: LocationId) -> Result<Vec<City>, RepositoryError> {
        Ok(self.children(|node| match node {
            LocationNode::City(item) if item.state_id == state_id => Some(item.clone()),
            _ => None,
        }))
    }

    async fn societies(&self, city_id: LocationId) -> Result<Vec<Society>, RepositoryError> {
        Ok(self.children(|node| match node {
            LocationNode::Society(item) if item.city_id == city_id => Some(item.clone()),
            _ => None,
        }))
    }

    async fn blocks(&self, society_id: LocationId) -> Result<Vec<Block>, RepositoryError> {
        Ok(self.children(|node| match node {
            LocationNode::Block(item) if item.society_id == society_id => Some(item.clone()),
            _ => None,
        }))
    }

    async fn towers(&self, society_id: LocationId) -> Result<Vec<Tower>, RepositoryError> {
        Ok(self.children(|node| match node {
            LocationNode::Tower(item) if item.society_id == society_id => Some(item.clone()),
            _ => None,
        }))
    }

    async fn flats(&self, building: BuildingRef) -> Result<Vec<Flat>, RepositoryError> {
        Ok(self.children(|node| match node {
            LocationNode::Flat(item) if item.building == building => Some(item.clone()),
            _ => None,
        }))
    }

    async fn save(&self, node: LocationNode) -> Result<LocationNode, RepositoryError> {
        let mut guard = self.nodes.lock().expect("location mutex poisoned");
        guard.retain(|existing| !(existing.level() == node.level() && existing.id() == node.id()));
        guard.push(node.clone());
        Ok(node)
    }

    async fn remove(&self, level: LocationLevel, id: LocationId) -> Result<(), RepositoryError> {
        let mut guard = self.nodes.lock().expect("location mutex poisoned");
        let before = guard.len();
        guard.retain(|existing| !(existing.level() == level && existing.id() == id));
        if guard.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

/// Holds `states` fetches for gated countries until released.
pub(super) struct GatedLocations {
    inner: MemoryLocations,
    gated: HashSet<LocationId>,
    pub(super) entered: Notify,
    pub(super) release: Notify,
}

impl GatedLocations {
    pub(super) fn gating(countries: &[LocationId]) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryLocations::seeded(),
            gated: countries.iter().copied().collect(),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl LocationRepository for GatedLocations {
    async fn countries(&self) -> Result<Vec<Country>, RepositoryError> {
        self.inner.countries().await
    }

    async fn states(&self, country_id: LocationId) -> Result<Vec<State>, RepositoryError> {
        if self.gated.contains(&country_id) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.states(country_id).await
    }

    async fn cities(&self, state_id: LocationId) -> Result<Vec<City>, RepositoryError> {
        self.inner.cities(state_id).await
    }

    async fn societies(&self, city_id: LocationId) -> Result<Vec<Society>, RepositoryError> {
        self.inner.societies(city_id).await
    }

    async fn blocks(&self, society_id: LocationId) -> Result<Vec<Block>, RepositoryError> {
        self.inner.blocks(society_id).await
    }

    async fn towers(&self, society_id: LocationId) -> Result<Vec<Tower>, RepositoryError> {
        self.inner.towers(society_id).await
    }

    async fn flats(&self, building: BuildingRef) -> Result<Vec<Flat>, RepositoryError> {
        self.inner.flats(building).await
    }

    async fn save(&self, node: LocationNode) -> Result<LocationNode, RepositoryError> {
        self.inner.save(node).await
    }

    async fn remove(&self, level: LocationLevel, id: LocationId) -> Result<(), RepositoryError> {
        self.inner.remove(level, id).await
    }
}

/// Serves countries and states but fails every deeper query.
pub(super) struct FlakyLocations {
    inner: MemoryLocations,
}

impl FlakyLocations {
    pub(super) fn new() -> Self {
        Self {
            inner: MemoryLocations::seeded(),
        }
    }
}

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("network unreachable".to_string()))
}

#[async_trait]
impl LocationRepository for FlakyLocations {
    async fn countries(&self) -> Result<Vec<Country>, RepositoryError> {
        self.inner.countries().await
    }

    async fn states(&self, country_id: LocationId) -> Result<Vec<State>, RepositoryError> {
        self.inner.states(country_id).await
    }

    async fn cities(&self, _state_id: LocationId) -> Result<Vec<City>, RepositoryError> {
        offline()
    }

    async fn societies(&self, _city_id: LocationId) -> Result<Vec<Society>, RepositoryError> {
        offline()
    }

    async fn blocks(&self, _society_id: LocationId) -> Result<Vec<Block>, RepositoryError> {
        offline()
    }

    async fn towers(&self, _society_id: LocationId) -> Result<Vec<Tower>, RepositoryError> {
        offline()
    }

    async fn flats(&self, _building: BuildingRef) -> Result<Vec<Flat>, RepositoryError> {
        offline()
    }

    async fn save(&self, _node: LocationNode) -> Result<LocationNode, RepositoryError> {
        offline()
    }

    async fn remove(&self, _level: LocationLevel, _id: LocationId) -> Result<(), RepositoryError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
