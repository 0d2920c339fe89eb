use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::domain::{
    Block, BuildingRef, City, Country, Flat, LocationLevel, Society, State, Tower,
};
use super::repository::LocationRepository;
use crate::error::RepositoryError;

const EVENT_CAPACITY: usize = 16;
const LEVELS: usize = LocationLevel::COUNT;

/// Candidate lists and selections at every level, as rendered by a picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeSnapshot {
    pub loading: bool,
    pub countries: Vec<Country>,
    pub states: Vec<State>,
    pub cities: Vec<City>,
    pub societies: Vec<Society>,
    pub blocks: Vec<Block>,
    pub towers: Vec<Tower>,
    pub flats: Vec<Flat>,
    pub selected_country: Option<Country>,
    pub selected_state: Option<State>,
    pub selected_city: Option<City>,
    pub selected_society: Option<Society>,
    pub selected_block: Option<Block>,
    pub selected_tower: Option<Tower>,
    pub selected_flat: Option<Flat>,
}

impl CascadeSnapshot {
    fn clear(&mut self, level: LocationLevel) {
        match level {
            LocationLevel::Country => {
                self.countries.clear();
                self.selected_country = None;
            }
            LocationLevel::State => {
                self.states.clear();
                self.selected_state = None;
            }
            LocationLevel::City => {
                self.cities.clear();
                self.selected_city = None;
            }
            LocationLevel::Society => {
                self.societies.clear();
                self.selected_society = None;
            }
            LocationLevel::Block => {
                self.blocks.clear();
                self.selected_block = None;
            }
            LocationLevel::Tower => {
                self.towers.clear();
                self.selected_tower = None;
            }
            LocationLevel::Flat => {
                self.flats.clear();
                self.selected_flat = None;
            }
        }
    }

    /// The building whose flats are currently listed, if any.
    pub fn selected_building(&self) -> Option<BuildingRef> {
        match (&self.selected_block, &self.selected_tower) {
            (Some(block), _) => Some(BuildingRef::Block(block.id)),
            (None, Some(tower)) => Some(BuildingRef::Tower(tower.id)),
            (None, None) => None,
        }
    }
}

/// Emitted when a child fetch fails; selections above `level` are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeEvent {
    Error {
        level: LocationLevel,
        message: String,
    },
}

struct CascadeState {
    view: CascadeSnapshot,
    generations: [u64; LEVELS],
    /// Levels with a current, not yet completed fetch.
    in_flight: [bool; LEVELS],
}

impl CascadeState {
    fn refresh_loading(&mut self) {
        self.view.loading = self.in_flight.iter().any(|pending| *pending);
    }
}

/// Generations observed when a fetch was issued.
#[derive(Debug, Clone, Copy)]
struct Ticket([u64; LEVELS]);

/// Country to flat picker state.
///
/// Selecting a node clears every descendant selection and candidate list before
/// the child fetch is awaited. Each level carries a generation counter; a fetch
/// that completes after a newer selection bumped its level is dropped.
pub struct LocationCascade<R> {
    repository: Arc<R>,
    state: Mutex<CascadeState>,
    events: broadcast::Sender<CascadeEvent>,
}

impl<R> LocationCascade<R>
where
    R: LocationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            repository,
            state: Mutex::new(CascadeState {
                view: CascadeSnapshot::default(),
                generations: [0; LEVELS],
                in_flight: [false; LEVELS],
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CascadeEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> CascadeSnapshot {
        self.lock().view.clone()
    }

    pub async fn load_countries(&self) {
        let ticket = {
            let mut state = self.lock();
            state.generations[LocationLevel::Country.index()] += 1;
            state.in_flight[LocationLevel::Country.index()] = true;
            state.refresh_loading();
            Ticket(state.generations)
        };

        let result = self.repository.countries().await;
        self.complete(ticket, LocationLevel::Country, result, |view, items| {
            view.countries = items
        });
    }

    pub async fn select_country(&self, country: Country) {
        let country_id = country.id;
        let ticket = self.begin(LocationLevel::Country, &[LocationLevel::State], |view| {
            view.selected_country = Some(country)
        });

        let result = self.repository.states(country_id).await;
        self.complete(ticket, LocationLevel::State, result, |view, items| {
            view.states = items
        });
    }

    pub async fn select_state(&self, state: State) {
        let state_id = state.id;
        let ticket = self.begin(LocationLevel::State, &[LocationLevel::City], |view| view.selected_state = Some(state));

        let result = self.repository.cities(state_id).await;
        self.complete(ticket, LocationLevel::City, result, |view, items| {
            view.cities = items
        });
    }

    pub async fn select_city(&self, city: City) {
        let city_id = city.id;
        let ticket = self.begin(LocationLevel::City, &[LocationLevel::Society], |view| view.selected_city = Some(city));

        let result = self.repository.societies(city_id).await;
        self.complete(ticket, LocationLevel::Society, result, |view, items| {
            view.societies = items
        });
    }

    /// Fetches blocks and towers together; a society uses one or the other.
    pub async fn select_society(&self, society: Society) {
        let society_id = society.id;
        let fetched = [LocationLevel::Block, LocationLevel::Tower];
        let ticket = self.begin(LocationLevel::Society, &fetched, |view| {
            view.selected_society = Some(society)
        });

        let (blocks, towers) = tokio::join!(
            self.repository.blocks(society_id),
            self.repository.towers(society_id)
        );
        self.complete(ticket, LocationLevel::Block, blocks, |view, items| {
            view.blocks = items
        });
        self.complete(ticket, LocationLevel::Tower, towers, |view, items| {
            view.towers = items
        });
    }

    pub async fn select_block(&self, block: Block) {
        let building = BuildingRef::Block(block.id);
        let ticket = self.begin(LocationLevel::Block, &[LocationLevel::Flat], |view| {
            view.selected_tower = None;
            view.selected_block = Some(block);
        });
        self.fetch_flats(ticket, building).await;
    }

    pub async fn select_tower(&self, tower: Tower) {
        let building = BuildingRef::Tower(tower.id);
        let ticket = self.begin(LocationLevel::Tower, &[LocationLevel::Flat], |view| {
            view.selected_block = None;
            view.selected_tower = Some(tower);
        });
        self.fetch_flats(ticket, building).await;
    }

    /// Selects a flat of the currently selected building. Returns false, leaving
    /// the selection untouched, for a flat that hangs off another building.
    pub fn select_flat(&self, flat: Flat) -> bool {
        let mut state = self.lock();
        if state.view.selected_building() != Some(flat.building) {
            debug!(flat = flat.id, "ignoring flat outside the selected building");
            return false;
        }
        state.view.selected_flat = Some(flat);
        true
    }

    async fn fetch_flats(&self, ticket: Ticket, building: BuildingRef) {
        let result = self.repository.flats(building).await;
        self.complete(ticket, LocationLevel::Flat, result, |view, items| {
            view.flats = items
        });
    }

    /// Applies a selection at `level` and marks `fetched` as in flight.
    fn begin<F>(&self, level: LocationLevel, fetched: &[LocationLevel], select: F) -> Ticket
    where
        F: FnOnce(&mut CascadeSnapshot),
    {
        let mut state = self.lock();
        for child in level.descendants() {
            state.view.clear(*child);
            state.generations[child.index()] += 1;
            state.in_flight[child.index()] = false;
        }
        for child in fetched {
            state.in_flight[child.index()] = true;
        }
        select(&mut state.view);
        state.refresh_loading();
        Ticket(state.generations)
    }

    fn complete<T, F>(
        &self,
        ticket: Ticket,
        level: LocationLevel,
        result: Result<T, RepositoryError>,
        apply: F,
    ) where
        F: FnOnce(&mut CascadeSnapshot, T),
    {
        let mut state = self.lock();
        if state.generations[level.index()] != ticket.0[level.index()] {
            debug!(%level, "discarding stale location fetch");
            return;
        }

        state.in_flight[level.index()] = false;
        state.refresh_loading();
        match result {
            Ok(items) => apply(&mut state.view, items),
            Err(err) => {
                drop(state);
                warn!(%level, error = %err, "location fetch failed");
                // No subscribers is fine; the snapshot still reflects the failure.
                let _ = self.events.send(CascadeEvent::Error {
                    level,
                    message: format!("Failed to load {}: {err}", level.label()),
                });
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, CascadeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
