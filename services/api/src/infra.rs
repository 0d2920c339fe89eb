use async_trait::async_trait;
use chrono::{Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use society_care::catalog::{Category, CategoryId, CategoryRepository, NewCategory};
use society_care::error::RepositoryError;
use society_care::location::{
    Block, BuildingRef, City, Country, Flat, LocationId, LocationLevel, LocationNode,
    LocationRepository, Society, State, Tower,
};
use society_care::maintenance::{
    AssignedWorker, MaintenanceRepository, MaintenanceRequest, MaintenanceRequestDraft,
    MaintenanceRequestId, Priority, RequestFilter, RequestStatus,
};
use society_care::property::{
    NewProperty, Property, PropertyAddress, PropertyFilter, PropertyId, PropertyRepository,
    PropertyStatus,
};
use society_care::session::{AuthSession, UserId, UserRole};
use society_care::users::{UserProfile, UserRepository};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn forbidden(session: &AuthSession, what: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Forbidden(format!("{} may not modify {what}", session.user_id))
}

/// Every collection the service reads, held in process memory.
#[derive(Clone, Default)]
pub(crate) struct Backend {
    pub(crate) locations: Arc<InMemoryLocations>,
    pub(crate) categories: Arc<InMemoryCategories>,
    pub(crate) properties: Arc<InMemoryProperties>,
    pub(crate) requests: Arc<InMemoryMaintenance>,
    pub(crate) users: Arc<InMemoryUsers>,
}

impl Backend {
    /// Backend populated with a small Pune society for demos and local runs.
    pub(crate) fn seeded() -> Self {
        let backend = Self::default();
        backend.locations.extend(sample_locations());
        backend.categories.extend(sample_categories());
        backend.users.extend(sample_users());
        backend.properties.extend(sample_properties());
        backend.requests.extend(sample_requests());
        backend
    }
}

#[derive(Default)]
pub(crate) struct InMemoryLocations {
    nodes: Mutex<BTreeMap<(LocationLevel, LocationId), LocationNode>>,
}

impl InMemoryLocations {
    pub(crate) fn extend(&self, nodes: impl IntoIterator<Item = LocationNode>) {
        let mut guard = lock(&self.nodes);
        for node in nodes {
            guard.insert((node.level(), node.id()), node);
        }
    }

    fn collect<T>(&self, pick: impl Fn(&LocationNode) -> Option<T>) -> Vec<T> {
        lock(&self.nodes).values().filter_map(pick).collect()
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocations {
    async fn countries(&self) -> Result<Vec<Country>, RepositoryError> {
        Ok(self.collect(|node| match node {
            LocationNode::Country(country) => Some(country.clone()),
            _ => None,
        }))
    }

    async fn states(&self, country_id: LocationId) -> Result<Vec<State>, RepositoryError> {
        Ok(self.collect(|node| match node {
            LocationNode::State(state) if state.country_id == country_id => Some(state.clone()),
            _ => None,
        }))
    }

    async fn cities(&self, state_id: LocationId) -> Result<Vec<City>, RepositoryError> {
        Ok(self.collect(|node| match node {
            LocationNode::City(city) if city.state_id == state_id => Some(city.clone()),
            _ => None,
        }))
    }

    async fn societies(&self, city_id: LocationId) -> Result<Vec<Society>, RepositoryError> {
        Ok(self.collect(|node| match node {
            LocationNode::Society(society) if society.city_id == city_id => Some(society.clone()),
            _ => None,
        }))
    }

    async fn blocks(&self, society_id: LocationId) -> Result<Vec<Block>, RepositoryError> {
        Ok(self.collect(|node| match node {
            LocationNode::Block(block) if block.society_id == society_id => Some(block.clone()),
            _ => None,
        }))
    }

    async fn towers(&self, society_id: LocationId) -> Result<Vec<Tower>, RepositoryError> {
        Ok(self.collect(|node| match node {
            LocationNode::Tower(tower) if tower.society_id == society_id => Some(tower.clone()),
            _ => None,
        }))
    }

    async fn flats(&self, building: BuildingRef) -> Result<Vec<Flat>, RepositoryError> {
        Ok(self.collect(|node| match node {
            LocationNode::Flat(flat) if flat.building == building => Some(flat.clone()),
            _ => None,
        }))
    }

    async fn save(&self, node: LocationNode) -> Result<LocationNode, RepositoryError> {
        lock(&self.nodes).insert((node.level(), node.id()), node.clone());
        Ok(node)
    }

    async fn remove(&self, level: LocationLevel, id: LocationId) -> Result<(), RepositoryError> {
        lock(&self.nodes)
            .remove(&(level, id))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryCategories {
    records: Mutex<BTreeMap<CategoryId, Category>>,
    sequence: AtomicU64,
}

impl InMemoryCategories {
    pub(crate) fn extend(&self, categories: impl IntoIterator<Item = NewCategory>) {
        let mut guard = lock(&self.records);
        for category in categories {
            let stored = self.assign_id(category);
            guard.insert(stored.id.clone(), stored);
        }
    }

    fn assign_id(&self, category: NewCategory) -> Category {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Category {
            id: CategoryId(format!("cat-{id}")),
            name: category.name,
            subcategories: category.subcategories,
        }
    }

    fn with_category<T>(
        &self,
        id: &CategoryId,
        apply: impl FnOnce(&mut Category) -> T,
    ) -> Result<T, RepositoryError> {
        let mut guard = lock(&self.records);
        guard.get_mut(id).map(apply).ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategories {
    async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(lock(&self.records).values().cloned().collect())
    }

    async fn get(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(lock(&self.records).get(id).cloned())
    }

    async fn insert(&self, category: NewCategory) -> Result<Category, RepositoryError> {
        let stored = self.assign_id(category);
        lock(&self.records).insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, category: Category) -> Result<(), RepositoryError> {
        let id = category.id.clone();
        self.with_category(&id, |slot| *slot = category)
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), RepositoryError> {
        lock(&self.records)
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn add_subcategory(&self, id: &CategoryId, name: &str) -> Result<(), RepositoryError> {
        self.with_category(id, |category| {
            if !category.has_subcategory(name) {
                category.subcategories.push(name.to_string());
            }
        })
    }

    async fn remove_subcategory(
        &self,
        id: &CategoryId,
        name: &str,
    ) -> Result<(), RepositoryError> {
        self.with_category(id, |category| {
            category.subcategories.retain(|existing| existing != name)
        })
    }
}

#[derive(Default)]
pub(crate) struct InMemoryProperties {
    records: Mutex<Vec<Property>>,
    sequence: AtomicU64,
}

impl InMemoryProperties {
    pub(crate) fn extend(&self, properties: impl IntoIterator<Item = Property>) {
        lock(&self.records).extend(properties);
    }

    fn authorize(session: &AuthSession, property: &Property) -> Result<(), RepositoryError> {
        if session.is_manager() || property.owner_id == session.user_id {
            Ok(())
        } else {
            Err(forbidden(session, &property.id))
        }
    }
}

#[async_trait]
impl PropertyRepository for InMemoryProperties {
    async fn list(
        &self,
        _session: &AuthSession,
        filter: &PropertyFilter,
    ) -> Result<Vec<Property>, RepositoryError> {
        let guard = lock(&self.records);
        Ok(guard.iter().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn get(
        &self,
        _session: &AuthSession,
        id: &PropertyId,
    ) -> Result<Option<Property>, RepositoryError> {
        Ok(lock(&self.records).iter().find(|p| &p.id == id).cloned())
    }

    async fn insert(
        &self,
        session: &AuthSession,
        property: NewProperty,
    ) -> Result<Property, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = Property {
            id: PropertyId(format!("prop-{id}")),
            address: property.address,
            status: PropertyStatus::PendingApproval,
            owner_id: session.user_id.clone(),
            tenant_id: property.tenant_id,
        };
        lock(&self.records).push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, session: &AuthSession, property: Property) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        let slot = guard
            .iter_mut()
            .find(|p| p.id == property.id)
            .ok_or(RepositoryError::NotFound)?;
        Self::authorize(session, slot)?;
        *slot = property;
        Ok(())
    }

    async fn delete(&self, session: &AuthSession, id: &PropertyId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        let index = guard
            .iter()
            .position(|p| &p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Self::authorize(session, &guard[index])?;
        guard.remove(index);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryMaintenance {
    records: Mutex<Vec<MaintenanceRequest>>,
    sequence: AtomicU64,
}

impl InMemoryMaintenance {
    pub(crate) fn extend(&self, requests: impl IntoIterator<Item = MaintenanceRequest>) {
        lock(&self.records).extend(requests);
    }

    /// Tenants write their own requests, staff the ones assigned to them.
    fn authorize(session: &AuthSession, request: &MaintenanceRequest) -> Result<(), RepositoryError> {
        let allowed = session.is_manager()
            || request.tenant_id == session.user_id
            || request.is_assigned_to(&session.user_id);
        if allowed {
            Ok(())
        } else {
            Err(forbidden(session, &request.id))
        }
    }
}

#[async_trait]
impl MaintenanceRepository for InMemoryMaintenance {
    async fn list(
        &self,
        _session: &AuthSession,
        filter: &RequestFilter,
    ) -> Result<Vec<MaintenanceRequest>, RepositoryError> {
        let guard = lock(&self.records);
        Ok(guard.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn get(
        &self,
        _session: &AuthSession,
        id: &MaintenanceRequestId,
    ) -> Result<Option<MaintenanceRequest>, RepositoryError> {
        Ok(lock(&self.records).iter().find(|r| &r.id == id).cloned())
    }

    async fn insert(
        &self,
        _session: &AuthSession,
        draft: MaintenanceRequestDraft,
    ) -> Result<MaintenanceRequest, RepositoryError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = draft.into_request(MaintenanceRequestId(format!("req-{id}")));
        lock(&self.records).push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        session: &AuthSession,
        request: MaintenanceRequest,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        let slot = guard
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or(RepositoryError::NotFound)?;
        Self::authorize(session, slot)?;
        *slot = request;
        Ok(())
    }

    async fn delete(
        &self,
        session: &AuthSession,
        id: &MaintenanceRequestId,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        let index = guard
            .iter()
            .position(|r| &r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Self::authorize(session, &guard[index])?;
        guard.remove(index);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryUsers {
    profiles: Mutex<Vec<UserProfile>>,
}

impl InMemoryUsers {
    pub(crate) fn extend(&self, profiles: impl IntoIterator<Item = UserProfile>) {
        lock(&self.profiles).extend(profiles);
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn get(
        &self,
        _session: &AuthSession,
        id: &UserId,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(lock(&self.profiles).iter().find(|p| &p.id == id).cloned())
    }

    async fn with_role(
        &self,
        _session: &AuthSession,
        role: UserRole,
    ) -> Result<Vec<UserProfile>, RepositoryError> {
        let guard = lock(&self.profiles);
        Ok(guard.iter().filter(|p| p.role == role).cloned().collect())
    }
}

fn sample_locations() -> Vec<LocationNode> {
    vec![
        Country { id: 1, name: "India".to_string() }.into(),
        State { id: 10, name: "Maharashtra".to_string(), country_id: 1 }.into(),
        State { id: 11, name: "Karnataka".to_string(), country_id: 1 }.into(),
        City { id: 100, name: "Pune".to_string(), state_id: 10 }.into(),
        City { id: 101, name: "Mumbai".to_string(), state_id: 10 }.into(),
        City { id: 110, name: "Bengaluru".to_string(), state_id: 11 }.into(),
        Society { id: 200, name: "Green Acres".to_string(), city_id: 100 }.into(),
        Society { id: 201, name: "Lake View".to_string(), city_id: 101 }.into(),
        Block { id: 300, name: "Block A".to_string(), society_id: 200 }.into(),
        Block { id: 301, name: "Block B".to_string(), society_id: 200 }.into(),
        Tower { id: 400, name: "Tower 1".to_string(), society_id: 201 }.into(),
        Flat { id: 9001, name: "A-101".to_string(), building: BuildingRef::Block(300) }.into(),
        Flat { id: 9002, name: "A-102".to_string(), building: BuildingRef::Block(300) }.into(),
        Flat { id: 9003, name: "B-201".to_string(), building: BuildingRef::Block(301) }.into(),
        Flat { id: 9004, name: "T1-1204".to_string(), building: BuildingRef::Tower(400) }.into(),
    ]
}

fn sample_categories() -> Vec<NewCategory> {
    let category = |name: &str, subcategories: &[&str]| NewCategory {
        name: name.to_string(),
        subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        category("Plumbing", &["Leak", "Blockage"]),
        category("electrical", &["Wiring", "Lighting"]),
        category("Carpentry", &["Doors"]),
    ]
}

fn sample_users() -> Vec<UserProfile> {
    let profile = |id: &str, name: &str, phone: &str, role| UserProfile {
        id: UserId(id.to_string()),
        name: name.to_string(),
        phone: phone.to_string(),
        role,
    };
    vec![
        profile("tenant-1", "Asha Kulkarni", "+91 98200 11111", UserRole::Tenant),
        profile("owner-1", "Vikram Rao", "+91 98200 22222", UserRole::Tenant),
        profile("staff-1", "Ravi Patil", "+91 98200 33333", UserRole::Staff),
        profile("staff-2", "Meera Joshi", "+91 98200 44444", UserRole::Staff),
        profile("manager-1", "Kiran Desai", "+91 98200 55555", UserRole::Manager),
    ]
}

fn green_acres(building: &str, flat_no: &str) -> PropertyAddress {
    PropertyAddress {
        country: "India".to_string(),
        state: "Maharashtra".to_string(),
        city: "Pune".to_string(),
        society: "Green Acres".to_string(),
        building: building.to_string(),
        flat_no: flat_no.to_string(),
    }
}

fn sample_properties() -> Vec<Property> {
    vec![
        Property {
            id: PropertyId("prop-a101".to_string()),
            address: green_acres("Block A", "A-101"),
            status: PropertyStatus::Active,
            owner_id: UserId("owner-1".to_string()),
            tenant_id: Some(UserId("tenant-1".to_string())),
        },
        Property {
            id: PropertyId("prop-b201".to_string()),
            address: green_acres("Block B", "B-201"),
            status: PropertyStatus::PendingApproval,
            owner_id: UserId("owner-1".to_string()),
            tenant_id: None,
        },
    ]
}

fn sample_requests() -> Vec<MaintenanceRequest> {
    let now = Utc::now();
    let ravi = AssignedWorker {
        staff_id: UserId("staff-1".to_string()),
        name: "Ravi Patil".to_string(),
        phone: "+91 98200 33333".to_string(),
    };
    let request = |id: &str, property: &str, category: &str, description: &str, status, age_hours| {
        MaintenanceRequest {
            id: MaintenanceRequestId(id.to_string()),
            property_id: PropertyId(property.to_string()),
            tenant_id: UserId("tenant-1".to_string()),
            category: category.to_string(),
            subcategory: None,
            description: description.to_string(),
            priority: Priority::Medium,
            status,
            assigned_worker: Some(ravi.clone()),
            notes: None,
            created_at: now - Duration::hours(age_hours),
        }
    };
    vec![
        request("seed-1", "prop-a101", "Plumbing", "Kitchen sink leaking", RequestStatus::Pending, 30),
        request("seed-2", "prop-a101", "electrical", "Balcony light flickers", RequestStatus::InProgress, 20),
        request("seed-3", "prop-b201", "Carpentry", "Main door hinge loose", RequestStatus::Completed, 72),
    ]
}
