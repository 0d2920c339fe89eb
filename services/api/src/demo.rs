use crate::infra::{Backend, InMemoryLocations};
use clap::Args;
use society_care::catalog::{Category, CategoryBoard};
use society_care::error::AppError;
use society_care::location::{
    CascadeSnapshot, ImportSummary, LocationCascade, LocationImporter, LocationLevel,
};
use society_care::maintenance::{
    MaintenanceDesk, NewMaintenanceRequest, Priority, RequestStatus, StaffDesk,
};
use society_care::property::{NewProperty, PropertyAddress, PropertyDesk, PropertyStatus};
use society_care::response::Response;
use society_care::session::{AuthSession, UserId, UserRole};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional location CSV merged into the seeded reference data.
    #[arg(long)]
    pub(crate) locations_csv: Option<PathBuf>,
    /// Staff member who receives the demo request (defaults to staff-1).
    #[arg(long)]
    pub(crate) staff_id: Option<String>,
    /// Stop after the location picker walk-through.
    #[arg(long)]
    pub(crate) locations_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct LocationImportArgs {
    /// CSV with `level,id,parent_id,name[,building]` rows
    pub(crate) csv: PathBuf,
    /// Print the summary as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_location_import(args: LocationImportArgs) -> Result<(), AppError> {
    let LocationImportArgs { csv, json } = args;

    let nodes = LocationImporter::from_path(&csv)?;
    let locations = InMemoryLocations::default();
    let summary = LocationImporter::import_into(&locations, nodes).await?;

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => eprintln!("Unable to render summary as JSON: {err}"),
        }
    } else {
        println!("Location import check: {}", csv.display());
        render_import_summary(&summary);
    }
    Ok(())
}

fn render_import_summary(summary: &ImportSummary) {
    for level in LocationLevel::ordered() {
        let count = summary.imported.get(&level).copied().unwrap_or(0);
        println!("  {:<8} {count:>5}", level.label());
    }
    println!("  {:<8} {:>5}", "Total", summary.total());
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        locations_csv,
        staff_id,
        locations_only,
    } = args;

    let backend = Backend::seeded();
    if let Some(path) = locations_csv {
        let nodes = LocationImporter::from_path(&path)?;
        let summary = LocationImporter::import_into(backend.locations.as_ref(), nodes).await?;
        println!(
            "Merged {} location rows from {}",
            summary.total(),
            path.display()
        );
    }

    println!("Society care demo");
    let address = walk_location_picker(&backend).await;
    if locations_only {
        return Ok(());
    }

    walk_category_board(&backend).await;
    let property_id = walk_property_desk(&backend, address).await;

    let staff_id = UserId(staff_id.unwrap_or_else(|| "staff-1".to_string()));
    walk_maintenance(&backend, property_id, staff_id).await;
    Ok(())
}

/// Picks the first candidate at every level and returns the resulting address.
async fn walk_location_picker(backend: &Backend) -> PropertyAddress {
    println!("\nLocation picker");
    let cascade = LocationCascade::new(Arc::clone(&backend.locations));
    let mut errors = cascade.subscribe();

    cascade.load_countries().await;
    if let Some(country) = first_listed(&cascade, "Countries", |s| &s.countries, |c| &c.name) {
        cascade.select_country(country).await;
    }
    if let Some(state) = first_listed(&cascade, "States", |s| &s.states, |c| &c.name) {
        cascade.select_state(state).await;
    }
    if let Some(city) = first_listed(&cascade, "Cities", |s| &s.cities, |c| &c.name) {
        cascade.select_city(city).await;
    }
    if let Some(society) = first_listed(&cascade, "Societies", |s| &s.societies, |c| &c.name) {
        cascade.select_society(society).await;
    }

    let block = first_listed(&cascade, "Blocks", |s| &s.blocks, |c| &c.name);
    let tower = first_listed(&cascade, "Towers", |s| &s.towers, |c| &c.name);
    match (block, tower) {
        (Some(block), _) => cascade.select_block(block).await,
        (None, Some(tower)) => cascade.select_tower(tower).await,
        (None, None) => {}
    }
    if let Some(flat) = first_listed(&cascade, "Flats", |s| &s.flats, |c| &c.name) {
        cascade.select_flat(flat);
    }

    while let Ok(event) = errors.try_recv() {
        println!("  ! {event:?}");
    }

    let address = address_from(&cascade.snapshot());
    println!("  Selected: {address}");
    address
}

fn first_listed<T: Clone>(
    cascade: &LocationCascade<InMemoryLocations>,
    heading: &str,
    list: impl Fn(&CascadeSnapshot) -> &Vec<T>,
    name: impl Fn(&T) -> &String,
) -> Option<T> {
    let snapshot = cascade.snapshot();
    let items = list(&snapshot);
    if items.is_empty() {
        return None;
    }
    let names: Vec<&str> = items.iter().map(|item| name(item).as_str()).collect();
    println!("  {heading:<10} {}", names.join(", "));
    items.first().cloned()
}

fn address_from(snapshot: &CascadeSnapshot) -> PropertyAddress {
    fn name_of<T>(item: &Option<T>, name: impl Fn(&T) -> &str) -> String {
        item.as_ref().map(|item| name(item).to_string()).unwrap_or_default()
    }

    let building = match (&snapshot.selected_block, &snapshot.selected_tower) {
        (Some(block), _) => block.name.clone(),
        (None, Some(tower)) => tower.name.clone(),
        (None, None) => String::new(),
    };
    PropertyAddress {
        country: name_of(&snapshot.selected_country, |c| c.name.as_str()),
        state: name_of(&snapshot.selected_state, |c| c.name.as_str()),
        city: name_of(&snapshot.selected_city, |c| c.name.as_str()),
        society: name_of(&snapshot.selected_society, |c| c.name.as_str()),
        building,
        flat_no: name_of(&snapshot.selected_flat, |c| c.name.as_str()),
    }
}

async fn walk_category_board(backend: &Backend) {
    println!("\nMaintenance categories");
    let board = CategoryBoard::new(Arc::clone(&backend.categories));
    report("fetch", &board.fetch_categories().await);
    render_categories("ascending", &board.snapshot().categories);

    board.toggle_sort_categories();
    render_categories("descending", &board.snapshot().categories);

    let last = board.snapshot().categories.len().saturating_sub(1);
    if board.move_category_up(last) {
        render_categories("after moving the last one up", &board.snapshot().categories);
    }
}

fn render_categories(heading: &str, categories: &[Category]) {
    println!("  {heading}:");
    for category in categories {
        println!(
            "    - {} [{}]",
            category.name,
            category.subcategories.join(", ")
        );
    }
}

async fn walk_property_desk(
    backend: &Backend,
    address: PropertyAddress,
) -> Option<society_care::property::PropertyId> {
    println!("\nProperties");
    let owner = AuthSession::new("owner-1", UserRole::Tenant);
    let owner_desk = PropertyDesk::new(Arc::clone(&backend.properties), owner);
    report(
        "owner submits",
        &owner_desk
            .add_property(NewProperty {
                address: address.clone(),
                tenant_id: Some(UserId("tenant-1".to_string())),
            })
            .await,
    );

    let submitted = owner_desk
        .snapshot()
        .properties
        .into_iter()
        .find(|property| property.address == address && property.status == PropertyStatus::PendingApproval)
        .map(|property| property.id);

    let manager = AuthSession::new("manager-1", UserRole::Manager);
    let manager_desk = PropertyDesk::new(Arc::clone(&backend.properties), manager);
    if let Some(id) = &submitted {
        report(
            "manager approves",
            &manager_desk
                .review_property(id.clone(), PropertyStatus::Active)
                .await,
        );
    }
    for property in manager_desk.snapshot().properties {
        println!(
            "  {:<10} {:<17} {}",
            property.id.0,
            property.status.label(),
            property.address
        );
    }
    submitted
}

async fn walk_maintenance(
    backend: &Backend,
    property_id: Option<society_care::property::PropertyId>,
    staff_id: UserId,
) {
    println!("\nMaintenance");
    let Some(property_id) = property_id else {
        println!("  no property to raise a request against");
        return;
    };

    let tenant = AuthSession::new("tenant-1", UserRole::Tenant);
    let tenant_desk = MaintenanceDesk::new(
        Arc::clone(&backend.requests),
        Arc::clone(&backend.users),
        tenant,
    );
    report(
        "tenant raises",
        &tenant_desk
            .add_request(NewMaintenanceRequest {
                property_id: property_id.clone(),
                category: "Plumbing".to_string(),
                subcategory: Some("Leak".to_string()),
                description: "Water seeping under the bathroom door".to_string(),
                priority: Priority::High,
            })
            .await,
    );
    let raised = tenant_desk
        .snapshot()
        .requests
        .into_iter()
        .find(|request| request.property_id == property_id)
        .map(|request| request.id);

    let manager = AuthSession::new("manager-1", UserRole::Manager);
    let manager_desk = MaintenanceDesk::new(
        Arc::clone(&backend.requests),
        Arc::clone(&backend.users),
        manager,
    );
    report("staff directory", &manager_desk.fetch_staff_directory().await);
    for profile in manager_desk.snapshot().staff {
        println!("    {} ({})", profile.name, profile.phone);
    }
    if let Some(id) = &raised {
        report(
            "manager assigns",
            &manager_desk.assign_worker(id.clone(), staff_id.clone()).await,
        );
    }

    let staff_desk = StaffDesk::new(
        Arc::clone(&backend.requests),
        AuthSession::new(staff_id.0.clone(), UserRole::Staff),
    );
    report(
        "staff queue",
        &staff_desk.fetch_assigned_requests(staff_id).await,
    );
    if let Some(id) = raised {
        report(
            "staff starts work",
            &staff_desk
                .update_status(id, RequestStatus::InProgress, Some("On site".to_string()))
                .await,
        );
    }

    let snapshot = staff_desk.snapshot();
    for request in &snapshot.requests {
        println!(
            "    {:<8} {:<12} {:<11} {}",
            request.id.0,
            request.property_id.0,
            request.status.label(),
            request.description
        );
    }
    println!("  Open requests per property:");
    for (property, count) in &snapshot.open_counts {
        println!("    {property:<12} {count}");
    }
}

fn report(step: &str, response: &Response<()>) {
    match response {
        Response::Success(()) => println!("  [ok] {step}"),
        Response::Error(message) => println!("  [failed] {step}: {message}"),
        Response::Loading => println!("  [pending] {step}"),
    }
}
