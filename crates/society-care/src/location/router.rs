use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tracing::info;

use super::domain::{BuildingRef, LocationId, LocationLevel};
use super::import::{LocationImportError, LocationImporter};
use super::repository::LocationRepository;
use crate::error::json_error;
use crate::session::AuthSession;

/// Browsing of the location tree plus manager-only CSV import and node removal.
pub fn location_router<R>(repository: Arc<R>) -> Router
where
    R: LocationRepository + 'static,
{
    Router::new()
        .route("/api/v1/locations/countries", get(countries_handler::<R>))
        .route(
            "/api/v1/locations/countries/:country_id/states",
            get(states_handler::<R>),
        )
        .route(
            "/api/v1/locations/states/:state_id/cities",
            get(cities_handler::<R>),
        )
        .route(
            "/api/v1/locations/cities/:city_id/societies",
            get(societies_handler::<R>),
        )
        .route(
            "/api/v1/locations/societies/:society_id/buildings",
            get(buildings_handler::<R>),
        )
        .route(
            "/api/v1/locations/blocks/:block_id/flats",
            get(block_flats_handler::<R>),
        )
        .route(
            "/api/v1/locations/towers/:tower_id/flats",
            get(tower_flats_handler::<R>),
        )
        .route("/api/v1/locations/import", post(import_handler::<R>))
        .route(
            "/api/v1/locations/nodes/:level/:location_id",
            delete(remove_handler::<R>),
        )
        .with_state(repository)
}

pub(crate) async fn countries_handler<R>(State(repository): State<Arc<R>>) -> Response
where
    R: LocationRepository + 'static,
{
    match repository.countries().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn states_handler<R>(
    State(repository): State<Arc<R>>,
    Path(country_id): Path<LocationId>,
) -> Response
where
    R: LocationRepository + 'static,
{
    match repository.states(country_id).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn cities_handler<R>(
    State(repository): State<Arc<R>>,
    Path(state_id): Path<LocationId>,
) -> Response
where
    R: LocationRepository + 'static,
{
    match repository.cities(state_id).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn societies_handler<R>(
    State(repository): State<Arc<R>>,
    Path(city_id): Path<LocationId>,
) -> Response
where
    R: LocationRepository + 'static,
{
    match repository.societies(city_id).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn buildings_handler<R>(
    State(repository): State<Arc<R>>,
    Path(society_id): Path<LocationId>,
) -> Response
where
    R: LocationRepository + 'static,
{
    let (blocks, towers) = tokio::join!(
        repository.blocks(society_id),
        repository.towers(society_id)
    );
    match (blocks, towers) {
        (Ok(blocks), Ok(towers)) => {
            let payload = json!({ "blocks": blocks, "towers": towers });
            (StatusCode::OK, Json(payload)).into_response()
        }
        (Err(err), _) | (_, Err(err)) => err.into_response(),
    }
}

pub(crate) async fn block_flats_handler<R>(
    State(repository): State<Arc<R>>,
    Path(block_id): Path<LocationId>,
) -> Response
where
    R: LocationRepository + 'static,
{
    flats_response(repository.as_ref(), BuildingRef::Block(block_id)).await
}

pub(crate) async fn tower_flats_handler<R>(
    State(repository): State<Arc<R>>,
    Path(tower_id): Path<LocationId>,
) -> Response
where
    R: LocationRepository + 'static,
{
    flats_response(repository.as_ref(), BuildingRef::Tower(tower_id)).await
}

async fn flats_response<R>(repository: &R, building: BuildingRef) -> Response
where
    R: LocationRepository + 'static,
{
    match repository.flats(building).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn import_handler<R>(
    State(repository): State<Arc<R>>,
    session: AuthSession,
    body: String,
) -> Response
where
    R: LocationRepository + 'static,
{
    if !session.is_manager() {
        return json_error(StatusCode::FORBIDDEN, "only managers may import locations");
    }

    let nodes = match LocationImporter::from_reader(Cursor::new(body.into_bytes())) {
        Ok(nodes) => nodes,
        Err(err) => return json_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
    };

    match LocationImporter::import_into(repository.as_ref(), nodes).await {
        Ok(summary) => {
            info!(user = %session.user_id, total = summary.total(), "location import stored");
            (StatusCode::CREATED, Json(summary)).into_response()
        }
        Err(LocationImportError::Repository(err)) => err.into_response(),
        Err(other) => json_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// Removes a single node. Children are left in place and stop being reachable
/// through the picker once their parent is gone.
pub(crate) async fn remove_handler<R>(
    State(repository): State<Arc<R>>,
    session: AuthSession,
    Path((raw_level, location_id)): Path<(String, LocationId)>,
) -> Response
where
    R: LocationRepository + 'static,
{
    if !session.is_manager() {
        return json_error(StatusCode::FORBIDDEN, "only managers may remove locations");
    }
    let Some(level) = LocationLevel::parse(&raw_level) else {
        return json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("unknown location level `{raw_level}`"),
        );
    };

    match repository.remove(level, location_id).await {
        Ok(()) => {
            info!(user = %session.user_id, level = %level, id = location_id, "location removed");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => err.into_response(),
    }
}
