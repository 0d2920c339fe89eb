use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::desk::{PropertyDesk, PropertySnapshot};
use super::domain::{NewProperty, Property, PropertyAddress, PropertyId, PropertyStatus};
use super::repository::PropertyRepository;
use crate::response::Response;
use crate::session::{AuthSession, UserId};

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyPayload {
    pub(crate) address: PropertyAddress,
    pub(crate) status: PropertyStatus,
    pub(crate) owner_id: UserId,
    #[serde(default)]
    pub(crate) tenant_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewPayload {
    pub(crate) status: PropertyStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeskResponse {
    pub(crate) result: Response<()>,
    #[serde(flatten)]
    pub(crate) desk: PropertySnapshot,
}

pub fn property_router<R>(repository: Arc<R>) -> Router
where
    R: PropertyRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties",
            get(list_handler::<R>).post(add_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id",
            put(update_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/properties/:property_id/review",
            post(review_handler::<R>),
        )
        .with_state(repository)
}

fn desk_response<R>(desk: &PropertyDesk<R>, result: Response<()>, created: bool) -> HttpResponse
where
    R: PropertyRepository + 'static,
{
    let status = match (&result, created) {
        (Response::Error(_), _) => StatusCode::UNPROCESSABLE_ENTITY,
        (_, true) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    let body = DeskResponse {
        result,
        desk: desk.snapshot(),
    };
    (status, Json(body)).into_response()
}

pub(crate) async fn list_handler<R>(
    State(repository): State<Arc<R>>,
    session: AuthSession,
) -> HttpResponse
where
    R: PropertyRepository + 'static,
{
    let desk = PropertyDesk::new(repository, session);
    let result = desk.fetch_properties().await;
    desk_response(&desk, result, false)
}

pub(crate) async fn add_handler<R>(
    State(repository): State<Arc<R>>,
    session: AuthSession,
    Json(payload): Json<NewProperty>,
) -> HttpResponse
where
    R: PropertyRepository + 'static,
{
    let desk = PropertyDesk::new(repository, session);
    let result = desk.add_property(payload).await;
    desk_response(&desk, result, true)
}

pub(crate) async fn update_handler<R>(
    State(repository): State<Arc<R>>,
    session: AuthSession,
    Path(property_id): Path<String>,
    Json(payload): Json<PropertyPayload>,
) -> HttpResponse
where
    R: PropertyRepository + 'static,
{
    let desk = PropertyDesk::new(repository, session);
    let property = Property {
        id: PropertyId(property_id),
        address: payload.address,
        status: payload.status,
        owner_id: payload.owner_id,
        tenant_id: payload.tenant_id,
    };
    let result = desk.update_property(property).await;
    desk_response(&desk, result, false)
}

pub(crate) async fn delete_handler<R>(
    State(repository): State<Arc<R>>,
    session: AuthSession,
    Path(property_id): Path<String>,
) -> HttpResponse
where
    R: PropertyRepository + 'static,
{
    let desk = PropertyDesk::new(repository, session);
    let result = desk.delete_property(PropertyId(property_id)).await;
    desk_response(&desk, result, false)
}

pub(crate) async fn review_handler<R>(
    State(repository): State<Arc<R>>,
    session: AuthSession,
    Path(property_id): Path<String>,
    Json(payload): Json<ReviewPayload>,
) -> HttpResponse
where
    R: PropertyRepository + 'static,
{
    let desk = PropertyDesk::new(repository, session);
    let result = desk
        .review_property(PropertyId(property_id), payload.status)
        .await;
    desk_response(&desk, result, false)
}
