use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::desk::{MaintenanceDesk, MaintenanceSnapshot};
use super::domain::{
    AssignedWorker, MaintenanceRequest, MaintenanceRequestId, NewMaintenanceRequest, Priority,
    RequestStatus,
};
use super::repository::MaintenanceRepository;
use super::staff::{StaffDesk, StaffSnapshot};
use crate::error::json_error;
use crate::property::PropertyId;
use crate::response::Response;
use crate::session::{AuthSession, UserId};
use crate::users::UserRepository;

/// Router state: the request store plus the user directory used for assignment.
pub struct MaintenanceState<R, U> {
    pub requests: Arc<R>,
    pub users: Arc<U>,
}

impl<R, U> Clone for MaintenanceState<R, U> {
    fn clone(&self) -> Self {
        Self {
            requests: Arc::clone(&self.requests),
            users: Arc::clone(&self.users),
        }
    }
}

impl<R, U> MaintenanceState<R, U>
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    fn desk(&self, session: AuthSession) -> MaintenanceDesk<R, U> {
        MaintenanceDesk::new(Arc::clone(&self.requests), Arc::clone(&self.users), session)
    }

    fn staff_desk(&self, session: AuthSession) -> StaffDesk<R> {
        StaffDesk::new(Arc::clone(&self.requests), session)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequestPayload {
    pub(crate) property_id: PropertyId,
    pub(crate) tenant_id: UserId,
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) subcategory: Option<String>,
    pub(crate) description: String,
    pub(crate) priority: Priority,
    pub(crate) status: RequestStatus,
    #[serde(default)]
    pub(crate) assigned_worker: Option<AssignedWorker>,
    #[serde(default)]
    pub(crate) notes: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignPayload {
    pub(crate) staff_id: UserId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusPayload {
    pub(crate) status: RequestStatus,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeskResponse<S> {
    pub(crate) result: Response<()>,
    #[serde(flatten)]
    pub(crate) desk: S,
}

pub fn maintenance_router<R, U>(requests: Arc<R>, users: Arc<U>) -> Router
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/maintenance",
            get(list_handler::<R, U>).post(add_handler::<R, U>),
        )
        .route(
            "/api/v1/maintenance/:request_id",
            put(update_handler::<R, U>).delete(delete_handler::<R, U>),
        )
        .route(
            "/api/v1/maintenance/:request_id/assign",
            post(assign_handler::<R, U>),
        )
        .route(
            "/api/v1/properties/:property_id/maintenance",
            get(property_list_handler::<R, U>),
        )
        .route("/api/v1/staff", get(directory_handler::<R, U>))
        .route(
            "/api/v1/staff/:staff_id/requests",
            get(assigned_handler::<R, U>),
        )
        .route(
            "/api/v1/staff/requests/:request_id/status",
            post(status_handler::<R, U>),
        )
        .with_state(MaintenanceState { requests, users })
}

fn respond<S: Serialize>(desk: S, result: Response<()>, created: bool) -> HttpResponse {
    let status = match (&result, created) {
        (Response::Error(_), _) => StatusCode::UNPROCESSABLE_ENTITY,
        (_, true) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    (status, Json(DeskResponse { result, desk })).into_response()
}

fn maintenance_response<R, U>(
    desk: &MaintenanceDesk<R, U>,
    result: Response<()>,
    created: bool,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let snapshot: MaintenanceSnapshot = desk.snapshot();
    respond(snapshot, result, created)
}

pub(crate) async fn list_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let desk = state.desk(session);
    let result = desk.fetch_requests().await;
    maintenance_response(&desk, result, false)
}

pub(crate) async fn property_list_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
    Path(property_id): Path<String>,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let desk = state.desk(session);
    let result = desk
        .fetch_property_requests(PropertyId(property_id))
        .await;
    maintenance_response(&desk, result, false)
}

pub(crate) async fn add_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
    Json(payload): Json<NewMaintenanceRequest>,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let desk = state.desk(session);
    let result = desk.add_request(payload).await;
    maintenance_response(&desk, result, true)
}

pub(crate) async fn update_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
    Path(request_id): Path<String>,
    Json(payload): Json<RequestPayload>,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let desk = state.desk(session);
    let request = MaintenanceRequest {
        id: MaintenanceRequestId(request_id),
        property_id: payload.property_id,
        tenant_id: payload.tenant_id,
        category: payload.category,
        subcategory: payload.subcategory,
        description: payload.description,
        priority: payload.priority,
        status: payload.status,
        assigned_worker: payload.assigned_worker,
        notes: payload.notes,
        created_at: payload.created_at,
    };
    let result = desk.update_request(request).await;
    maintenance_response(&desk, result, false)
}

pub(crate) async fn delete_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
    Path(request_id): Path<String>,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let desk = state.desk(session);
    let result = desk
        .delete_request(MaintenanceRequestId(request_id))
        .await;
    maintenance_response(&desk, result, false)
}

pub(crate) async fn assign_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
    Path(request_id): Path<String>,
    Json(payload): Json<AssignPayload>,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    if !session.is_manager() {
        return json_error(StatusCode::FORBIDDEN, "only managers may assign workers");
    }
    let desk = state.desk(session);
    let result = desk
        .assign_worker(MaintenanceRequestId(request_id), payload.staff_id)
        .await;
    maintenance_response(&desk, result, false)
}

pub(crate) async fn directory_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let desk = state.desk(session);
    let result = desk.fetch_staff_directory().await;
    maintenance_response(&desk, result, false)
}

pub(crate) async fn assigned_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
    Path(staff_id): Path<String>,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let staff_id = UserId(staff_id);
    if !session.is_manager() && session.user_id != staff_id {
        return json_error(
            StatusCode::FORBIDDEN,
            "staff may only list their own assignments",
        );
    }
    let desk = state.staff_desk(session);
    let result = desk.fetch_assigned_requests(staff_id).await;
    let snapshot: StaffSnapshot = desk.snapshot();
    respond(snapshot, result, false)
}

pub(crate) async fn status_handler<R, U>(
    State(state): State<MaintenanceState<R, U>>,
    session: AuthSession,
    Path(request_id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> HttpResponse
where
    R: MaintenanceRepository + 'static,
    U: UserRepository + 'static,
{
    let desk = state.staff_desk(session);
    let result = desk
        .update_status(
            MaintenanceRequestId(request_id),
            payload.status,
            payload.notes,
        )
        .await;
    let snapshot: StaffSnapshot = desk.snapshot();
    respond(snapshot, result, false)
}
