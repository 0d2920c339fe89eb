use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::board::{CategoryBoard, CategorySnapshot};
use super::domain::{Category, CategoryId, NewCategory};
use super::repository::CategoryRepository;
use crate::error::json_error;
use crate::response::Response;
use crate::session::AuthSession;

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryPayload {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) subcategories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubcategoryPayload {
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BoardResponse {
    pub(crate) result: Response<()>,
    #[serde(flatten)]
    pub(crate) board: CategorySnapshot,
}

pub fn category_router<R>(board: Arc<CategoryBoard<R>>) -> Router
where
    R: CategoryRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/categories",
            get(list_handler::<R>).post(add_handler::<R>),
        )
        .route(
            "/api/v1/categories/:category_id",
            put(update_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/categories/:category_id/subcategories",
            axum::routing::post(add_subcategory_handler::<R>),
        )
        .route(
            "/api/v1/categories/:category_id/subcategories/:name",
            put(rename_subcategory_handler::<R>).delete(delete_subcategory_handler::<R>),
        )
        .with_state(board)
}

fn board_response<R>(board: &CategoryBoard<R>, result: Response<()>, created: bool) -> HttpResponse
where
    R: CategoryRepository + 'static,
{
    let status = match (&result, created) {
        (Response::Error(_), _) => StatusCode::UNPROCESSABLE_ENTITY,
        (_, true) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    let body = BoardResponse {
        result,
        board: board.snapshot(),
    };
    (status, Json(body)).into_response()
}

fn require_manager(session: &AuthSession) -> Result<(), HttpResponse> {
    if session.is_manager() {
        Ok(())
    } else {
        Err(json_error(
            StatusCode::FORBIDDEN,
            "only managers may change categories",
        ))
    }
}

pub(crate) async fn list_handler<R>(State(board): State<Arc<CategoryBoard<R>>>) -> HttpResponse
where
    R: CategoryRepository + 'static,
{
    let result = board.fetch_categories().await;
    board_response(&board, result, false)
}

pub(crate) async fn add_handler<R>(
    State(board): State<Arc<CategoryBoard<R>>>,
    session: AuthSession,
    Json(payload): Json<CategoryPayload>,
) -> HttpResponse
where
    R: CategoryRepository + 'static,
{
    if let Err(rejection) = require_manager(&session) {
        return rejection;
    }
    let result = board
        .add_category(NewCategory {
            name: payload.name,
            subcategories: payload.subcategories,
        })
        .await;
    board_response(&board, result, true)
}

pub(crate) async fn update_handler<R>(
    State(board): State<Arc<CategoryBoard<R>>>,
    session: AuthSession,
    Path(category_id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> HttpResponse
where
    R: CategoryRepository + 'static,
{
    if let Err(rejection) = require_manager(&session) {
        return rejection;
    }
    let result = board
        .update_category(Category {
            id: CategoryId(category_id),
            name: payload.name,
            subcategories: payload.subcategories,
        })
        .await;
    board_response(&board, result, false)
}

pub(crate) async fn delete_handler<R>(
    State(board): State<Arc<CategoryBoard<R>>>,
    session: AuthSession,
    Path(category_id): Path<String>,
) -> HttpResponse
where
    R: CategoryRepository + 'static,
{
    if let Err(rejection) = require_manager(&session) {
        return rejection;
    }
    let result = board.delete_category(CategoryId(category_id)).await;
    board_response(&board, result, false)
}

pub(crate) async fn add_subcategory_handler<R>(
    State(board): State<Arc<CategoryBoard<R>>>,
    session: AuthSession,
    Path(category_id): Path<String>,
    Json(payload): Json<SubcategoryPayload>,
) -> HttpResponse
where
    R: CategoryRepository + 'static,
{
    if let Err(rejection) = require_manager(&session) {
        return rejection;
    }
    let result = board
        .add_subcategory(CategoryId(category_id), &payload.name)
        .await;
    board_response(&board, result, true)
}

pub(crate) async fn rename_subcategory_handler<R>(
    State(board): State<Arc<CategoryBoard<R>>>,
    session: AuthSession,
    Path((category_id, name)): Path<(String, String)>,
    Json(payload): Json<SubcategoryPayload>,
) -> HttpResponse
where
    R: CategoryRepository + 'static,
{
    if let Err(rejection) = require_manager(&session) {
        return rejection;
    }
    let result = board
        .update_subcategory(CategoryId(category_id), &name, &payload.name)
        .await;
    board_response(&board, result, false)
}

pub(crate) async fn delete_subcategory_handler<R>(
    State(board): State<Arc<CategoryBoard<R>>>,
    session: AuthSession,
    Path((category_id, name)): Path<(String, String)>,
) -> HttpResponse
where
    R: CategoryRepository + 'static,
{
    if let Err(rejection) = require_manager(&session) {
        return rejection;
    }
    let result = board
        .delete_subcategory(CategoryId(category_id), &name)
        .await;
    board_response(&board, result, false)
}
