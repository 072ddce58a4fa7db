//! Dining Table API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{DiningTableRepository, RepoError};
use crate::utils::{AppError, AppResult, ErrorCode, repo_error, validation_error};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

fn table_error(err: RepoError) -> AppError {
    repo_error(err, ErrorCode::TableNotFound, ErrorCode::TableNumberExists)
}

fn not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
        .with_detail("table_id", id)
}

/// GET /api/admin/tables - 按桌号排序
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    let repo = DiningTableRepository::new(state.store.clone());
    let tables = repo.find_all().await?;
    Ok(Json(tables))
}

/// GET /api/admin/tables/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let repo = DiningTableRepository::new(state.store.clone());
    let table = repo.find_by_id(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(table))
}

/// POST /api/admin/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    payload.validate().map_err(validation_error)?;

    let repo = DiningTableRepository::new(state.store.clone());
    let table = repo.create(payload).await.map_err(table_error)?;

    tracing::info!(
        table_id = %table.id,
        number = table.number,
        operator = %current_user.id,
        "Table created"
    );
    Ok(Json(table))
}

/// PUT /api/admin/tables/:id - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    payload.validate().map_err(validation_error)?;

    let repo = DiningTableRepository::new(state.store.clone());
    let table = repo.update(&id, payload).await.map_err(table_error)?;

    tracing::info!(table_id = %id, operator = %current_user.id, "Table updated");
    Ok(Json(table))
}

/// DELETE /api/admin/tables/:id - 删除桌台
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DiningTableRepository::new(state.store.clone());
    if !repo.delete(&id).await? {
        return Err(not_found(&id));
    }

    tracing::info!(table_id = %id, operator = %current_user.id, "Table deleted");
    Ok(Json(true))
}

/// POST /api/admin/tables/:id/toggle-status - libre ↔ ocupada
pub async fn toggle_status(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let repo = DiningTableRepository::new(state.store.clone());
    let table = repo.find_by_id(&id).await?.ok_or_else(|| not_found(&id))?;
    let table = repo
        .set_status(&id, table.status.toggled())
        .await
        .map_err(table_error)?;

    tracing::info!(
        table_id = %id,
        status = table.status.as_str(),
        operator = %current_user.id,
        "Table status toggled"
    );
    Ok(Json(table))
}
