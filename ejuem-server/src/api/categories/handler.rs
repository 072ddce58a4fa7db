//! Category API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{CategoryRepository, DishRepository};
use crate::utils::{AppError, AppResult, ErrorCode, repo_error, validation_error};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

fn category_error(err: crate::db::repository::RepoError) -> AppError {
    repo_error(err, ErrorCode::CategoryNotFound, ErrorCode::AlreadyExists)
}

fn not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
        .with_detail("category_id", id)
}

/// GET /api/admin/categories - 获取所有分类
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let repo = CategoryRepository::new(state.store.clone());
    let categories = repo.find_all().await?;
    Ok(Json(categories))
}

/// GET /api/admin/categories/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let repo = CategoryRepository::new(state.store.clone());
    let category = repo.find_by_id(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(category))
}

/// POST /api/admin/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    payload.validate().map_err(validation_error)?;

    let repo = CategoryRepository::new(state.store.clone());
    let category = repo.create(payload).await.map_err(category_error)?;

    tracing::info!(
        category_id = %category.id,
        name = %category.name,
        operator = %current_user.id,
        "Category created"
    );
    Ok(Json(category))
}

/// PUT /api/admin/categories/:id - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    payload.validate().map_err(validation_error)?;

    let repo = CategoryRepository::new(state.store.clone());
    let category = repo.update(&id, payload).await.map_err(category_error)?;

    tracing::info!(category_id = %id, operator = %current_user.id, "Category updated");
    Ok(Json(category))
}

/// DELETE /api/admin/categories/:id - 删除分类
///
/// 仍有菜品引用该分类时拒绝删除。
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CategoryRepository::new(state.store.clone());
    if repo.find_by_id(&id).await?.is_none() {
        return Err(not_found(&id));
    }

    let dishes = DishRepository::new(state.store.clone())
        .count_by_category(&id)
        .await?;
    if dishes > 0 {
        return Err(AppError::new(ErrorCode::CategoryHasDishes)
            .with_detail("category_id", id)
            .with_detail("dishes", dishes));
    }

    let deleted = repo.delete(&id).await?;
    tracing::info!(category_id = %id, operator = %current_user.id, "Category deleted");
    Ok(Json(deleted))
}
