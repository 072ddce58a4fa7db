//! Dish API Handlers
//!
//! 管理视图包含未上架的菜品；价格必须在 0..=MAX_DISH_PRICE 内，分类 (如有) 必须存在。

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{CategoryRepository, DishRepository, RepoError};
use crate::utils::{AppError, AppResult, ErrorCode, repo_error, validation_error};
use shared::models::{Dish, DishCreate, DishUpdate, MAX_DISH_PRICE};

fn dish_error(err: RepoError) -> AppError {
    repo_error(err, ErrorCode::DishNotFound, ErrorCode::AlreadyExists)
}

fn not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::DishNotFound, format!("Dish {id} not found"))
        .with_detail("dish_id", id)
}

fn check_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO || price > MAX_DISH_PRICE {
        return Err(AppError::new(ErrorCode::DishInvalidPrice)
            .with_detail("price", price.to_string())
            .with_detail("max", MAX_DISH_PRICE.to_string()));
    }
    Ok(())
}

async fn check_category(state: &ServerState, category_id: Option<&str>) -> AppResult<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    let exists = CategoryRepository::new(state.store.clone())
        .find_by_id(category_id)
        .await?
        .is_some();
    if !exists {
        return Err(AppError::with_message(
            ErrorCode::CategoryNotFound,
            format!("Category {category_id} not found"),
        )
        .with_detail("category_id", category_id));
    }
    Ok(())
}

/// GET /api/admin/dishes - 全部菜品 (含未上架)，按创建时间倒序
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Dish>>> {
    let repo = DishRepository::new(state.store.clone());
    let dishes = repo.find_all().await?;
    Ok(Json(dishes))
}

/// GET /api/admin/dishes/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Dish>> {
    let repo = DishRepository::new(state.store.clone());
    let dish = repo.find_by_id(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(dish))
}

/// POST /api/admin/dishes - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<DishCreate>,
) -> AppResult<Json<Dish>> {
    payload.validate().map_err(validation_error)?;
    check_price(payload.price)?;
    check_category(&state, payload.category_id.as_deref()).await?;

    let repo = DishRepository::new(state.store.clone());
    let dish = repo.create(payload).await.map_err(dish_error)?;

    tracing::info!(
        dish_id = %dish.id,
        name = %dish.name,
        price = %dish.price,
        operator = %current_user.id,
        "Dish created"
    );
    Ok(Json(dish))
}

/// PUT /api/admin/dishes/:id - 更新菜品
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<DishUpdate>,
) -> AppResult<Json<Dish>> {
    payload.validate().map_err(validation_error)?;
    if let Some(price) = payload.price {
        check_price(price)?;
    }
    check_category(&state, payload.category_id.as_deref()).await?;

    let repo = DishRepository::new(state.store.clone());
    let dish = repo.update(&id, payload).await.map_err(dish_error)?;

    tracing::info!(dish_id = %id, operator = %current_user.id, "Dish updated");
    Ok(Json(dish))
}

/// DELETE /api/admin/dishes/:id - 删除菜品
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DishRepository::new(state.store.clone());
    if !repo.delete(&id).await? {
        return Err(not_found(&id));
    }

    tracing::info!(dish_id = %id, operator = %current_user.id, "Dish deleted");
    Ok(Json(true))
}

/// POST /api/admin/dishes/:id/toggle-available - 上架 / 下架
pub async fn toggle_available(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Dish>> {
    let repo = DishRepository::new(state.store.clone());
    let dish = repo.find_by_id(&id).await?.ok_or_else(|| not_found(&id))?;
    let dish = repo
        .set_available(&id, !dish.available)
        .await
        .map_err(dish_error)?;

    tracing::info!(
        dish_id = %id,
        available = dish.available,
        operator = %current_user.id,
        "Dish availability toggled"
    );
    Ok(Json(dish))
}
