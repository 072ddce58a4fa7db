//! Cart Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::DishRepository;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{CheckoutRequest, Order};
use shared::order::{Cart, CartLine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub id: String,
    pub lines: Vec<CartLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub item_count: i64,
}

impl CartResponse {
    fn from_cart(id: String, cart: &Cart) -> Self {
        Self {
            id,
            lines: cart.lines().to_vec(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub dish_id: String,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub delta: i32,
}

fn cart_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::CartNotFound, format!("Cart {id} not found"))
        .with_detail("cart_id", id)
}

fn respond(id: String, cart: Option<Cart>) -> AppResult<Json<CartResponse>> {
    match cart {
        Some(cart) => Ok(Json(CartResponse::from_cart(id, &cart))),
        None => Err(cart_not_found(&id)),
    }
}

/// POST /api/carts - 创建空购物车
pub async fn create(State(state): State<ServerState>) -> Json<CartResponse> {
    let id = state.carts.create();
    tracing::debug!(cart_id = %id, "Cart created");
    Json(CartResponse::from_cart(id, &Cart::new()))
}

/// GET /api/carts/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CartResponse>> {
    let cart = state.carts.get(&id);
    respond(id, cart)
}

/// DELETE /api/carts/:id - 丢弃购物车
pub async fn discard(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    if !state.carts.discard(&id) {
        return Err(cart_not_found(&id));
    }
    Ok(Json(true))
}

/// POST /api/carts/:id/items - 加入一份菜品
///
/// 菜品必须存在且已上架；价格在首次加入时快照。
pub async fn add_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> AppResult<Json<CartResponse>> {
    if state.carts.get(&id).is_none() {
        return Err(cart_not_found(&id));
    }

    let dish = DishRepository::new(state.store.clone())
        .find_by_id(&req.dish_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::DishNotFound, format!("Dish {} not found", req.dish_id))
                .with_detail("dish_id", req.dish_id.clone())
        })?;

    if !dish.available {
        return Err(AppError::new(ErrorCode::DishUnavailable).with_detail("dish_id", dish.id));
    }

    let cart = state.carts.add(&id, &dish);
    respond(id, cart)
}

/// PATCH /api/carts/:id/items/:dish_id - 调整数量 (结果 ≤ 0 移除该行)
pub async fn update_quantity(
    State(state): State<ServerState>,
    Path((id, dish_id)): Path<(String, String)>,
    Json(req): Json<QuantityRequest>,
) -> AppResult<Json<CartResponse>> {
    let cart = state.carts.update_quantity(&id, &dish_id, req.delta);
    respond(id, cart)
}

/// DELETE /api/carts/:id/items/:dish_id
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((id, dish_id)): Path<(String, String)>,
) -> AppResult<Json<CartResponse>> {
    let cart = state.carts.remove(&id, &dish_id);
    respond(id, cart)
}

/// POST /api/carts/:id/checkout - 下单
///
/// 缺少令牌时以 NotAuthenticated 拒绝；令牌无效或过期返回对应的令牌错误。
/// 失败时购物车保持不变；成功时移除已提交的行。
pub async fn checkout(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    auth: Result<CurrentUser, AppError>,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<Order>> {
    let user = match auth {
        Ok(user) => Some(user),
        Err(e) if e.code == ErrorCode::NotAuthenticated => None,
        Err(e) => return Err(e),
    };

    let submitted = state.carts.get(&id).ok_or_else(|| cart_not_found(&id))?;
    let mut cart = submitted.clone();

    let order = state
        .submitter()
        .submit(user.as_ref(), &mut cart, req.order_type)
        .await?;

    // 只扣除已下单的数量，结账期间加入的菜品留在购物车里
    state.carts.settle(&id, &submitted);
    Ok(Json(order))
}
