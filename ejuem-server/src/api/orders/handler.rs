//! Order Handlers

use std::convert::Infallible;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
};
use futures::Stream;
use serde::Deserialize;

use super::stream::{FeedGuard, order_events};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::OrderRepository;
use crate::orders::views::{self, OrderView, StatusFilter};
use crate::utils::AppResult;
use shared::models::StatusChangeRequest;

#[derive(Debug, Default, Deserialize)]
pub struct AdminOrderQuery {
    #[serde(default)]
    pub status: StatusFilter,
}

/// GET /api/orders - 当前用户的订单，按创建时间倒序
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<Vec<OrderView>> {
    let repo = OrderRepository::new(state.store.clone());
    let orders = views::customer_orders(&repo, &user.id).await;
    Json(views::with_actions(orders, user.role))
}

/// GET /api/orders/stream - 当前用户订单的 SSE 推送
///
/// 每个连接一个推送任务，连接断开时停止。
pub async fn stream_mine(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let feed = state.customer_feed(&user.id);
    tracing::debug!(user_id = %user.id, "Customer order stream opened");

    let rx = feed.subscribe();
    order_events(rx, user.role, StatusFilter::All, Some(FeedGuard::new(feed)))
}

/// PUT /api/orders/:id/status - 状态变更 (CAS)
pub async fn change_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<StatusChangeRequest>,
) -> AppResult<Json<OrderView>> {
    let order = state.lifecycle().change_status(&user, &id, req.status).await?;
    Ok(Json(OrderView::new(order, user.role)))
}

/// GET /api/admin/orders?status= - 全部订单
pub async fn list_all(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AdminOrderQuery>,
) -> Json<Vec<OrderView>> {
    let repo = OrderRepository::new(state.store.clone());
    let orders = query.status.apply(views::admin_orders(&repo).await);
    Json(views::with_actions(orders, user.role))
}

/// GET /api/admin/orders/stream?status= - 管理视图推送，共享同一个后台任务
pub async fn stream_all(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AdminOrderQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    order_events(state.admin_feed.subscribe(), user.role, query.status, None)
}
