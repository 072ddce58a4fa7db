//! Order Lifecycle Manager
//!
//! 状态变更以比较并交换 (CAS) 写入：`update` 同时按 `id` 和期望的旧状态过滤。
//! 没有行被更新时重新读取，区分订单不存在与并发冲突。

use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::db::RecordStore;
use crate::db::repository::OrderRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::Order;
use shared::order::OrderStatus;

#[derive(Clone)]
pub struct OrderLifecycle {
    orders: OrderRepository,
}

fn order_not_found(order_id: &str) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
        .with_detail("order_id", order_id)
}

impl OrderLifecycle {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            orders: OrderRepository::new(store),
        }
    }

    /// Move `order_id` to `target` on behalf of `user`
    ///
    /// | 情况 | 错误码 |
    /// |------|--------|
    /// | 角色为 cliente | StaffRequired |
    /// | 订单不存在 | OrderNotFound |
    /// | 非法转移 (含终态) | InvalidTransition |
    /// | 并发修改 | StatusConflict |
    pub async fn change_status(
        &self,
        user: &CurrentUser,
        order_id: &str,
        target: OrderStatus,
    ) -> AppResult<Order> {
        if !user.is_staff() {
            security_log!(
                "WARN",
                "status_change_denied",
                user_id = user.id.clone(),
                order_id = order_id
            );
            return Err(AppError::new(ErrorCode::StaffRequired));
        }

        let current = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))?;

        if !current.status.can_transition_to(target) {
            return Err(AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Cannot move order from {} to {}", current.status, target),
            )
            .with_detail("from", current.status.as_str())
            .with_detail("to", target.as_str()));
        }

        let swapped = self
            .orders
            .compare_and_set_status(order_id, current.status, target)
            .await?;

        if swapped.is_none() {
            return Err(match self.orders.find_by_id(order_id).await? {
                None => order_not_found(order_id),
                Some(now) => {
                    tracing::warn!(
                        order_id = %order_id,
                        expected = %current.status,
                        actual = %now.status,
                        "Order status changed concurrently"
                    );
                    AppError::new(ErrorCode::StatusConflict)
                        .with_detail("expected", current.status.as_str())
                        .with_detail("actual", now.status.as_str())
                }
            });
        }

        tracing::info!(
            order_id = %order_id,
            from = %current.status,
            to = %target,
            by = %user.id,
            "Order status changed"
        );

        // 重新读取以带上订单项
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }
}
