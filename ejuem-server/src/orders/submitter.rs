//! Order Submitter
//!
//! 购物车 + 配送方式 → 一行订单 + 每个购物车行一行订单项。
//!
//! 托管存储不提供多表事务，因此订单项写入失败时会尝试删除已插入的订单行，
//! 调用方看到的结果是"两者都有或都没有"。补偿本身失败时记录孤儿订单 ID。
//! 任何失败都不会清空购物车。

use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::db::RecordStore;
use crate::db::repository::OrderRepository;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{NewOrder, NewOrderItem, Order, OrderType};
use shared::order::{Cart, OrderStatus};

#[derive(Clone)]
pub struct OrderSubmitter {
    orders: OrderRepository,
}

impl OrderSubmitter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            orders: OrderRepository::new(store),
        }
    }

    /// Persist `cart` as a new order for `user`, clearing the cart on success
    pub async fn submit(
        &self,
        user: Option<&CurrentUser>,
        cart: &mut Cart,
        order_type: OrderType,
    ) -> AppResult<Order> {
        let Some(user) = user else {
            security_log!("WARN", "checkout_unauthenticated", items = cart.item_count());
            return Err(AppError::unauthorized());
        };
        if cart.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let new_order = NewOrder {
            user_id: user.id.clone(),
            order_type,
            status: OrderStatus::Pendiente,
            total_price: cart.total(),
        };

        let mut order = self.orders.insert_order(&new_order).await.map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Order insert failed");
            AppError::with_message(ErrorCode::OrderCreateFailed, e.to_string())
        })?;

        let items: Vec<NewOrderItem> = cart
            .lines()
            .iter()
            .map(|line| NewOrderItem {
                order_id: order.id.clone(),
                dish_id: line.dish_id.clone(),
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        match self.orders.insert_items(&items).await {
            Ok(inserted) => {
                order.order_items = inserted;
            }
            Err(item_err) => return Err(self.compensate(&order, item_err.to_string()).await),
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %user.id,
            order_type = %order.order_type,
            total = %order.total_price,
            lines = order.order_items.len(),
            "Order submitted"
        );
        cart.clear();
        Ok(order)
    }

    /// Undo the order row after its items failed to persist
    async fn compensate(&self, order: &Order, cause: String) -> AppError {
        tracing::warn!(order_id = %order.id, error = %cause, "Order items insert failed, rolling back order");

        match self.orders.delete_order(&order.id).await {
            Ok(_) => AppError::with_message(ErrorCode::OrderCreateFailed, cause),
            Err(rollback_err) => {
                tracing::error!(
                    order_id = %order.id,
                    error = %rollback_err,
                    "Compensating delete failed, order row left without items"
                );
                AppError::with_message(ErrorCode::OrderPartiallyPersisted, cause)
                    .with_detail("order_id", order.id.clone())
            }
        }
    }
}
