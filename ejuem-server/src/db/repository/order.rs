//! Order Repository
//!
//! 订单与订单项的读写。订单项只在提交时批量插入，之后不会修改。

use std::sync::Arc;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::{Direction, Embed, Filter, Query, RecordStore, decode_first, decode_rows, tables};
use shared::models::{NewOrder, NewOrderItem, Order, OrderItem};
use shared::order::OrderStatus;

const TABLE: &str = tables::ORDERS;

/// Projection used by the customer order view
fn customer_view() -> Query {
    Query::new().embed(
        Embed::new(tables::ORDER_ITEMS)
            .embed(Embed::new(tables::DISHES).columns(["name", "price"])),
    )
}

/// Projection used by the admin order view
fn admin_view() -> Query {
    Query::new()
        .embed(Embed::new(tables::ORDER_ITEMS).embed(Embed::new(tables::DISHES).columns(["name"])))
        .embed(Embed::new(tables::USERS).columns(["name", "email"]))
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    /// Insert the order row
    pub async fn insert_order(&self, order: &NewOrder) -> RepoResult<Order> {
        let rows = self
            .base
            .store()
            .insert(TABLE, vec![serde_json::to_value(order)?])
            .await?;
        decode_first(rows)?
            .ok_or_else(|| RepoError::Validation("Store returned no order row".into()))
    }

    /// Batch insert the order items
    pub async fn insert_items(&self, items: &[NewOrderItem]) -> RepoResult<Vec<OrderItem>> {
        let rows = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        let inserted = self
            .base
            .store()
            .insert(tables::ORDER_ITEMS, rows)
            .await?;
        Ok(decode_rows(inserted)?)
    }

    /// Remove an order row (compensation only)
    pub async fn delete_order(&self, id: &str) -> RepoResult<bool> {
        let removed = self
            .base
            .store()
            .delete(TABLE, &[Filter::eq("id", id)])
            .await?;
        Ok(!removed.is_empty())
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rows = self
            .base
            .store()
            .select(TABLE, &customer_view().eq("id", id))
            .await?;
        Ok(decode_first(rows)?)
    }

    /// Orders placed by `user_id`, newest first
    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let query = customer_view()
            .eq("user_id", user_id)
            .order_by("created_at", Direction::Desc);
        let rows = self.base.store().select(TABLE, &query).await?;
        Ok(decode_rows(rows)?)
    }

    /// Every order, newest first, with customer name/email
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let query = admin_view().order_by("created_at", Direction::Desc);
        let rows = self.base.store().select(TABLE, &query).await?;
        Ok(decode_rows(rows)?)
    }

    /// Compare-and-swap status update
    ///
    /// 仅当当前状态仍为 `expected` 时写入；返回 `None` 表示没有行被更新。
    pub async fn compare_and_set_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        let rows = self
            .base
            .store()
            .update(
                TABLE,
                &[
                    Filter::eq("id", id),
                    Filter::eq("status", expected.as_str()),
                ],
                serde_json::json!({ "status": next }),
            )
            .await?;
        Ok(decode_first(rows)?)
    }
}
