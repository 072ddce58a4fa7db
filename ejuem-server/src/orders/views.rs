//! Order views
//!
//! 顾客视图：自己的订单 + 当前角色可用的操作；
//! 管理视图：全部订单，可按状态过滤。读取失败返回空列表。

use serde::{Deserialize, Deserializer, Serialize};

use crate::db::repository::OrderRepository;
use shared::models::{Order, Role};
use shared::order::{OrderStatus, StatusAction, available_actions};

/// Order plus the actions the viewer may take on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub status_label: &'static str,
    pub actions: Vec<StatusAction>,
}

impl OrderView {
    pub fn new(order: Order, role: Role) -> Self {
        Self {
            status_label: order.status.label(),
            actions: available_actions(role, order.status),
            order,
        }
    }
}

pub fn with_actions(orders: Vec<Order>, role: Role) -> Vec<OrderView> {
    orders
        .into_iter()
        .map(|order| OrderView::new(order, role))
        .collect()
}

/// Admin status filter (`all` or a status value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "" | "all" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }

    pub fn apply(&self, orders: Vec<Order>) -> Vec<Order> {
        match self {
            Self::All => orders,
            Self::Only(status) => orders.into_iter().filter(|o| o.status == *status).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The caller's orders, newest first
pub async fn customer_orders(orders: &OrderRepository, user_id: &str) -> Vec<Order> {
    orders.find_by_user(user_id).await.unwrap_or_else(|e| {
        tracing::warn!(user_id = %user_id, error = %e, "Failed to load customer orders");
        Vec::new()
    })
}

/// Every order, newest first
pub async fn admin_orders(orders: &OrderRepository) -> Vec<Order> {
    orders.find_all().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load orders");
        Vec::new()
    })
}
