//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::dish::DishRef;
use super::user::UserRef;
use crate::order::OrderStatus;

/// Delivery type chosen at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// 外带
    #[default]
    ParaLlevar,
    /// 到店自取
    Recojer,
    /// 配送
    Transporte,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParaLlevar => "para_llevar",
            Self::Recojer => "recojer",
            Self::Transporte => "transporte",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ParaLlevar => "Para Llevar",
            Self::Recojer => "Recoger",
            Self::Transporte => "Transporte",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "para_llevar" => Ok(Self::ParaLlevar),
            "recojer" => Ok(Self::Recojer),
            "transporte" => Ok(Self::Transporte),
            other => Err(format!("unknown order type: {other}")),
        }
    }
}

/// Order item row (`order_items` table)
///
/// `price` 是下单时的单价快照，之后菜品改价不影响已下订单。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub dish_id: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    // -- Relations --
    #[serde(default, rename = "dishes", skip_serializing_if = "Option::is_none")]
    pub dish: Option<DishRef>,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order row (`orders` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type", default)]
    pub order_type: OrderType,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,

    // -- Relations --
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default, rename = "users", skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
}

impl Order {
    /// Σ(item.price × item.quantity) over the embedded items
    pub fn items_total(&self) -> Decimal {
        self.order_items.iter().map(OrderItem::subtotal).sum()
    }
}

/// Insert payload for an order row
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// Insert payload for an order item row
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
    pub order_id: String,
    pub dish_id: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Checkout payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(rename = "type", default)]
    pub order_type: OrderType,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: OrderStatus,
}
