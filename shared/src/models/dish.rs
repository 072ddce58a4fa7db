//! Dish Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::category::CategoryRef;

/// Highest accepted dish price (1 000 000)
pub const MAX_DISH_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Dish entity (菜品)
///
/// `available` 控制公共菜单是否展示该菜品。价格使用 Decimal，
/// 序列化为 JSON 数字以兼容托管存储的 numeric 列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub is_offer: bool,
    pub created_at: DateTime<Utc>,

    // -- Relations (populated by `categories(name)` embeds) --
    #[serde(default, rename = "categories", skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl Dish {
    /// Embedded category name, if the read requested it
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// Embedded dish reference, as returned by `dishes(name, price)` embeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishRef {
    pub name: String,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
}

/// Create dish payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DishCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub is_offer: bool,
}

/// Update dish payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DishUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_offer: Option<bool>,
}
