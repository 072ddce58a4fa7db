//! Catalog Reader
//!
//! 公共菜单的读取：分类、上架菜品以及按分类过滤。
//! 读取失败时返回空列表并记录警告，不向调用方暴露错误。

use serde::{Deserialize, Deserializer};
use std::sync::Arc;

use crate::db::RecordStore;
use crate::db::repository::{CategoryRepository, DishRepository};
use shared::models::{Category, Dish};

/// Category filter used by the public menu
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// 不过滤 (`"all"`)
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "all" => Self::All,
            id => Self::Category(id.to_string()),
        }
    }

    fn matches(&self, dish: &Dish) -> bool {
        match self {
            Self::All => true,
            Self::Category(id) => dish.category_id.as_deref() == Some(id.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Keep the dishes matching `filter`, preserving order
pub fn filter(dishes: &[Dish], filter: &CategoryFilter) -> Vec<Dish> {
    dishes.iter().filter(|d| filter.matches(d)).cloned().collect()
}

/// Dishes flagged as offers
pub fn offers(dishes: &[Dish]) -> Vec<Dish> {
    dishes.iter().filter(|d| d.is_offer).cloned().collect()
}

#[derive(Clone)]
pub struct CatalogService {
    categories: CategoryRepository,
    dishes: DishRepository,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            categories: CategoryRepository::new(store.clone()),
            dishes: DishRepository::new(store),
        }
    }

    /// All categories, unfiltered
    pub async fn load_categories(&self) -> Vec<Category> {
        self.categories.find_all().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load categories");
            Vec::new()
        })
    }

    /// Available dishes with their category name
    pub async fn load_dishes(&self) -> Vec<Dish> {
        self.dishes.find_available().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load dishes");
            Vec::new()
        })
    }
}
