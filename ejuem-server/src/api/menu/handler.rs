//! Public Menu Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::services::{CategoryFilter, catalog};
use shared::models::{Category, Dish};

#[derive(Debug, Default, Deserialize)]
pub struct DishQuery {
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default)]
    pub offers: bool,
}

/// GET /api/menu/categories
pub async fn categories(State(state): State<ServerState>) -> Json<Vec<Category>> {
    Json(state.catalog().load_categories().await)
}

/// GET /api/menu/dishes?category=all|<id>
pub async fn dishes(
    State(state): State<ServerState>,
    Query(query): Query<DishQuery>,
) -> Json<Vec<Dish>> {
    let dishes = state.catalog().load_dishes().await;
    let mut dishes = catalog::filter(&dishes, &query.category);
    if query.offers {
        dishes = catalog::offers(&dishes);
    }
    Json(dishes)
}
