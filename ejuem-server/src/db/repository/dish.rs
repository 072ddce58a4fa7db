//! Dish Repository

use std::sync::Arc;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::{Direction, Embed, Filter, Query, RecordStore, decode_first, decode_rows, tables};
use shared::models::{Dish, DishCreate, DishUpdate};

const TABLE: &str = tables::DISHES;

fn with_category() -> Embed {
    Embed::new(tables::CATEGORIES).columns(["name"])
}

#[derive(Clone)]
pub struct DishRepository {
    base: BaseRepository,
}

impl DishRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    /// Every dish (incl. unavailable), newest first, with category name
    pub async fn find_all(&self) -> RepoResult<Vec<Dish>> {
        let query = Query::new()
            .embed(with_category())
            .order_by("created_at", Direction::Desc);
        let rows = self.base.store().select(TABLE, &query).await?;
        Ok(decode_rows(rows)?)
    }

    /// Dishes visible on the public menu, with category name
    pub async fn find_available(&self) -> RepoResult<Vec<Dish>> {
        let query = Query::new().embed(with_category()).eq("available", true);
        let rows = self.base.store().select(TABLE, &query).await?;
        Ok(decode_rows(rows)?)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Dish>> {
        let query = Query::new().embed(with_category()).eq("id", id);
        let rows = self.base.store().select(TABLE, &query).await?;
        Ok(decode_first(rows)?)
    }

    /// Number of dishes referencing `category_id`
    pub async fn count_by_category(&self, category_id: &str) -> RepoResult<usize> {
        let query = Query::new().eq("category_id", category_id);
        let rows = self.base.store().select(TABLE, &query).await?;
        Ok(rows.len())
    }

    pub async fn create(&self, data: DishCreate) -> RepoResult<Dish> {
        let rows = self
            .base
            .store()
            .insert(TABLE, vec![serde_json::to_value(&data)?])
            .await?;
        let created: Dish = decode_first(rows)?
            .ok_or_else(|| RepoError::Validation("Store returned no dish row".into()))?;
        self.reload(created).await
    }

    pub async fn update(&self, id: &str, data: DishUpdate) -> RepoResult<Dish> {
        self.patch(id, serde_json::to_value(&data)?).await
    }

    pub async fn set_available(&self, id: &str, available: bool) -> RepoResult<Dish> {
        self.patch(id, serde_json::json!({ "available": available }))
            .await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let removed = self
            .base
            .store()
            .delete(TABLE, &[Filter::eq("id", id)])
            .await?;
        Ok(!removed.is_empty())
    }

    async fn patch(&self, id: &str, patch: serde_json::Value) -> RepoResult<Dish> {
        let rows = self
            .base
            .store()
            .update(TABLE, &[Filter::eq("id", id)], patch)
            .await?;
        let updated: Dish =
            decode_first(rows)?.ok_or_else(|| RepoError::NotFound(format!("Dish {id}")))?;
        self.reload(updated).await
    }

    /// Write responses carry no embeds; re-read to attach the category name
    async fn reload(&self, dish: Dish) -> RepoResult<Dish> {
        Ok(self.find_by_id(&dish.id).await?.unwrap_or(dish))
    }
}
