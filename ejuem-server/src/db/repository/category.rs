//! Category Repository

use std::sync::Arc;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::{Direction, Filter, Query, RecordStore, decode_first, decode_rows, tables};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

const TABLE: &str = tables::CATEGORIES;

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    /// All categories ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let rows = self
            .base
            .store()
            .select(TABLE, &Query::new().order_by("name", Direction::Asc))
            .await?;
        Ok(decode_rows(rows)?)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let rows = self
            .base
            .store()
            .select(TABLE, &Query::new().eq("id", id))
            .await?;
        Ok(decode_first(rows)?)
    }

    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        let rows = self
            .base
            .store()
            .insert(TABLE, vec![serde_json::to_value(&data)?])
            .await?;
        decode_first(rows)?
            .ok_or_else(|| RepoError::Validation("Store returned no category row".into()))
    }

    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let rows = self
            .base
            .store()
            .update(TABLE, &[Filter::eq("id", id)], serde_json::to_value(&data)?)
            .await?;
        decode_first(rows)?.ok_or_else(|| RepoError::NotFound(format!("Category {id}")))
    }

    /// Delete a category; returns false when nothing matched
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let removed = self
            .base
            .store()
            .delete(TABLE, &[Filter::eq("id", id)])
            .await?;
        Ok(!removed.is_empty())
    }
}
