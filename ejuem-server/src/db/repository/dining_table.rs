//! Dining Table Repository

use std::sync::Arc;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::{Direction, Filter, Query, RecordStore, decode_first, decode_rows, tables};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};

const TABLE: &str = tables::TABLES;

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    /// All tables ordered by number
    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let query = Query::new().order_by("number", Direction::Asc);
        let rows = self.base.store().select(TABLE, &query).await?;
        Ok(decode_rows(rows)?)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let rows = self
            .base
            .store()
            .select(TABLE, &Query::new().eq("id", id))
            .await?;
        Ok(decode_first(rows)?)
    }

    pub async fn find_by_number(&self, number: i32) -> RepoResult<Option<DiningTable>> {
        let rows = self
            .base
            .store()
            .select(TABLE, &Query::new().eq("number", number))
            .await?;
        Ok(decode_first(rows)?)
    }

    /// Create a table; the number must be unique
    pub async fn create(&self, data: DiningTableCreate) -> RepoResult<DiningTable> {
        if self.find_by_number(data.number).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table number {} already exists",
                data.number
            )));
        }

        let rows = self
            .base
            .store()
            .insert(TABLE, vec![serde_json::to_value(&data)?])
            .await?;
        decode_first(rows)?
            .ok_or_else(|| RepoError::Validation("Store returned no table row".into()))
    }

    pub async fn update(&self, id: &str, data: DiningTableUpdate) -> RepoResult<DiningTable> {
        if let Some(number) = data.number
            && let Some(other) = self.find_by_number(number).await?
            && other.id != id
        {
            return Err(RepoError::Duplicate(format!(
                "Table number {number} already exists"
            )));
        }
        self.patch(id, serde_json::to_value(&data)?).await
    }

    pub async fn set_status(&self, id: &str, status: TableStatus) -> RepoResult<DiningTable> {
        self.patch(id, serde_json::json!({ "status": status })).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let removed = self
            .base
            .store()
            .delete(TABLE, &[Filter::eq("id", id)])
            .await?;
        Ok(!removed.is_empty())
    }

    async fn patch(&self, id: &str, patch: serde_json::Value) -> RepoResult<DiningTable> {
        let rows = self
            .base
            .store()
            .update(TABLE, &[Filter::eq("id", id)], patch)
            .await?;
        decode_first(rows)?.ok_or_else(|| RepoError::NotFound(format!("Table {id}")))
    }
}
