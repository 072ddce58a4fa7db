//! Repository Module
//!
//! Typed access to the record store tables.

pub mod category;
pub mod dining_table;
pub mod dish;
pub mod order;
pub mod user;

pub use category::CategoryRepository;
pub use dining_table::DiningTableRepository;
pub use dish::DishRepository;
pub use order::OrderRepository;
pub use user::UserRepository;

use std::sync::Arc;
use thiserror::Error;

use super::{RecordStore, StoreError};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => RepoError::Duplicate(msg),
            other => RepoError::Store(other),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Store(StoreError::from(err))
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with store reference
#[derive(Clone)]
pub struct BaseRepository {
    store: Arc<dyn RecordStore>,
}

impl BaseRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}
