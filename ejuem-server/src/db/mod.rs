//! Record Store Module
//!
//! 持久化、ID 生成与时间戳均委托给托管记录存储。本模块定义通用的
//! select / insert / update / delete 接口以及两个适配器：
//!
//! - [`MemoryStore`]: 进程内表，用于开发与测试，发布变更通知
//! - [`RestStore`]: PostgREST 风格的托管后端 (reqwest)
//!
//! 类型化的访问封装在 [`repository`] 中。

pub mod memory;
pub mod query;
pub mod repository;
pub mod rest;

pub use memory::MemoryStore;
pub use query::{Columns, Direction, Embed, Filter, OrderBy, Query};
pub use rest::RestStore;

use async_trait::async_trait;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;
use tokio::sync::broadcast;

/// Store table names
pub mod tables {
    pub const CATEGORIES: &str = "categories";
    pub const DISHES: &str = "dishes";
    pub const TABLES: &str = "tables";
    pub const ORDERS: &str = "orders";
    pub const ORDER_ITEMS: &str = "order_items";
    pub const USERS: &str = "users";
    /// Local password credentials (only used by the local session provider)
    pub const CREDENTIALS: &str = "credentials";
}

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Malformed record: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Network(msg) => AppError::with_message(ErrorCode::NetworkError, msg),
            StoreError::Timeout => AppError::new(ErrorCode::TimeoutError),
            StoreError::Conflict(msg) => AppError::conflict(msg),
            other => AppError::database(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Kind of change observed on a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Change notification published after a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
}

/// Generic record store
///
/// 所有操作的行都以 JSON 对象表示；`insert` / `update` / `delete`
/// 返回受影响的行。
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Select rows matching `query`
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Insert one or more rows, returning them as stored (with generated id / created_at)
    async fn insert(&self, table: &str, rows: Vec<Value>) -> StoreResult<Vec<Value>>;

    /// Merge `patch` into every row matching all `filters`
    async fn update(&self, table: &str, filters: &[Filter], patch: Value)
    -> StoreResult<Vec<Value>>;

    /// Delete every row matching all `filters`
    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<Vec<Value>>;

    /// Change notifications, if the backend publishes them
    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        None
    }
}

/// Decode a list of rows into typed records
pub fn decode_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> StoreResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

/// Decode the first returned row, if any
pub fn decode_first<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> StoreResult<Option<T>> {
    rows.into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()
        .map_err(StoreError::from)
}
