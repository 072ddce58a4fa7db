//! Shared types for Ejuem
//!
//! Domain types shared by the server and any client: error codes and
//! response structures, record models, and the order domain
//! (cart engine + status lifecycle).

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use order::{Cart, CartLine, OrderStatus, StatusAction};
