//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`ApiResponse`] - API 响应结构 (from shared::error)
//! - 日志初始化

pub mod error;
pub mod logger;
pub mod result;

pub use error::{ApiResponse, AppError, ErrorCategory, ErrorCode, repo_error, validation_error};
pub use result::AppResult;
