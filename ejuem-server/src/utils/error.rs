//! 统一错误处理
//!
//! 错误类型来自 `shared::error`，这里补充服务端特有的转换：
//!
//! | 来源 | 转换 |
//! |------|------|
//! | `validator::ValidationErrors` | ValidationFailed + 字段详情 |
//! | `RepoError` | 按资源映射到 NotFound / AlreadyExists 类错误码 |

pub use shared::error::{ApiResponse, AppError, ErrorCategory, ErrorCode};

use crate::db::repository::RepoError;

/// Convert validator errors into a ValidationFailed error with per-field details
pub fn validation_error(errors: validator::ValidationErrors) -> AppError {
    let mut err = AppError::validation(format!("Validation failed: {errors}"));
    for (field, field_errors) in errors.field_errors() {
        let codes: Vec<String> = field_errors.iter().map(|e| e.code.to_string()).collect();
        err = err.with_detail(field.to_string(), codes);
    }
    err
}

/// Map a repository error onto resource-specific codes
///
/// `not_found` / `duplicate` 为该资源对应的错误码。
pub fn repo_error(err: RepoError, not_found: ErrorCode, duplicate: ErrorCode) -> AppError {
    match err {
        RepoError::NotFound(msg) => AppError::with_message(not_found, format!("{msg} not found")),
        RepoError::Duplicate(msg) => AppError::with_message(duplicate, msg),
        RepoError::Validation(msg) => AppError::validation(msg),
        RepoError::Store(e) => e.into(),
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        repo_error(err, ErrorCode::NotFound, ErrorCode::AlreadyExists)
    }
}
