//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// 跨越 HTTP 边界的错误：错误码 + 消息 + 可选的结构化详情
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    /// 字段级错误或上下文 (如 order_id, expected/actual)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// 使用错误码的默认消息
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== 常用构造 ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// 存储读写失败
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// 唯一约束冲突
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }
}

/// 响应信封
///
/// 错误响应与无载荷的成功响应 (如登出) 使用此结构；`code` 为 0 表示成功。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: None,
            details: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        // 9xxx 记录到日志
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "Request failed with system error"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::OrderEmpty);
        assert_eq!(err.code, ErrorCode::OrderEmpty);
        assert_eq!(err.message, "Cart is empty");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::new(ErrorCode::StatusConflict)
            .with_detail("expected", "pendiente")
            .with_detail("actual", "cancelado");

        let details = err.details.unwrap();
        assert_eq!(details.get("expected").unwrap(), "pendiente");
        assert_eq!(details.get("actual").unwrap(), "cancelado");
    }

    #[test]
    fn test_app_error_convenience_constructors() {
        assert_eq!(AppError::unauthorized().code, ErrorCode::NotAuthenticated);
        assert_eq!(AppError::database("x").code, ErrorCode::DatabaseError);
        assert_eq!(
            AppError::token_expired().http_status(),
            StatusCode::UNAUTHORIZED
        );
        let err = AppError::conflict("table 3 exists");
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.message, "table 3 exists");
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::OrderNotFound, "Order o1 not found");
        assert_eq!(format!("{}", err), "Order o1 not found");
    }

    #[test]
    fn test_api_response_error() {
        let err = AppError::new(ErrorCode::CartNotFound).with_detail("cart_id", "c1");
        let response = ApiResponse::<()>::error(&err);

        assert_eq!(response.code, Some(4101));
        assert_eq!(response.message, "Cart not found");
        assert!(response.data.is_none());
        assert!(response.details.is_some());
    }

    #[test]
    fn test_api_response_serialize_skips_empty_fields() {
        let json = serde_json::to_value(ApiResponse::<()>::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "code": 0, "message": "OK" }));
    }
}
