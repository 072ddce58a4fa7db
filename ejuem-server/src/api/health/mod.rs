//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 简单健康检查 | 无 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 简单健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 状态 (ok)
    status: &'static str,
    version: &'static str,
    /// memory | rest
    backend: &'static str,
    environment: String,
    /// 当前内存中的匿名购物车数量
    open_carts: usize,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.config.store_backend.as_str(),
        environment: state.config.environment.clone(),
        open_carts: state.carts.len(),
    })
}
