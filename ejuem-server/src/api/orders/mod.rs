//! Order Routes
//!
//! # 顾客 / 员工
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/orders | GET | 自己的订单 + 可用操作 | Bearer |
//! | /api/orders/stream | GET | 自己的订单推送 (SSE) | Bearer |
//! | /api/orders/{id}/status | PUT | 状态变更 | mesero / admin |
//!
//! # 管理视图 (挂在 /api/admin/orders 下)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | / | GET | 全部订单，`?status=all\|<status>` |
//! | /stream | GET | 全部订单推送 (SSE) |

mod handler;
mod stream;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{require_auth, require_staff};
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/orders", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let staff_routes = Router::new()
        .route("/{id}/status", put(handler::change_status))
        .layer(middleware::from_fn(require_staff));

    Router::new()
        .route("/", get(handler::list_mine))
        .route("/stream", get(handler::stream_mine))
        .merge(staff_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// 管理视图路由，认证和角色检查由外层 admin 路由负责
pub fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_all))
        .route("/stream", get(handler::stream_all))
}
