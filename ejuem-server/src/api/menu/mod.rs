//! Public Menu Routes
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/menu/categories | GET | 全部分类 |
//! | /api/menu/dishes | GET | 上架菜品，`?category=all\|<id>`，`?offers=true` 仅优惠 |
//!
//! 读取失败时返回空列表。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/menu/categories", get(handler::categories))
        .route("/api/menu/dishes", get(handler::dishes))
}
