//! Cart Routes
//!
//! 匿名购物车：任何人都可以创建和修改，结账需要登录。
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/carts | POST | 创建购物车 | 无 |
//! | /api/carts/{id} | GET / DELETE | 查看 / 丢弃 | 无 |
//! | /api/carts/{id}/items | POST | 加入一份菜品 | 无 |
//! | /api/carts/{id}/items/{dish_id} | PATCH / DELETE | 调整数量 / 移除 | 无 |
//! | /api/carts/{id}/checkout | POST | 下单 | Bearer |

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub use handler::CartResponse;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/carts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id).delete(handler::discard))
        .route("/{id}/items", post(handler::add_item))
        .route(
            "/{id}/items/{dish_id}",
            patch(handler::update_quantity).delete(handler::remove_item),
        )
        .route("/{id}/checkout", post(handler::checkout))
}
