//! Dining Table API 模块 (admin)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// 挂在 /api/admin/tables 下
pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/toggle-status", post(handler::toggle_status))
}
