//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录 / 注册 / 登出
//! - [`menu`] - 公共菜单
//! - [`carts`] - 匿名购物车与结账
//! - [`orders`] - 订单视图、状态变更与推送
//! - [`categories`] - 分类管理接口 (admin)
//! - [`dishes`] - 菜品管理接口 (admin)
//! - [`tables`] - 桌台管理接口 (admin)

pub mod auth;
pub mod carts;
pub mod categories;
pub mod dishes;
pub mod health;
pub mod menu;
pub mod orders;
pub mod tables;

use axum::{Router, middleware};
use http::HeaderName;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{require_admin, require_auth};
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 为每个请求生成 UUID 作为 x-request-id
#[derive(Clone, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        http::HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Admin routes, all behind `require_auth` + `require_admin`
fn admin_router(state: &ServerState) -> Router<ServerState> {
    let routes = Router::new()
        .nest("/orders", orders::admin_routes())
        .nest("/categories", categories::routes())
        .nest("/dishes", dishes::routes())
        .nest("/tables", tables::routes())
        // 后添加的层先执行：先认证再检查角色
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new().nest("/api/admin", routes)
}

/// 组装全部业务路由
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(menu::router())
        .merge(carts::router())
        .merge(orders::router(state))
        .merge(admin_router(state))
}

/// 构建完整应用：业务路由 + tower-http 中间件 + 状态
pub fn build_app(state: ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router(&state)
        // CORS - 前端与 API 分开部署
        .layer(CorsLayer::permissive())
        // Compression - text/event-stream 不会被压缩
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .with_state(state)
}
