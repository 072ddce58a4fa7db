//! 认证中间件
//!
//! 角色检查在 API 层完成，记录存储不被假定会执行任何权限控制。

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};

use super::session::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;
use shared::ErrorCode;

/// 认证中间件 - 要求用户登录
///
/// 解析 `Authorization: Bearer <token>` 并将 [`CurrentUser`] 注入请求扩展。
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 NotAuthenticated |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检的 OPTIONS 请求
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let user = CurrentUser::from_request_parts(&mut parts, &state).await?;
    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 员工中间件 - 要求 mesero 或 admin
///
/// 必须位于 [`require_auth`] 之内。
pub async fn require_staff(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    if !user.is_staff() {
        security_log!(
            "WARN",
            "staff_required",
            user_id = user.id.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::StaffRequired));
    }

    Ok(next.run(req).await)
}

/// 管理员中间件 - 要求 admin
///
/// 必须位于 [`require_auth`] 之内。
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

/// 从请求中提取 CurrentUser 的扩展方法
pub trait CurrentUserExt {
    /// 未认证返回 401
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or(AppError::unauthorized())
    }
}
