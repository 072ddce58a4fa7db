//! Authentication Handlers
//!
//! 登录、注册、登出都委托给配置的会话提供者，提供者的错误消息原样返回。

use axum::{Json, extract::State};
use validator::Validate;

use crate::auth::{CurrentUser, Session};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, AppResult, validation_error};
use shared::ApiResponse;
use shared::models::{Profile, SignInRequest, SignUpRequest};

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<ServerState>,
    Json(req): Json<SignInRequest>,
) -> AppResult<Json<Session>> {
    req.validate().map_err(validation_error)?;

    match state.sessions.sign_in(&req.email, &req.password).await {
        Ok(session) => {
            security_log!(
                "INFO",
                "sign_in",
                user_id = session.user.id.clone(),
                user_role = session.user.role.as_str()
            );
            Ok(Json(session))
        }
        Err(e) => {
            tracing::warn!(email = %req.email, error = %e, "Sign-in failed");
            Err(AppError::from(e))
        }
    }
}

/// POST /api/auth/sign-up
///
/// 资料 (name, role) 随注册请求交给提供者保存。
pub async fn sign_up(
    State(state): State<ServerState>,
    Json(req): Json<SignUpRequest>,
) -> AppResult<Json<Session>> {
    req.validate().map_err(validation_error)?;

    let profile = Profile {
        name: req.name.trim().to_string(),
        role: req.role,
    };

    let session = state
        .sessions
        .sign_up(&req.email, &req.password, profile)
        .await
        .map_err(|e| {
            tracing::warn!(email = %req.email, error = %e, "Sign-up failed");
            AppError::from(e)
        })?;

    security_log!(
        "INFO",
        "sign_up",
        user_id = session.user.id.clone(),
        user_role = session.user.role.as_str()
    );
    Ok(Json(session))
}

/// GET /api/auth/me
pub async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<()>>> {
    state.sessions.sign_out(&user.token).await?;
    security_log!("INFO", "sign_out", user_id = user.id.clone());
    Ok(Json(ApiResponse::ok()))
}
