//! Session provider abstraction
//!
//! 认证委托给会话提供者：登录、注册、登出以及按令牌解析当前用户。
//! 处理函数通过 [`CurrentUser`] 提取器显式获得会话，没有全局状态。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::repository::RepoError;
use shared::error::{AppError, ErrorCode};
use shared::models::{Profile, Role, User};

/// 当前用户上下文
///
/// 由 [`SessionProvider::current_user`] 解析，注入到请求处理函数。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// 原始访问令牌 (登出时使用)
    #[serde(skip)]
    pub token: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// Authenticated session returned by sign-in / sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Session provider errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// 提供者拒绝了登录，消息原样展示
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Email already registered")]
    EmailTaken,

    /// 提供者拒绝了注册，消息原样展示
    #[error("{0}")]
    SignUpFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Session provider unreachable: {0}")]
    Unavailable(String),

    #[error("Session provider error: {0}")]
    Internal(String),
}

impl From<RepoError> for AuthError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate(_) => AuthError::EmailTaken,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials(msg) => {
                AppError::with_message(ErrorCode::InvalidCredentials, msg)
            }
            AuthError::EmailTaken => AppError::new(ErrorCode::EmailAlreadyRegistered),
            AuthError::SignUpFailed(msg) => AppError::with_message(ErrorCode::SignUpFailed, msg),
            AuthError::TokenExpired => AppError::token_expired(),
            AuthError::InvalidToken(_) => AppError::invalid_token("Invalid token"),
            AuthError::Unavailable(msg) => AppError::with_message(ErrorCode::NetworkError, msg),
            AuthError::Internal(msg) => AppError::internal(msg),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Hosted or local authentication backend
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Register a new account; the profile (name, role) ends up in user metadata
    async fn sign_up(&self, email: &str, password: &str, profile: Profile) -> AuthResult<Session>;

    async fn sign_out(&self, token: &str) -> AuthResult<()>;

    /// Resolve the user owning `token`
    async fn current_user(&self, token: &str) -> AuthResult<CurrentUser>;

    /// Drop bookkeeping for sessions that can no longer be used; returns the number dropped
    ///
    /// 托管提供者自行管理会话，默认无事可做。
    fn prune_expired(&self) -> usize {
        0
    }
}
