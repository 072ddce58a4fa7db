//! Hosted session provider (GoTrue 风格的认证服务)
//!
//! | 操作 | 请求 |
//! |------|------|
//! | sign_in | `POST /auth/v1/token?grant_type=password` |
//! | sign_up | `POST /auth/v1/signup` (资料放在 `data`) |
//! | sign_out | `POST /auth/v1/logout` |
//! | current_user | `GET /auth/v1/user` |
//!
//! 角色保存在 `user_metadata.role` 中。

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use super::session::{AuthError, AuthResult, CurrentUser, Session, SessionProvider};
use shared::models::{Profile, Role, User};

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    role: Option<String>,
}

impl RemoteUser {
    fn role(&self) -> Role {
        // 未知或缺失的角色按顾客处理
        self.user_metadata
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or_default()
    }

    fn into_user(self) -> User {
        let role = self.role();
        User {
            id: self.id,
            name: self.user_metadata.name,
            email: self.email.unwrap_or_default(),
            role,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<RemoteUser>,
}

#[derive(Debug, Clone)]
pub struct RemoteSessionProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteSessionProvider {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Send a request; non-2xx responses become (status, provider message)
    async fn send(&self, req: reqwest::RequestBuilder) -> AuthResult<Result<Value, (StatusCode, String)>> {
        let response = req
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if status.is_success() {
            let body = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|e| AuthError::Internal(e.to_string()))?
            };
            Ok(Ok(body))
        } else {
            Ok(Err((status, provider_message(&text))))
        }
    }
}

/// Pull the human-readable message out of an auth error body
fn provider_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

fn into_session(body: Value) -> AuthResult<Session> {
    let token: TokenResponse =
        serde_json::from_value(body).map_err(|e| AuthError::Internal(e.to_string()))?;
    let (Some(access_token), Some(user)) = (token.access_token, token.user) else {
        // 服务端开启了邮箱确认：账号已创建但没有会话
        return Err(AuthError::SignUpFailed(
            "Confirmation email sent, sign in after confirming the address".to_string(),
        ));
    };
    Ok(Session {
        access_token,
        token_type: token.token_type.unwrap_or_else(|| "bearer".to_string()),
        expires_in: token.expires_in.unwrap_or_default(),
        user: user.into_user(),
    })
}

#[async_trait]
impl SessionProvider for RemoteSessionProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let req = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        match self.send(req).await? {
            Ok(body) => into_session(body),
            Err((status, message)) if status.is_client_error() => {
                Err(AuthError::InvalidCredentials(message))
            }
            Err((_, message)) => Err(AuthError::Unavailable(message)),
        }
    }

    async fn sign_up(&self, email: &str, password: &str, profile: Profile) -> AuthResult<Session> {
        let req = self.client.post(self.url("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": { "name": profile.name, "role": profile.role },
        }));

        match self.send(req).await? {
            Ok(body) => into_session(body),
            Err((StatusCode::UNPROCESSABLE_ENTITY, message))
                if message.to_lowercase().contains("already registered") =>
            {
                Err(AuthError::EmailTaken)
            }
            Err((status, message)) if status.is_client_error() => {
                Err(AuthError::SignUpFailed(message))
            }
            Err((_, message)) => Err(AuthError::Unavailable(message)),
        }
    }

    async fn sign_out(&self, token: &str) -> AuthResult<()> {
        let req = self.client.post(self.url("logout")).bearer_auth(token);
        match self.send(req).await? {
            Ok(_) => Ok(()),
            Err((StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, message)) => {
                Err(AuthError::InvalidToken(message))
            }
            Err((_, message)) => Err(AuthError::Unavailable(message)),
        }
    }

    async fn current_user(&self, token: &str) -> AuthResult<CurrentUser> {
        let req = self.client.get(self.url("user")).bearer_auth(token);
        match self.send(req).await? {
            Ok(body) => {
                let user: RemoteUser =
                    serde_json::from_value(body).map_err(|e| AuthError::Internal(e.to_string()))?;
                let role = user.role();
                Ok(CurrentUser {
                    id: user.id,
                    email: user.email.unwrap_or_default(),
                    name: user.user_metadata.name,
                    role,
                    token: token.to_string(),
                })
            }
            Err((status, message)) if status.is_client_error() => {
                Err(AuthError::InvalidToken(message))
            }
            Err((_, message)) => Err(AuthError::Unavailable(message)),
        }
    }
}
