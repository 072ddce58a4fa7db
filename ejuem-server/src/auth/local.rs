//! Local session provider
//!
//! Argon2 密码哈希 + 本地签发的 JWT。注册时同时写入 `users` 资料行，
//! 与托管认证服务的触发器行为一致。登出通过吊销令牌 ID (jti) 实现，
//! 吊销记录保留到令牌过期 (含时钟容差) 为止。

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::jwt::{JwtError, JwtService, VALIDATION_LEEWAY_SECS};
use super::session::{AuthError, AuthResult, CurrentUser, Session, SessionProvider};
use crate::db::RecordStore;
use crate::db::repository::UserRepository;
use crate::db::repository::user::Credential;
use shared::models::{Profile, User};

const INVALID_LOGIN: &str = "Invalid login credentials";

pub struct LocalSessionProvider {
    users: UserRepository,
    jwt: JwtService,
    /// jti → exp (unix 秒)
    revoked: DashMap<String, i64>,
}

impl LocalSessionProvider {
    pub fn new(store: Arc<dyn RecordStore>, jwt: JwtService) -> Self {
        Self {
            users: UserRepository::new(store),
            jwt,
            revoked: DashMap::new(),
        }
    }

    fn issue(&self, user: User) -> AuthResult<Session> {
        let access_token = self
            .jwt
            .generate_token(&user.id, &user.email, &user.name, user.role)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok(Session {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.jwt.expires_in(),
            user,
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let Some(credential) = self.users.find_credential(email).await? else {
            return Err(AuthError::InvalidCredentials(INVALID_LOGIN.to_string()));
        };

        let password = password.to_string();
        let hash = credential.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !valid {
            return Err(AuthError::InvalidCredentials(INVALID_LOGIN.to_string()));
        }

        let user = self
            .users
            .find_by_id(&credential.id)
            .await?
            .unwrap_or_else(|| User {
                id: credential.id.clone(),
                name: String::new(),
                email: credential.email.clone(),
                role: Default::default(),
            });
        self.issue(user)
    }

    async fn sign_up(&self, email: &str, password: &str, profile: Profile) -> AuthResult<Session> {
        if self.users.find_credential(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::SignUpFailed(e.to_string()))?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: profile.name,
            email: email.to_string(),
            role: profile.role,
        };
        self.users
            .create_credential(&Credential {
                id: user.id.clone(),
                email: user.email.clone(),
                password_hash,
            })
            .await?;
        let user = self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Local account created");
        self.issue(user)
    }

    async fn sign_out(&self, token: &str) -> AuthResult<()> {
        match self.jwt.validate_token(token) {
            Ok(claims) => {
                self.revoked.insert(claims.jti, claims.exp);
                Ok(())
            }
            // 已过期的令牌无需吊销
            Err(JwtError::ExpiredToken) => Ok(()),
            Err(e) => Err(AuthError::InvalidToken(e.to_string())),
        }
    }

    async fn current_user(&self, token: &str) -> AuthResult<CurrentUser> {
        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            JwtError::ExpiredToken => AuthError::TokenExpired,
            other => AuthError::InvalidToken(other.to_string()),
        })?;

        if self.revoked.contains_key(&claims.jti) {
            return Err(AuthError::InvalidToken("token revoked".to_string()));
        }

        Ok(CurrentUser {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            token: token.to_string(),
        })
    }

    fn prune_expired(&self) -> usize {
        let cutoff = chrono::Utc::now().timestamp() - VALIDATION_LEEWAY_SECS as i64;
        let before = self.revoked.len();
        self.revoked.retain(|_, exp| *exp >= cutoff);
        before.saturating_sub(self.revoked.len())
    }
}
