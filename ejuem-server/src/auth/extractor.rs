//! Session Extractor
//!
//! Resolves the bearer token through the configured session provider

use axum::{extract::FromRequestParts, http::request::Parts};

use super::jwt::JwtService;
use super::session::{AuthError, CurrentUser};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Pull the bearer token out of the request headers
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let Some(header) = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
        return Err(AppError::unauthorized());
    };

    JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
}

/// Session Extractor
///
/// Use this extractor in protected handlers to obtain the caller's session
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?.to_string();

        match state.sessions.current_user(&token).await {
            Ok(user) => {
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(e) => {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = format!("{}", e),
                    uri = format!("{:?}", parts.uri)
                );
                Err(match e {
                    AuthError::TokenExpired => AppError::token_expired(),
                    e @ AuthError::Unavailable(_) => AppError::from(e),
                    _ => AppError::invalid_token("Invalid token"),
                })
            }
        }
    }
}
