//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/sign-in, /api/auth/sign-up: public
/// - /api/auth/me, /api/auth/sign-out: bearer token, resolved by the `CurrentUser` extractor
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/sign-in", post(handler::sign_in))
        .route("/api/auth/sign-up", post(handler::sign_up))
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/sign-out", post(handler::sign_out))
}
