// handlers/public/auth - token acquisition
//
// POST /auth/register - create an account, returns a token
// POST /auth/login    - exchange credentials for a token

use axum::{routing::post, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{PasswordError, TokenService};
use crate::database::{UserProfile, UserStore};
use crate::error::ApiError;

pub mod login;
pub mod register;

pub use login::login_post;
pub use register::register_post;

#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenService,
}

pub fn routes(users: Arc<dyn UserStore>, tokens: TokenService) -> Router {
    Router::new()
        .route("/auth/register", post(register_post))
        .route("/auth/login", post(login_post))
        .with_state(AuthState { users, tokens })
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: UserProfile,
}

impl AuthState {
    fn token_response(&self, user: UserProfile) -> Result<TokenResponse, ApiError> {
        let token = self.tokens.issue(user.id).map_err(|e| {
            tracing::error!("Failed to issue token for {}: {}", user.id, e);
            ApiError::internal_server_error("Server error")
        })?;
        Ok(TokenResponse { token, user })
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Runs argon2 work off the async executor.
pub(crate) async fn blocking_password<F, T>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| {
            tracing::error!("Password task failed: {}", e);
            ApiError::internal_server_error("Server error")
        })?
        .map_err(|e| {
            tracing::error!("Password hashing error: {}", e);
            ApiError::internal_server_error("Server error")
        })
}
