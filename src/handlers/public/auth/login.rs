// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::State;
use serde::Deserialize;

use super::{blocking_password, normalize_email, AuthState, TokenResponse};
use crate::auth::verify_password;
use crate::error::ApiError;
use crate::handlers::{is_filled, ApiJson, RequiredFields};
use crate::middleware::{ApiResponse, ApiResult};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login - exchange email and password for a bearer token
///
/// Unknown email and wrong password produce the same 401.
pub async fn login_post(
    State(state): State<AuthState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let mut required = RequiredFields::default();
    required.check("email", is_filled(&payload.email));
    required.check("password", is_filled(&payload.password));
    required.finish("Email and password are required")?;

    let email = normalize_email(payload.email.as_deref().unwrap_or_default());
    let password = payload.password.unwrap_or_default();

    let user = state
        .users
        .find_user_by_email(&email)
        .await
        .map_err(ApiError::from_store("Error loading user for login", "Server error"))?;

    let Some(user) = user else {
        tracing::warn!("Login failed: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let password_hash = user.password_hash.clone();
    let verified = blocking_password(move || verify_password(&password, &password_hash)).await?;
    if !verified {
        tracing::warn!("Login failed: wrong password for user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    tracing::info!("User {} logged in", user.id);
    Ok(ApiResponse::success(state.token_response(user.profile())?))
}
