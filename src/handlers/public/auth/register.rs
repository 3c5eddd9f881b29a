// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::State;
use serde::Deserialize;

use super::{blocking_password, normalize_email, AuthState, TokenResponse};
use crate::auth::hash_password;
use crate::database::{NewUser, StoreError};
use crate::error::ApiError;
use crate::handlers::{is_filled, ApiJson, RequiredFields};
use crate::middleware::{ApiResponse, ApiResult};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    fn validate(self) -> Result<(String, String, String), ApiError> {
        let mut required = RequiredFields::default();
        required.check("email", is_filled(&self.email));
        required.check("name", is_filled(&self.name));
        required.check("password", is_filled(&self.password));
        required.finish("All fields are required")?;

        let (Some(email), Some(name), Some(password)) = (self.email, self.name, self.password) else {
            return Err(ApiError::bad_request("All fields are required"));
        };

        if !email.contains('@') {
            return Err(ApiError::bad_request("Email address is invalid"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::bad_request(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        Ok((normalize_email(&email), name.trim().to_string(), password))
    }
}

/// POST /auth/register - create a user and return a bearer token
///
/// Input: `{ "email": "...", "name": "...", "password": "..." }`
/// Output: 201 `{ "token": "...", "user": { "id", "email", "name", "createdAt" } }`
pub async fn register_post(
    State(state): State<AuthState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<TokenResponse> {
    let (email, name, password) = payload.validate()?;

    let password_hash = blocking_password(move || hash_password(&password)).await?;

    let user = state
        .users
        .insert_user(NewUser {
            email,
            name,
            password_hash,
        })
        .await
        .map_err(|err| match err {
            StoreError::Conflict(msg) => {
                tracing::warn!("Registration rejected: {}", msg);
                ApiError::conflict("Email is already registered")
            }
            other => ApiError::from_store("Error registering user", "Server error")(other),
        })?;

    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created(state.token_response(user.profile())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request(email: &str, name: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn validates_and_normalizes() {
        let (email, name, password) = request(" Cook@Example.com", " Cook ", "long-enough")
            .validate()
            .unwrap();
        assert_eq!(email, "cook@example.com");
        assert_eq!(name, "Cook");
        assert_eq!(password, "long-enough");
    }

    #[test]
    fn rejects_short_password_and_bad_email() {
        let err = request("cook@example.com", "Cook", "short").validate().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = request("cook", "Cook", "long-enough").validate().unwrap_err();
        assert_eq!(err.message(), "Email address is invalid");
    }

    #[test]
    fn rejects_missing_fields() {
        let err = RegisterRequest::default().validate().unwrap_err();
        assert_eq!(err.to_json()["fields"].as_object().unwrap().len(), 3);
    }
}
