use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::database::{UserProfile, UserStore};
use crate::error::ApiError;
use crate::middleware::{jwt_auth_middleware, ApiResponse, ApiResult, AuthUser};

/// GET /profile is authenticated; POST /profile/logout is not.
pub fn routes(users: Arc<dyn UserStore>, tokens: TokenService) -> Router {
    Router::new()
        .route("/profile", get(get_profile))
        .route_layer(from_fn_with_state(tokens, jwt_auth_middleware))
        .route("/profile/logout", post(logout))
        .with_state(users)
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// GET /profile - the caller's user record without its credential
pub async fn get_profile(
    State(users): State<Arc<dyn UserStore>>,
    auth_user: Option<Extension<AuthUser>>,
) -> ApiResult<UserProfile> {
    // Only reachable without an AuthUser if the route is mounted unprotected.
    let Some(Extension(auth_user)) = auth_user else {
        return Err(ApiError::bad_request("User ID not found in request"));
    };

    let profile = users
        .find_profile(auth_user.user_id)
        .await
        .map_err(ApiError::from_store(
            "Error fetching user profile",
            "Internal server error",
        ))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(profile))
}

/// POST /profile/logout - tokens are stateless, so there is nothing to revoke
/// server side; clients drop their token.
pub async fn logout() -> ApiResponse<LogoutResponse> {
    ApiResponse::success(LogoutResponse {
        message: "Logged out successfully",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn missing_identity_is_bad_request() {
        let users: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
        let err = get_profile(State(users), None).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "User ID not found in request");
    }

    #[tokio::test]
    async fn deleted_user_is_not_found() {
        let users: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
        let caller = AuthUser {
            user_id: uuid::Uuid::new_v4(),
        };
        let err = get_profile(State(users), Some(Extension(caller)))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
