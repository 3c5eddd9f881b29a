use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{JwtError, TokenService};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{FoodStore, HealthCheck, UserStore};
use crate::handlers::{protected, public};

/// Everything the routers need, passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub foods: Arc<dyn FoodStore>,
    pub users: Arc<dyn UserStore>,
    pub health: Arc<dyn HealthCheck>,
    pub tokens: TokenService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wires one store that implements every port.
    pub fn new<S>(store: Arc<S>, config: AppConfig) -> Result<Self, JwtError>
    where
        S: FoodStore + UserStore + HealthCheck + 'static,
    {
        let tokens = TokenService::new(&config.security)?;
        Ok(Self {
            foods: store.clone(),
            users: store.clone(),
            health: store,
            tokens,
            config: Arc::new(config),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health).with_state(state.health.clone()))
        .merge(public::auth::routes(state.users.clone(), state.tokens.clone()))
        // Protected
        .merge(protected::foods::routes(state.foods.clone(), state.tokens.clone()))
        .merge(protected::profile::routes(state.users.clone(), state.tokens.clone()))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "food-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/auth/register, /auth/login (public)",
            "foods": "/foods, /foods/:id (protected)",
            "profile": "/profile (protected), /profile/logout (public)",
            "health": "/health (public)",
        }
    }))
}

async fn health(State(store): State<Arc<dyn HealthCheck>>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = AppState::new(Arc::new(MemoryStore::new()), AppConfig::development()).unwrap();
        app(state)
    }

    #[tokio::test]
    async fn health_is_ok_with_memory_store() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn foods_require_token() {
        let response = test_app()
            .oneshot(Request::builder().uri("/foods").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_needs_no_token() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/profile/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
