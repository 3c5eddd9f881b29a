#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use food_api::auth::TokenService;
use food_api::config::AppConfig;
use food_api::database::{
    Food, FoodFields, FoodStore, HealthCheck, MemoryStore, NewFood, NewUser, StoreError, User,
    UserProfile, UserStore,
};
use food_api::{app, AppState};

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    tokens: TokenService,
}

/// A registered account: its bearer token and user id.
pub struct TestUser {
    pub id: String,
    pub token: String,
}

impl TestServer {
    /// Starts the real router on a free port, backed by a fresh memory store.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_store(Arc::new(MemoryStore::new())).await
    }

    /// Starts the real router on a free port over the given store.
    pub async fn spawn_with_store<S>(store: Arc<S>) -> Result<Self>
    where
        S: FoodStore + UserStore + HealthCheck + 'static,
    {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;

        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        let state = AppState::new(store, config)?;
        let tokens = state.tokens.clone();

        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
            tokens,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Token for an arbitrary user id, bypassing registration.
    pub fn token_for(&self, user_id: Uuid) -> String {
        self.tokens.issue(user_id).expect("token issue")
    }

    pub async fn register(&self, email: &str) -> Result<TestUser> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({
                "email": email,
                "name": "Test Cook",
                "password": "correct-horse-battery",
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status().is_success(), "register failed: {}", res.status());

        let body: Value = res.json().await?;
        Ok(TestUser {
            id: body["user"]["id"]
                .as_str()
                .context("missing user id")?
                .to_string(),
            token: body["token"].as_str().context("missing token")?.to_string(),
        })
    }

    pub async fn create_food(&self, token: &str, name: &str, price: f64, description: &str) -> Result<Value> {
        let res = self
            .post("/foods", token)
            .json(&json!({ "name": name, "price": price, "description": description }))
            .send()
            .await?;
        anyhow::ensure!(res.status().as_u16() == 201, "create failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn list_foods(&self, token: &str) -> Result<Vec<Value>> {
        let res = self.get("/foods", token).send().await?;
        anyhow::ensure!(res.status().is_success(), "list failed: {}", res.status());
        Ok(res.json().await?)
    }
}

/// Store whose every call fails, as if the database were unreachable.
pub struct FailingStore;

fn unreachable_db() -> StoreError {
    StoreError::Sqlx(sqlx::Error::PoolClosed)
}

#[async_trait]
impl FoodStore for FailingStore {
    async fn list_foods(&self, _owner_id: Uuid) -> Result<Vec<Food>, StoreError> {
        Err(unreachable_db())
    }

    async fn insert_food(&self, _food: NewFood) -> Result<Food, StoreError> {
        Err(unreachable_db())
    }

    async fn update_owned_food(
        &self,
        _id: Uuid,
        _owner_id: Uuid,
        _fields: FoodFields,
    ) -> Result<Option<Food>, StoreError> {
        Err(unreachable_db())
    }

    async fn delete_owned_food(&self, _id: Uuid, _owner_id: Uuid) -> Result<Option<Food>, StoreError> {
        Err(unreachable_db())
    }
}

#[async_trait]
impl UserStore for FailingStore {
    async fn find_profile(&self, _id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Err(unreachable_db())
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(unreachable_db())
    }

    async fn insert_user(&self, _user: NewUser) -> Result<User, StoreError> {
        Err(unreachable_db())
    }
}

#[async_trait]
impl HealthCheck for FailingStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Err(unreachable_db())
    }
}
