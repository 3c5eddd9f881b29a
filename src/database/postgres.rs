use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{
    Food, FoodFields, FoodStore, HealthCheck, NewFood, NewUser, StoreError, User, UserProfile,
    UserStore,
};
use crate::config::DatabaseConfig;

const FOOD_COLUMNS: &str = "id, name, price, description, owner_id";
const PROFILE_COLUMNS: &str = "id, email, name, created_at";
const USER_COLUMNS: &str = "id, email, name, password_hash, created_at";

/// PostgreSQL-backed store. Owner scoping lives in the WHERE clause of each
/// statement so the check and the write happen in one round trip.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[async_trait]
impl FoodStore for PgStore {
    async fn list_foods(&self, owner_id: Uuid) -> Result<Vec<Food>, StoreError> {
        let sql = format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE owner_id = $1 ORDER BY created_at, id"
        );
        let foods = sqlx::query_as::<_, Food>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(foods)
    }

    async fn insert_food(&self, food: NewFood) -> Result<Food, StoreError> {
        let sql = format!(
            "INSERT INTO foods (id, name, price, description, owner_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {FOOD_COLUMNS}"
        );
        sqlx::query_as::<_, Food>(&sql)
            .bind(Uuid::new_v4())
            .bind(&food.fields.name)
            .bind(food.fields.price)
            .bind(&food.fields.description)
            .bind(food.owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::UnknownOwner(food.owner_id)
                }
                other => StoreError::Sqlx(other),
            })
    }

    async fn update_owned_food(
        &self,
        id: Uuid,
        owner_id: Uuid,
        fields: FoodFields,
    ) -> Result<Option<Food>, StoreError> {
        let sql = format!(
            "UPDATE foods
             SET name = $3, price = $4, description = $5, updated_at = now()
             WHERE id = $1 AND owner_id = $2
             RETURNING {FOOD_COLUMNS}"
        );
        let food = sqlx::query_as::<_, Food>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(&fields.name)
            .bind(fields.price)
            .bind(&fields.description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(food)
    }

    async fn delete_owned_food(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Food>, StoreError> {
        let sql = format!(
            "DELETE FROM foods WHERE id = $1 AND owner_id = $2 RETURNING {FOOD_COLUMNS}"
        );
        let food = sqlx::query_as::<_, Food>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(food)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1");
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, email, name, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("email '{}' is already registered", user.email))
                }
                other => StoreError::Sqlx(other),
            })
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
