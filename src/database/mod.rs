pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use models::food::{Food, FoodFields, NewFood};
pub use models::user::{NewUser, User, UserProfile};
pub use postgres::PgStore;

/// Errors surfaced by any store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No user {0} to own this food")]
    UnknownOwner(Uuid),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Food persistence. Every mutation takes the record id and the owner id
/// together and must match both in a single atomic step.
#[async_trait]
pub trait FoodStore: Send + Sync {
    async fn list_foods(&self, owner_id: Uuid) -> Result<Vec<Food>, StoreError>;

    /// Fails with `StoreError::UnknownOwner` when no user has the owner id.
    async fn insert_food(&self, food: NewFood) -> Result<Food, StoreError>;

    /// Replaces name, price and description of the food `id` owned by
    /// `owner_id`. `None` when no such record exists for that owner.
    async fn update_owned_food(
        &self,
        id: Uuid,
        owner_id: Uuid,
        fields: FoodFields,
    ) -> Result<Option<Food>, StoreError>;

    /// Removes the food `id` owned by `owner_id`, returning what was removed.
    async fn delete_owned_food(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Food>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Loads a user without its credential.
    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;
}
