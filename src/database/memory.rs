use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Food, FoodFields, FoodStore, HealthCheck, NewFood, NewUser, StoreError, User, UserProfile,
    UserStore,
};

/// In-process store used by tests and `serve --in-memory`. Each owner-scoped
/// mutation runs under one write guard, so lookup and change cannot interleave
/// with another request. Foods must reference a stored user, matching the
/// `foods.owner_id` foreign key.
#[derive(Default)]
pub struct MemoryStore {
    foods: RwLock<Vec<Food>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FoodStore for MemoryStore {
    async fn list_foods(&self, owner_id: Uuid) -> Result<Vec<Food>, StoreError> {
        let foods = self.foods.read().await;
        Ok(foods
            .iter()
            .filter(|food| food.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_food(&self, food: NewFood) -> Result<Food, StoreError> {
        if !self.users.read().await.contains_key(&food.owner_id) {
            return Err(StoreError::UnknownOwner(food.owner_id));
        }
        let food = food.into_food(Uuid::new_v4());
        self.foods.write().await.push(food.clone());
        Ok(food)
    }

    async fn update_owned_food(
        &self,
        id: Uuid,
        owner_id: Uuid,
        fields: FoodFields,
    ) -> Result<Option<Food>, StoreError> {
        let mut foods = self.foods.write().await;
        let Some(food) = foods
            .iter_mut()
            .find(|food| food.id == id && food.owner_id == owner_id)
        else {
            return Ok(None);
        };
        food.apply(fields);
        Ok(Some(food.clone()))
    }

    async fn delete_owned_food(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Food>, StoreError> {
        let mut foods = self.foods.write().await;
        let position = foods
            .iter()
            .position(|food| food.id == id && food.owner_id == owner_id);
        Ok(position.map(|index| foods.remove(index)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.read().await.get(&id).map(User::profile))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
