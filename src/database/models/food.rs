use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub owner_id: Uuid,
}

/// The client-editable part of a food record.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodFields {
    pub name: String,
    pub price: f64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewFood {
    pub owner_id: Uuid,
    pub fields: FoodFields,
}

impl NewFood {
    pub fn new(owner_id: Uuid, fields: FoodFields) -> Self {
        Self { owner_id, fields }
    }

    pub fn into_food(self, id: Uuid) -> Food {
        Food {
            id,
            name: self.fields.name,
            price: self.fields.price,
            description: self.fields.description,
            owner_id: self.owner_id,
        }
    }
}

impl Food {
    pub fn apply(&mut self, fields: FoodFields) {
        self.name = fields.name;
        self.price = fields.price;
        self.description = fields.description;
    }
}
