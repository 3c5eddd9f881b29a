use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, put},
    Extension, Router,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::TokenService;
use crate::database::{Food, FoodFields, FoodStore, NewFood};
use crate::error::ApiError;
use crate::handlers::{is_truthy, ApiJson, RequiredFields};
use crate::middleware::{jwt_auth_middleware, ApiResponse, ApiResult, AuthUser};

const ALL_FIELDS_REQUIRED: &str = "All fields are required";
const NOT_FOUND_OR_UNAUTHORIZED: &str = "Food item not found or unauthorized";
const SERVER_ERROR: &str = "Server error";

/// /foods and /foods/:id, all behind bearer authentication.
pub fn routes(store: Arc<dyn FoodStore>, tokens: TokenService) -> Router {
    Router::new()
        .route("/foods", get(list).post(create))
        .route("/foods/:id", put(update).delete(remove))
        .route_layer(from_fn_with_state(tokens, jwt_auth_middleware))
        .with_state(store)
}

/// Request body for create and update. Anything else the client sends,
/// `id` and `ownerId` included, is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct FoodPayload {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    pub description: Option<String>,
}

/// Accepts a JSON number or a numeric string such as `"3.50"`. Anything else
/// reads as absent so it is reported with the other missing fields.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let price = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(price)
}

impl FoodPayload {
    /// All three fields must be present and non-empty; a price of zero
    /// counts as missing. Strings are stored as sent, whitespace included.
    pub fn validate(self) -> Result<FoodFields, ApiError> {
        let mut required = RequiredFields::default();
        required.check("name", is_truthy(&self.name));
        required.check(
            "price",
            self.price.is_some_and(|p| p != 0.0 && p.is_finite()),
        );
        required.check("description", is_truthy(&self.description));
        required.finish(ALL_FIELDS_REQUIRED)?;

        match (self.name, self.price, self.description) {
            (Some(name), Some(price), Some(description)) => Ok(FoodFields {
                name,
                price,
                description,
            }),
            _ => Err(ApiError::bad_request(ALL_FIELDS_REQUIRED)),
        }
    }
}

/// Ids that are not UUIDs cannot name any record, so they get the same 404.
fn parse_food_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::not_found(NOT_FOUND_OR_UNAUTHORIZED))
}

/// GET /foods - every food owned by the caller
pub async fn list(
    State(store): State<Arc<dyn FoodStore>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Food>> {
    let foods = store
        .list_foods(user.user_id)
        .await
        .map_err(ApiError::from_store("Error fetching food items", SERVER_ERROR))?;

    Ok(ApiResponse::success(foods))
}

/// POST /foods - create a food owned by the caller
pub async fn create(
    State(store): State<Arc<dyn FoodStore>>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<FoodPayload>,
) -> ApiResult<Food> {
    let fields = payload.validate()?;

    let food = store
        .insert_food(NewFood::new(user.user_id, fields))
        .await
        .map_err(ApiError::from_store("Error saving food item", SERVER_ERROR))?;

    tracing::debug!("User {} created food {}", user.user_id, food.id);
    Ok(ApiResponse::created(food))
}

/// PUT /foods/:id - replace name, price and description of one of the caller's foods
pub async fn update(
    State(store): State<Arc<dyn FoodStore>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<FoodPayload>,
) -> ApiResult<Food> {
    let fields = payload.validate()?;
    let id = parse_food_id(&id)?;

    let food = store
        .update_owned_food(id, user.user_id, fields)
        .await
        .map_err(ApiError::from_store("Error updating food item", SERVER_ERROR))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND_OR_UNAUTHORIZED))?;

    Ok(ApiResponse::success(food))
}

/// DELETE /foods/:id - remove one of the caller's foods
pub async fn remove(
    State(store): State<Arc<dyn FoodStore>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_food_id(&id)?;

    store
        .delete_owned_food(id, user.user_id)
        .await
        .map_err(ApiError::from_store("Error deleting food item", SERVER_ERROR))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND_OR_UNAUTHORIZED))?;

    tracing::debug!("User {} deleted food {}", user.user_id, id);
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn payload(name: Option<&str>, price: Option<f64>, description: Option<&str>) -> FoodPayload {
        FoodPayload {
            name: name.map(str::to_string),
            price,
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn complete_payload_validates() {
        let fields = payload(Some("Taco"), Some(3.0), Some("spicy"))
            .validate()
            .unwrap();
        assert_eq!(fields.name, "Taco");
        assert_eq!(fields.price, 3.0);
        assert_eq!(fields.description, "spicy");
    }

    #[test]
    fn missing_or_falsy_fields_are_reported() {
        let err = payload(Some(""), Some(0.0), None).validate().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = err.to_json();
        assert_eq!(body["error"], ALL_FIELDS_REQUIRED);
        let fields = body["fields"].as_object().unwrap();
        assert_eq!(fields.len(), 3);
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("description"));
    }

    #[test]
    fn whitespace_strings_are_truthy() {
        let fields = payload(Some("   "), Some(3.0), Some(" "))
            .validate()
            .unwrap();
        assert_eq!(fields.name, "   ");
        assert_eq!(fields.description, " ");
    }

    #[test]
    fn price_accepts_numeric_strings() {
        let parsed: FoodPayload =
            serde_json::from_str(r#"{"name":"Taco","price":"3.5","description":"spicy"}"#).unwrap();
        assert_eq!(parsed.price, Some(3.5));

        let parsed: FoodPayload =
            serde_json::from_str(r#"{"name":"Taco","price":"cheap","description":"spicy"}"#)
                .unwrap();
        assert_eq!(parsed.price, None);

        let parsed: FoodPayload = serde_json::from_str(r#"{"name":"Taco"}"#).unwrap();
        assert_eq!(parsed.price, None);
    }

    #[test]
    fn negative_price_is_accepted() {
        assert!(payload(Some("Refund"), Some(-2.5), Some("credit"))
            .validate()
            .is_ok());
    }

    #[test]
    fn malformed_id_is_not_found() {
        let err = parse_food_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), NOT_FOUND_OR_UNAUTHORIZED);
    }
}
