use axum::Json;
use serde_json::{json, Value};

use crate::models::menu::MEAL_SLOTS;

/// GET /menu: dish slots in form order
pub async fn list_slots() -> Json<Value> {
    Json(json!({ "slots": MEAL_SLOTS }))
}
