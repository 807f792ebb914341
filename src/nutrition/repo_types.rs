use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One logged meal with its four macros.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct NutritionRecord {
    pub id: Uuid,
    pub user_name: String,
    pub food_name: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[sqlx(rename = "recorded_at")]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Validated input for appending a record.
#[derive(Debug, Clone)]
pub struct NewNutritionRecord {
    pub user_name: String,
    pub food_name: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}
