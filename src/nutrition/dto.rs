use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for logging a meal. Every field is required; they are
/// optional here so a missing one yields a 400 with a message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordNutritionRequest {
    pub user_name: Option<String>,
    pub food_name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RecordedResponse {
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub period: Option<String>,
}
