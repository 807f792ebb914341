use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Macro breakdown of a recommended food, as returned by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroBreakdown {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub description: String,
    pub nutrition: MacroBreakdown,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationList {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, FromRow)]
pub struct HistoryRow {
    pub id: Uuid,
    pub recommended_food: String,
    pub nutrition_info: Json<MacroBreakdown>,
    pub recorded_at: OffsetDateTime,
}

/// A previously recommended food.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub recommended_food: String,
    pub nutrition_info: MacroBreakdown,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(r: HistoryRow) -> Self {
        Self {
            id: r.id,
            recommended_food: r.recommended_food,
            nutrition_info: r.nutrition_info.0,
            timestamp: r.recorded_at,
        }
    }
}
