use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dto::{RecordNutritionRequest, RecordedResponse, StatsQuery};
use super::repo_types::{NewNutritionRecord, NutritionRecord};
use super::services::{periodic_stats, recent_analysis, DailyTotals, NutritionAnalysis, Period};
use crate::{
    error::{required, ApiError, ApiResult},
    extract::{ApiJson, ApiQuery},
    state::AppState,
};

pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition/record", post(record_nutrition))
        .route("/nutrition/analysis/:name", get(get_analysis))
        .route("/nutrition/records/:name", get(list_records))
        .route("/nutrition/stats/:name", get(get_stats))
}

fn macro_value(v: Option<f64>, field: &str) -> ApiResult<f64> {
    match v {
        Some(x) if x.is_finite() && x >= 0.0 => Ok(x),
        Some(_) => Err(ApiError::Validation(format!("{field} must be a non-negative number"))),
        None => Err(ApiError::Validation(format!("{field} is required"))),
    }
}

impl TryFrom<RecordNutritionRequest> for NewNutritionRecord {
    type Error = ApiError;

    fn try_from(body: RecordNutritionRequest) -> Result<Self, Self::Error> {
        let user_name = required(body.user_name, "userName")?;
        let food_name = required(body.food_name, "foodName")?;
        let calories = macro_value(body.calories, "calories")?;
        if calories > f64::from(i32::MAX) {
            return Err(ApiError::Validation("calories out of range".into()));
        }
        Ok(Self {
            user_name,
            food_name,
            calories: calories.round() as i32,
            protein: macro_value(body.protein, "protein")?,
            carbs: macro_value(body.carbs, "carbs")?,
            fat: macro_value(body.fat, "fat")?,
        })
    }
}

#[instrument(skip(state, body))]
pub async fn record_nutrition(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RecordNutritionRequest>,
) -> ApiResult<(StatusCode, Json<RecordedResponse>)> {
    let rec = NewNutritionRecord::try_from(body)?;

    if state.store.find_user(&rec.user_name).await?.is_none() {
        return Err(ApiError::NotFound(format!("user {} not found", rec.user_name)));
    }

    let stored = state.store.insert_record(&rec).await?;
    info!(user = %stored.user_name, id = %stored.id, "nutrition recorded");
    Ok((
        StatusCode::CREATED,
        Json(RecordedResponse {
            id: stored.id,
            message: "nutrition recorded".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Option<NutritionAnalysis>>> {
    let analysis = recent_analysis(state.store.as_ref(), &name, OffsetDateTime::now_utc()).await?;
    Ok(Json(analysis))
}

#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<NutritionRecord>>> {
    let records = state.store.records_for_user(&name).await?;
    Ok(Json(records))
}

#[instrument(skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ApiQuery(q): ApiQuery<StatsQuery>,
) -> ApiResult<Json<Vec<DailyTotals>>> {
    let period = Period::from_query(q.period.as_deref());
    let stats = periodic_stats(state.store.as_ref(), &name, period, OffsetDateTime::now_utc()).await?;
    Ok(Json(stats))
}
