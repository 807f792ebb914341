use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::instrument;

use super::repo_types::{HistoryEntry, RecommendationList};
use super::services::{request_recommendations, HISTORY_LIMIT};
use crate::{
    error::{required, ApiResult},
    extract::ApiQuery,
    places::Shop,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub food_name: Option<String>,
    /// `"longitude,latitude"`
    pub location: Option<String>,
}

pub fn recommendation_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations/food/:name", get(recommend_food))
        .route("/recommendations/nearby", get(nearby_shops))
        .route("/recommendations/history/:name", get(history))
}

#[instrument(skip(state))]
pub async fn recommend_food(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<RecommendationList>> {
    let list = request_recommendations(&state, &name, OffsetDateTime::now_utc()).await?;
    Ok(Json(list))
}

#[instrument(skip(state))]
pub async fn nearby_shops(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<NearbyQuery>,
) -> ApiResult<Json<Vec<Shop>>> {
    let food_name = required(q.food_name, "foodName")?;
    let location = required(q.location, "location")?;
    let shops = state.places.search_shops(&food_name, &location).await?;
    Ok(Json(shops))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let entries = state.store.recent_history(&name, HISTORY_LIMIT).await?;
    Ok(Json(entries))
}
