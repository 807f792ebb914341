use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::{GeoCode, ReverseGeoCode};
use crate::{
    error::{required, ApiResult},
    extract::ApiQuery,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegeoQuery {
    pub location: Option<String>,
}

pub fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/location/geocode", get(geocode))
        .route("/location/regeo", get(reverse_geocode))
}

#[instrument(skip(state))]
pub async fn geocode(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<GeocodeQuery>,
) -> ApiResult<Json<GeoCode>> {
    let address = required(q.address, "address")?;
    let city = q.city.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let geo = state.places.geocode(&address, city).await?;
    Ok(Json(geo))
}

#[instrument(skip(state))]
pub async fn reverse_geocode(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<RegeoQuery>,
) -> ApiResult<Json<ReverseGeoCode>> {
    let location = required(q.location, "location")?;
    let regeo = state.places.reverse_geocode(&location).await?;
    Ok(Json(regeo))
}
