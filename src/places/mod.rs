use async_trait::async_trait;
use axum::Router;
use serde::Serialize;
use thiserror::Error;

use crate::state::AppState;

pub mod amap;
mod handlers;

/// Search radius around the caller's position, in meters.
pub const SEARCH_RADIUS_M: u32 = 5000;
pub const PAGE_SIZE: u32 = 10;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("lookup failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("lookup failed: places service returned HTTP {0}")]
    Status(u16),

    #[error("lookup failed: {0}")]
    Rejected(String),

    #[error("lookup failed: no result")]
    NoResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopLocation {
    pub longitude: String,
    pub latitude: String,
}

impl ShopLocation {
    /// Splits AMap's `"lng,lat"` string; missing halves become empty.
    pub fn from_joined(raw: &str) -> Self {
        let mut parts = raw.splitn(2, ',');
        Self {
            longitude: parts.next().unwrap_or_default().trim().to_owned(),
            latitude: parts.next().unwrap_or_default().trim().to_owned(),
        }
    }
}

/// A shop near the caller that serves the searched food.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: ShopLocation,
    pub phone: String,
    pub rating: f64,
    pub distance: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub business_area: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCode {
    pub formatted_address: String,
    pub location: String,
    pub province: String,
    pub city: String,
    pub district: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeoCode {
    pub formatted_address: String,
    pub address_component: serde_json::Value,
    pub pois: serde_json::Value,
}

#[async_trait]
pub trait PlacesSearch: Send + Sync {
    /// `location` is `"longitude,latitude"`.
    async fn search_shops(&self, food_name: &str, location: &str) -> Result<Vec<Shop>, LookupError>;
    async fn geocode(&self, address: &str, city: Option<&str>) -> Result<GeoCode, LookupError>;
    async fn reverse_geocode(&self, location: &str) -> Result<ReverseGeoCode, LookupError>;
}

pub fn router() -> Router<AppState> {
    handlers::location_routes()
}
