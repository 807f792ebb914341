//! AMap (Gaode) REST v3 adapter.
//!
//! AMap reports failures in-band (`status != "1"`) and encodes empty fields
//! as `[]`, so every POI field is read loosely and normalized here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::{
    GeoCode, LookupError, PlacesSearch, ReverseGeoCode, Shop, ShopLocation, PAGE_SIZE,
    SEARCH_RADIUS_M,
};
use crate::config::PlacesConfig;

/// Appended to the food name so the search hits restaurants rather than shops selling ingredients.
const KEYWORD_SUFFIX: &str = "餐馆";

#[derive(Debug, Deserialize)]
pub(crate) struct PlaceTextResponse {
    status: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    pois: Vec<AmapPoi>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AmapPoi {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    address: Value,
    #[serde(default)]
    location: Value,
    #[serde(default)]
    tel: Value,
    #[serde(default)]
    rating: Value,
    #[serde(default)]
    distance: Value,
    #[serde(default, rename = "type")]
    kind: Value,
    #[serde(default)]
    business_area: Value,
    #[serde(default)]
    biz_ext: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeoResponse {
    status: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    geocodes: Vec<GeoItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeoItem {
    #[serde(default)]
    formatted_address: Value,
    #[serde(default)]
    location: Value,
    #[serde(default)]
    province: Value,
    #[serde(default)]
    city: Value,
    #[serde(default)]
    district: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegeoResponse {
    status: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    regeocode: Option<RegeoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegeoItem {
    #[serde(default, rename = "formatted_address")]
    formatted_address: Value,
    #[serde(default)]
    address_component: Value,
    #[serde(default)]
    pois: Value,
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

impl From<AmapPoi> for Shop {
    fn from(p: AmapPoi) -> Self {
        let rating = match number(&p.rating) {
            r if r > 0.0 => r,
            _ => number(&p.biz_ext["rating"]),
        };
        Self {
            id: text(&p.id),
            name: text(&p.name),
            address: text(&p.address),
            location: ShopLocation::from_joined(&text(&p.location)),
            phone: text(&p.tel),
            rating,
            distance: number(&p.distance),
            kind: text(&p.kind),
            business_area: text(&p.business_area),
        }
    }
}

fn check_status(status: &str, info: &str) -> Result<(), LookupError> {
    if status == "1" {
        Ok(())
    } else {
        warn!(%status, %info, "amap rejected request");
        Err(LookupError::Rejected(info.to_owned()))
    }
}

pub(crate) fn shops_from_response(res: PlaceTextResponse) -> Result<Vec<Shop>, LookupError> {
    check_status(&res.status, &res.info)?;
    Ok(res.pois.into_iter().map(Shop::from).collect())
}

pub(crate) fn geocode_from_response(res: GeoResponse) -> Result<GeoCode, LookupError> {
    check_status(&res.status, &res.info)?;
    let g = res.geocodes.into_iter().next().ok_or(LookupError::NoResult)?;
    Ok(GeoCode {
        formatted_address: text(&g.formatted_address),
        location: text(&g.location),
        province: text(&g.province),
        city: text(&g.city),
        district: text(&g.district),
    })
}

pub(crate) fn regeo_from_response(res: RegeoResponse) -> Result<ReverseGeoCode, LookupError> {
    check_status(&res.status, &res.info)?;
    let r = res.regeocode.ok_or(LookupError::NoResult)?;
    let pois = match r.pois {
        Value::Array(_) => r.pois,
        _ => Value::Array(Vec::new()),
    };
    Ok(ReverseGeoCode {
        formatted_address: text(&r.formatted_address),
        address_component: r.address_component,
        pois,
    })
}

pub struct AmapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AmapClient {
    pub fn new(config: &PlacesConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        let url = format!("{}/{}", self.base_url, path);
        let res = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("output", "JSON")])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, %path, "amap request failed");
                LookupError::Transport(e)
            })?;

        let status = res.status();
        if !status.is_success() {
            error!(%status, %path, "amap returned error status");
            return Err(LookupError::Status(status.as_u16()));
        }
        Ok(res.json::<T>().await?)
    }
}

#[async_trait]
impl PlacesSearch for AmapClient {
    #[instrument(skip(self))]
    async fn search_shops(&self, food_name: &str, location: &str) -> Result<Vec<Shop>, LookupError> {
        let keywords = format!("{food_name} {KEYWORD_SUFFIX}");
        let radius = SEARCH_RADIUS_M.to_string();
        let offset = PAGE_SIZE.to_string();
        let res: PlaceTextResponse = self
            .get_json(
                "place/text",
                &[
                    ("keywords", keywords.as_str()),
                    ("location", location),
                    ("radius", radius.as_str()),
                    ("page", "1"),
                    ("offset", offset.as_str()),
                    ("city", ""),
                    ("citylimit", "false"),
                    ("extensions", "base"),
                ],
            )
            .await?;
        let shops = shops_from_response(res)?;
        debug!(count = shops.len(), "shops found");
        Ok(shops)
    }

    #[instrument(skip(self))]
    async fn geocode(&self, address: &str, city: Option<&str>) -> Result<GeoCode, LookupError> {
        let res: GeoResponse = self
            .get_json(
                "geocode/geo",
                &[("address", address), ("city", city.unwrap_or_default())],
            )
            .await?;
        geocode_from_response(res)
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(&self, location: &str) -> Result<ReverseGeoCode, LookupError> {
        let res: RegeoResponse = self
            .get_json(
                "geocode/regeo",
                &[("location", location), ("extensions", "base")],
            )
            .await?;
        regeo_from_response(res)
    }
}
