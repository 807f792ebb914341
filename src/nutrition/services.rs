use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use time::{Date, Duration, OffsetDateTime, UtcOffset};
use tracing::{debug, error};

use crate::nutrition::repo_types::NutritionRecord;
use crate::store::{Store, StoreError};

/// Length of the rolling window used for recommendations.
pub const RECENT_WINDOW_DAYS: i64 = 3;

#[derive(Error, Debug)]
#[error("aggregation failed")]
pub struct AggregationError(#[from] pub StoreError);

/// Averages over the rolling window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionAnalysis {
    pub avg_calories: i64,
    pub avg_protein: f64,
    pub avg_carbs: f64,
    pub avg_fat: f64,
    pub total_records: usize,
}

/// Summed macros of one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub date: String,
    pub total_calories: i64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
}

impl Period {
    /// Anything other than `month` selects a week.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("month") => Period::Month,
            _ => Period::Week,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Mean of each macro; `None` for an empty slice.
pub fn analyze(records: &[NutritionRecord]) -> Option<NutritionAnalysis> {
    if records.is_empty() {
        return None;
    }
    let n = records.len() as f64;
    let (cal, protein, carbs, fat) = records.iter().fold(
        (0i64, 0.0f64, 0.0f64, 0.0f64),
        |(c, p, cb, f), r| (c + i64::from(r.calories), p + r.protein, cb + r.carbs, f + r.fat),
    );
    Some(NutritionAnalysis {
        avg_calories: (cal as f64 / n).round() as i64,
        avg_protein: round1(protein / n),
        avg_carbs: round1(carbs / n),
        avg_fat: round1(fat / n),
        total_records: records.len(),
    })
}

/// Per-day sums, ascending by date.
pub fn daily_totals(records: &[NutritionRecord]) -> Vec<DailyTotals> {
    let mut days: BTreeMap<Date, DailyTotals> = BTreeMap::new();
    for r in records {
        let day = r.timestamp.to_offset(UtcOffset::UTC).date();
        let entry = days.entry(day).or_insert_with(|| DailyTotals {
            date: day.to_string(),
            total_calories: 0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
        });
        entry.total_calories += i64::from(r.calories);
        entry.total_protein += r.protein;
        entry.total_carbs += r.carbs;
        entry.total_fat += r.fat;
    }
    days.into_values().collect()
}

/// Averages over the last three days, or `None` when nothing was logged.
pub async fn recent_analysis(
    store: &dyn Store,
    user_name: &str,
    now: OffsetDateTime,
) -> Result<Option<NutritionAnalysis>, AggregationError> {
    let since = now - Duration::days(RECENT_WINDOW_DAYS);
    let records = store.records_since(user_name, since).await.map_err(|e| {
        error!(error = %e, user = %user_name, "recent analysis read failed");
        AggregationError(e)
    })?;
    debug!(user = %user_name, count = records.len(), "recent records loaded");
    Ok(analyze(&records))
}

pub async fn periodic_stats(
    store: &dyn Store,
    user_name: &str,
    period: Period,
    now: OffsetDateTime,
) -> Result<Vec<DailyTotals>, AggregationError> {
    let since = now - Duration::days(period.days());
    let records = store.records_since(user_name, since).await.map_err(|e| {
        error!(error = %e, user = %user_name, ?period, "periodic stats read failed");
        AggregationError(e)
    })?;
    Ok(daily_totals(&records))
}
