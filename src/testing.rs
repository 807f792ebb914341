//! In-memory store and stub clients for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::llm::{CompletionRequest, GenerationError, TextGenerator};
use crate::nutrition::repo_types::{NewNutritionRecord, NutritionRecord};
use crate::places::{GeoCode, LookupError, PlacesSearch, ReverseGeoCode, Shop, ShopLocation};
use crate::recommendations::repo_types::{HistoryEntry, MacroBreakdown};
use crate::store::{Store, StoreError};
use crate::users::repo_types::{Preferences, User};

pub fn record_at(
    user: &str,
    calories: i32,
    protein: f64,
    carbs: f64,
    fat: f64,
    at: OffsetDateTime,
) -> NutritionRecord {
    NutritionRecord {
        id: Uuid::new_v4(),
        user_name: user.to_owned(),
        food_name: "meal".to_owned(),
        calories,
        protein,
        carbs,
        fat,
        timestamp: at,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    records: Mutex<Vec<NutritionRecord>>,
    history: Mutex<Vec<(String, HistoryEntry)>>,
}

impl MemoryStore {
    /// Seeds a record with an explicit timestamp.
    pub fn push_record(&self, rec: NutritionRecord) {
        self.records.lock().unwrap().push(rec);
    }

    pub fn users_named(&self, name: &str) -> usize {
        self.users.lock().unwrap().iter().filter(|u| u.name == name).count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, name: &str) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.name == name) {
            return Err(StoreError::Conflict(format!("user {name}")));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            name: name.to_owned(),
            preferences: Preferences::default(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, name: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.name == name).cloned())
    }

    async fn replace_preferences(
        &self,
        name: &str,
        preferences: &Preferences,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.name == name) {
            Some(u) => {
                u.preferences = preferences.clone();
                u.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_record(&self, rec: &NewNutritionRecord) -> Result<NutritionRecord, StoreError> {
        let stored = NutritionRecord {
            id: Uuid::new_v4(),
            user_name: rec.user_name.clone(),
            food_name: rec.food_name.clone(),
            calories: rec.calories,
            protein: rec.protein,
            carbs: rec.carbs,
            fat: rec.fat,
            timestamp: OffsetDateTime::now_utc(),
        };
        self.records.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn records_for_user(&self, user_name: &str) -> Result<Vec<NutritionRecord>, StoreError> {
        let mut out: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_name == user_name)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    async fn records_since(
        &self,
        user_name: &str,
        since: OffsetDateTime,
    ) -> Result<Vec<NutritionRecord>, StoreError> {
        let mut out: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_name == user_name && r.timestamp >= since)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(out)
    }

    async fn insert_history(
        &self,
        user_name: &str,
        food: &str,
        nutrition: &MacroBreakdown,
    ) -> Result<HistoryEntry, StoreError> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            recommended_food: food.to_owned(),
            nutrition_info: *nutrition,
            timestamp: OffsetDateTime::now_utc(),
        };
        self.history
            .lock()
            .unwrap()
            .push((user_name.to_owned(), entry.clone()));
        Ok(entry)
    }

    async fn recent_history(
        &self,
        user_name: &str,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let history = self.history.lock().unwrap();
        // Insertion order is chronological.
        Ok(history
            .iter()
            .rev()
            .filter(|(u, _)| u == user_name)
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|(_, e)| e.clone())
            .collect())
    }
}

/// Store whose every call fails like an unreachable database.
pub struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn create_user(&self, _name: &str) -> Result<User, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
    async fn find_user(&self, _name: &str) -> Result<Option<User>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
    async fn replace_preferences(&self, _n: &str, _p: &Preferences) -> Result<bool, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
    async fn insert_record(&self, _r: &NewNutritionRecord) -> Result<NutritionRecord, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
    async fn records_for_user(&self, _u: &str) -> Result<Vec<NutritionRecord>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
    async fn records_since(
        &self,
        _u: &str,
        _s: OffsetDateTime,
    ) -> Result<Vec<NutritionRecord>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
    async fn insert_history(
        &self,
        _u: &str,
        _f: &str,
        _n: &MacroBreakdown,
    ) -> Result<HistoryEntry, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
    async fn recent_history(&self, _u: &str, _l: i64) -> Result<Vec<HistoryEntry>, StoreError> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}

/// Generator returning a canned reply and remembering the last request.
#[derive(Default)]
pub struct StubGenerator {
    reply: Option<String>,
    last: Mutex<Option<CompletionRequest>>,
}

impl StubGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_owned()),
            last: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        *self.last.lock().unwrap() = Some(request.clone());
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(GenerationError::Status {
                status: 503,
                body: "unavailable".into(),
            }),
        }
    }
}

/// Places search returning a fixed shop list, or failing when `fail` is set.
#[derive(Default)]
pub struct StubPlaces {
    pub shops: Vec<Shop>,
    pub fail: bool,
}

impl StubPlaces {
    pub fn with_shop(name: &str, location: &str) -> Self {
        Self {
            shops: vec![Shop {
                id: "poi-1".into(),
                name: name.into(),
                address: "1 Test Road".into(),
                location: ShopLocation::from_joined(location),
                phone: String::new(),
                rating: 0.0,
                distance: 120.0,
                kind: "restaurant".into(),
                business_area: String::new(),
            }],
            fail: false,
        }
    }

    fn check(&self) -> Result<(), LookupError> {
        if self.fail {
            Err(LookupError::Status(502))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PlacesSearch for StubPlaces {
    async fn search_shops(&self, _food: &str, _location: &str) -> Result<Vec<Shop>, LookupError> {
        self.check()?;
        Ok(self.shops.clone())
    }

    async fn geocode(&self, address: &str, _city: Option<&str>) -> Result<GeoCode, LookupError> {
        self.check()?;
        Ok(GeoCode {
            formatted_address: address.to_owned(),
            location: "116.4,39.9".into(),
            province: String::new(),
            city: String::new(),
            district: String::new(),
        })
    }

    async fn reverse_geocode(&self, location: &str) -> Result<ReverseGeoCode, LookupError> {
        self.check()?;
        Ok(ReverseGeoCode {
            formatted_address: format!("near {location}"),
            address_component: serde_json::Value::Null,
            pois: serde_json::Value::Array(Vec::new()),
        })
    }
}
