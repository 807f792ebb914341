use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;

use crate::nutrition::repo as nutrition_repo;
use crate::nutrition::repo_types::{NewNutritionRecord, NutritionRecord};
use crate::recommendations::repo as history_repo;
use crate::recommendations::repo_types::{HistoryEntry, MacroBreakdown};
use crate::users::repo_types::{Preferences, User};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence used by every component; injected through `AppState`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, name: &str) -> Result<User, StoreError>;
    async fn find_user(&self, name: &str) -> Result<Option<User>, StoreError>;
    /// Returns `false` when the user does not exist.
    async fn replace_preferences(
        &self,
        name: &str,
        preferences: &Preferences,
    ) -> Result<bool, StoreError>;

    async fn insert_record(&self, rec: &NewNutritionRecord) -> Result<NutritionRecord, StoreError>;
    /// Newest first.
    async fn records_for_user(&self, user_name: &str) -> Result<Vec<NutritionRecord>, StoreError>;
    async fn records_since(
        &self,
        user_name: &str,
        since: OffsetDateTime,
    ) -> Result<Vec<NutritionRecord>, StoreError>;

    async fn insert_history(
        &self,
        user_name: &str,
        food: &str,
        nutrition: &MacroBreakdown,
    ) -> Result<HistoryEntry, StoreError>;
    /// Newest first, at most `limit` entries.
    async fn recent_history(
        &self,
        user_name: &str,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, StoreError>;
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, name: &str) -> Result<User, StoreError> {
        User::create(&self.db, name).await
    }

    async fn find_user(&self, name: &str) -> Result<Option<User>, StoreError> {
        User::find_by_name(&self.db, name).await
    }

    async fn replace_preferences(
        &self,
        name: &str,
        preferences: &Preferences,
    ) -> Result<bool, StoreError> {
        User::replace_preferences(&self.db, name, preferences).await
    }

    async fn insert_record(&self, rec: &NewNutritionRecord) -> Result<NutritionRecord, StoreError> {
        nutrition_repo::insert_record(&self.db, rec).await
    }

    async fn records_for_user(&self, user_name: &str) -> Result<Vec<NutritionRecord>, StoreError> {
        nutrition_repo::list_by_user(&self.db, user_name).await
    }

    async fn records_since(
        &self,
        user_name: &str,
        since: OffsetDateTime,
    ) -> Result<Vec<NutritionRecord>, StoreError> {
        nutrition_repo::list_since(&self.db, user_name, since).await
    }

    async fn insert_history(
        &self,
        user_name: &str,
        food: &str,
        nutrition: &MacroBreakdown,
    ) -> Result<HistoryEntry, StoreError> {
        history_repo::insert_history(&self.db, user_name, food, nutrition).await
    }

    async fn recent_history(
        &self,
        user_name: &str,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        history_repo::list_recent(&self.db, user_name, limit).await
    }
}
