use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;

/// Food preferences stored per user.
///
/// The four known fields drive prompt construction; anything else a client
/// sends is kept in `extra` so the stored document round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taste: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_restrictions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine_preferences: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Preferences {
    pub fn taste(&self) -> Option<&str> {
        non_blank(&self.taste)
    }

    pub fn dietary_restrictions(&self) -> Option<&str> {
        non_blank(&self.dietary_restrictions)
    }

    pub fn cuisine_preferences(&self) -> Option<&str> {
        non_blank(&self.cuisine_preferences)
    }

    pub fn budget(&self) -> Option<&str> {
        non_blank(&self.budget)
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Row shape of the `users` table.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub name: String,
    pub preferences: Json<Preferences>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Stored rows serialize with their column names, like records and history.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub name: String,
    pub preferences: Preferences,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            name: r.name,
            preferences: r.preferences.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
