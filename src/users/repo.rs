use sqlx::{types::Json, PgPool};

use crate::store::StoreError;
use crate::users::repo_types::{Preferences, User, UserRow};

impl User {
    /// Find a user by display name.
    pub async fn find_by_name(db: &PgPool, name: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT name, preferences, created_at, updated_at
            FROM users
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(row.map(User::from))
    }

    /// Create a user with empty preferences. A taken name yields `StoreError::Conflict`.
    pub async fn create(db: &PgPool, name: &str) -> Result<User, StoreError> {
        let res = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name)
            VALUES ($1)
            RETURNING name, preferences, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(db)
        .await;

        match res {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::Conflict(format!("user {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the preferences document. Returns `false` when no such user exists.
    pub async fn replace_preferences(
        db: &PgPool,
        name: &str,
        preferences: &Preferences,
    ) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET preferences = $2, updated_at = now()
             WHERE name = $1
            "#,
        )
        .bind(name)
        .bind(Json(preferences))
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
