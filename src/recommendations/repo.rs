use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::recommendations::repo_types::{HistoryEntry, HistoryRow, MacroBreakdown};
use crate::store::StoreError;

pub async fn insert_history(
    db: &PgPool,
    user_name: &str,
    food: &str,
    nutrition: &MacroBreakdown,
) -> Result<HistoryEntry, StoreError> {
    let row = sqlx::query_as::<_, HistoryRow>(
        r#"
        INSERT INTO food_recommendations (id, user_name, recommended_food, nutrition_info)
        VALUES ($1, $2, $3, $4)
        RETURNING id, recommended_food, nutrition_info, recorded_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_name)
    .bind(food)
    .bind(Json(nutrition))
    .fetch_one(db)
    .await?;
    Ok(row.into())
}

/// Most recent history entries of a user, newest first.
pub async fn list_recent(
    db: &PgPool,
    user_name: &str,
    limit: i64,
) -> Result<Vec<HistoryEntry>, StoreError> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT id, recommended_food, nutrition_info, recorded_at
        FROM food_recommendations
        WHERE user_name = $1
        ORDER BY recorded_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_name)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(HistoryEntry::from).collect())
}
