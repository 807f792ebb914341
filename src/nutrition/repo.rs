use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::repo_types::{NewNutritionRecord, NutritionRecord};
use crate::store::StoreError;

pub async fn insert_record(
    db: &PgPool,
    rec: &NewNutritionRecord,
) -> Result<NutritionRecord, StoreError> {
    let row = sqlx::query_as::<_, NutritionRecord>(
        r#"
        INSERT INTO nutrition_records (id, user_name, food_name, calories, protein, carbs, fat)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_name, food_name, calories, protein, carbs, fat, recorded_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&rec.user_name)
    .bind(&rec.food_name)
    .bind(rec.calories)
    .bind(rec.protein)
    .bind(rec.carbs)
    .bind(rec.fat)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// All records of a user, newest first.
pub async fn list_by_user(db: &PgPool, user_name: &str) -> Result<Vec<NutritionRecord>, StoreError> {
    let rows = sqlx::query_as::<_, NutritionRecord>(
        r#"
        SELECT id, user_name, food_name, calories, protein, carbs, fat, recorded_at
        FROM nutrition_records
        WHERE user_name = $1
        ORDER BY recorded_at DESC
        "#,
    )
    .bind(user_name)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Records of a user at or after `since`, oldest first.
pub async fn list_since(
    db: &PgPool,
    user_name: &str,
    since: OffsetDateTime,
) -> Result<Vec<NutritionRecord>, StoreError> {
    let rows = sqlx::query_as::<_, NutritionRecord>(
        r#"
        SELECT id, user_name, food_name, calories, protein, carbs, fat, recorded_at
        FROM nutrition_records
        WHERE user_name = $1 AND recorded_at >= $2
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(user_name)
    .bind(since)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
