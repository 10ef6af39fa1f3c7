use sqlx::PgExecutor;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::industry::Industry;

pub async fn list<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<Industry>, AppError> {
    let industries = sqlx::query_as::<_, Industry>("SELECT industry_id, name FROM industries ORDER BY name")
        .fetch_all(executor)
        .await?;
    Ok(industries)
}

pub async fn find<'e, E: PgExecutor<'e>>(executor: E, industry_id: Uuid) -> Result<Industry, AppError> {
    sqlx::query_as::<_, Industry>("SELECT industry_id, name FROM industries WHERE industry_id = $1")
        .bind(industry_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Industry not found".to_string()))
}

/// Inserts a new industry. A taken name surfaces as `AppError::Conflict`.
pub async fn create<'e, E: PgExecutor<'e>>(executor: E, name: &str) -> Result<Industry, AppError> {
    let industry = sqlx::query_as::<_, Industry>(
        "INSERT INTO industries (industry_id, name) VALUES ($1, $2) RETURNING industry_id, name",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(executor)
    .await?;
    Ok(industry)
}

/// Returns the id of the industry called `name`, creating it if needed.
pub async fn get_or_create<'e, E: PgExecutor<'e>>(executor: E, name: &str) -> Result<Uuid, AppError> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    let industry_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO industries (industry_id, name) VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING industry_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(executor)
    .await?;
    Ok(industry_id)
}

/// Deletes an industry; its employees go with it.
pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, industry_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM industries WHERE industry_id = $1")
        .bind(industry_id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Industry not found".to_string()));
    }
    Ok(())
}
