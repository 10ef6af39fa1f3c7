pub mod employees;
pub mod industries;

use log::info;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Settings;
use crate::errors::AppError;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn create_pool(settings: &Settings) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;
    info!("Connected to the database");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    info!("Migrations applied successfully");
    Ok(())
}
