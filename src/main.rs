mod config;
mod db;
mod errors;
mod handlers;
mod importer;
mod models;
mod stats;
mod utils;

use std::path::PathBuf;

use actix_web::{middleware, web, App, HttpServer};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::info;
use sqlx::PgPool;

use crate::config::Settings;
use crate::errors::AppError;

#[derive(Parser)]
#[command(about = "HR employee records and salary statistics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Apply database migrations
    Migrate,
    /// Import employees from a JSON file
    Import { file: PathBuf },
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let pool = db::create_pool(&settings).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&settings, pool).await?,
        Command::Migrate => db::run_migrations(&pool).await?,
        Command::Import { file } => {
            importer::run(&pool, &file).await?;
        }
    }
    Ok(())
}

async fn serve(settings: &Settings, pool: PgPool) -> Result<(), AppError> {
    let (host, port) = settings.bind_address();
    info!("Starting server at {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(handlers::json_config())
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}
