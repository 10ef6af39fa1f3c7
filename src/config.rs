use std::env;

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
}

impl Settings {
    /// Reads settings from the environment. Call `dotenv().ok()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT must be a valid port number, got '{}'", raw)))?,
            None => 8080,
        };

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a positive integer, got '{}'", raw))
            })?,
            None => 5,
        };

        Ok(Settings {
            database_url,
            host,
            port,
            database_max_connections,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
