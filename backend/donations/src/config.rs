//! Application configuration loaded from environment variables.

use axum::http::HeaderValue;

use crate::errors::{Result, ServiceError};

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_url: String,
    /// Interface the REST API binds to
    pub api_host: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// The only origin allowed to call the API from a browser
    pub cors_origin: HeaderValue,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let cors_origin = env_var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./food_connect.db".to_string()),
            api_host: env_var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| ServiceError::Config("Invalid API_PORT".to_string()))?,
            cors_origin: cors_origin
                .parse()
                .map_err(|_| ServiceError::Config(format!("Invalid CORS_ORIGIN: {cors_origin}")))?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ServiceError::Config(format!("Missing env var: {key}")))
}
