//! Food Connect donation service — entry point.
//!
//! Donors submit surplus food through the web form, the dashboard lists
//! open donations, and receivers claim them. Everything is persisted to a
//! single SQLite table and exposed as a small Axum REST API.

mod api;
mod config;
mod db;
mod distance;
mod errors;
mod models;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use distance::RandomDistance;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load optional .env file (ignored if missing) before anything reads the
    // environment, RUST_LOG included.
    let _ = dotenvy::dotenv();

    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Creates the database file and the donations table if they are missing.
    let pool = db::init_pool(&config.database_url).await?;
    info!("Database {} ready", config.database_url);

    let state = Arc::new(api::ApiState {
        pool,
        distance: Arc::new(RandomDistance),
    });
    let app = api::router(state, config.cors_origin.clone());

    let addr = config.bind_addr();
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
