use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;

use tokio::net::TcpListener;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting albums service");

    let config = AppConfig::load()?;
    let address = config.bind_address();

    let app_state = AppState::from_config(config).await?;
    info!("Albums service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&address).await?;
    info!("Albums service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
