// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FatSecret Tracker Server
//!
//! Polls authorized FatSecret accounts and serves today's nutrient totals
//! as sensors.

use fatsecret_tracker::{
    config::Config,
    db::{CredentialStore, FileStore},
    services::IntervalScheduler,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting FatSecret tracker");

    let store: Arc<dyn CredentialStore> = Arc::new(FileStore::open(&config.credentials_path)?);
    let scheduler = Arc::new(IntervalScheduler::new(config.poll_interval));

    let state = Arc::new(AppState::new(config.clone(), store, scheduler)?);

    // Bring up every previously authorized entry
    let ready = state.entries.restore(state.store.as_ref()).await?;
    tracing::info!(entries = ready, "Entries ready");
    if state.entries.is_empty() {
        tracing::info!("No authorized entries; POST /auth/start to add one");
    }

    // Build router
    let app = fatsecret_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fatsecret_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
