// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Archiver greeting server
//!
//! Serves the password-gated root endpoint. The exports themselves run as
//! the `sync-activities` and `sync-routes` binaries.

use anyhow::Context;
use std::sync::Arc;
use strava_archiver::{config::Config, init_logging, routes::create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    let password = config
        .app_password
        .clone()
        .context("APP_PASSWORD must be set to serve the greeting endpoint")?;
    tracing::info!(port = config.port, "Starting Strava-Archiver server");

    let state = Arc::new(AppState { password });
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
