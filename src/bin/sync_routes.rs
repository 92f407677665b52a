// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Export the athlete's routes from Strava into the local database.

use strava_archiver::{
    config::Config,
    init_logging,
    services::{self, SyncTarget},
};

#[tokio::main]
async fn main() {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "An error occurred");
            return;
        }
    };

    services::run(&config, SyncTarget::Routes).await;
}
