// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Archiver: export Strava activities and routes into SQLite.
//!
//! This crate exchanges a stored refresh token for an access token, pages
//! through the Strava API, maps the JSON records onto a fixed schema and
//! saves them with all-or-nothing batch inserts.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shared state for the greeting server.
pub struct AppState {
    /// Password required by the protected routes
    pub password: String,
}

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "strava_archiver=debug,info";

/// Initialize structured JSON logging.
pub fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(log_filter())
        .with(format)
        .init();
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
