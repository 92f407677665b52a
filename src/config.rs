// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Strava secrets are read once at startup; a `.env` file in the working
//! directory is honoured for local runs.

use std::env;
use std::path::PathBuf;

/// Default Strava REST API root.
pub const DEFAULT_API_BASE_URL: &str = "https://www.strava.com/api/v3";

/// Default Strava token exchange endpoint.
pub const DEFAULT_OAUTH_URL: &str = "https://www.strava.com/oauth/token";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Secrets ---
    /// Strava OAuth client ID
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Long-lived refresh token exchanged for an access token on every run
    pub strava_refresh_token: String,

    // --- Endpoints ---
    pub strava_api_base_url: String,
    pub strava_oauth_url: String,

    /// SQLite database file
    pub database_path: PathBuf,

    // --- Greeting server ---
    pub port: u16,
    /// Password guarding the greeting endpoint
    pub app_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: required("STRAVA_CLIENT_ID")?,
            strava_client_secret: required("STRAVA_CLIENT_SECRET")?,
            strava_refresh_token: required("STRAVA_REFRESH_TOKEN")?,
            strava_api_base_url: env::var("STRAVA_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            strava_oauth_url: env::var("STRAVA_OAUTH_URL")
                .unwrap_or_else(|_| DEFAULT_OAUTH_URL.to_string()),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "database.db".to_string())
                .into(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            app_password: env::var("APP_PASSWORD")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
