// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{routing::post, Form, Json, Router};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use strava_archiver::config::Config;
use strava_archiver::db::Store;
use strava_archiver::services::{Credentials, StravaClient};
use tempfile::TempDir;

/// Access token handed out by [`token_route`].
#[allow(dead_code)]
pub const TEST_ACCESS_TOKEN: &str = "test_access_token";

/// Serve `app` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });

    format!("http://{}", addr)
}

/// Base URL of a port nothing is listening on.
#[allow(dead_code)]
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get addr");
    drop(listener);
    format!("http://{}", addr)
}

#[allow(dead_code)]
pub fn test_credentials() -> Credentials {
    Credentials {
        client_id: "test_client_id".to_string(),
        client_secret: "test_secret".to_string(),
        refresh_token: "test_refresh_token".to_string(),
    }
}

/// Client whose API root and token endpoint both live on `base_url`.
#[allow(dead_code)]
pub fn client_for(base_url: &str) -> StravaClient {
    StravaClient::new(
        test_credentials(),
        base_url,
        format!("{}/oauth/token", base_url),
    )
    .expect("Failed to build client")
}

#[allow(dead_code)]
pub fn test_config(base_url: &str, database_path: PathBuf) -> Config {
    let creds = test_credentials();
    Config {
        strava_client_id: creds.client_id,
        strava_client_secret: creds.client_secret,
        strava_refresh_token: creds.refresh_token,
        strava_api_base_url: base_url.to_string(),
        strava_oauth_url: format!("{}/oauth/token", base_url),
        database_path,
        port: 0,
        app_password: None,
    }
}

/// Token endpoint that accepts any refresh-token grant.
#[allow(dead_code)]
pub fn token_route() -> Router {
    Router::new().route(
        "/oauth/token",
        post(|Form(form): Form<HashMap<String, String>>| async move {
            assert_eq!(form.get("grant_type").map(String::as_str), Some("refresh_token"));
            Json(json!({
                "token_type": "Bearer",
                "access_token": TEST_ACCESS_TOKEN,
                "expires_at": 1_900_000_000,
                "expires_in": 21600,
                "refresh_token": "test_refresh_token"
            }))
        }),
    )
}

/// Open a store in a fresh temporary directory.
#[allow(dead_code)]
pub async fn temp_store() -> (Store, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = Store::open(&dir.path().join("test.db"))
        .await
        .expect("Failed to open store");
    (store, dir)
}

/// Create `test.db` in `dir` with an `activity` table that has an extra
/// `NOT NULL` column, so every insert fails without a key collision.
#[allow(dead_code)]
pub async fn conflicting_activity_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("test.db");
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to create database");
    sqlx::query(
        r#"
        CREATE TABLE activity (
            id INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            distance REAL NOT NULL,
            moving_time REAL NOT NULL,
            elapsed_time REAL NOT NULL,
            total_elevation_gain REAL NOT NULL,
            "type" TEXT NOT NULL,
            start_date TEXT NOT NULL,
            start_date_local TEXT NOT NULL,
            timezone TEXT NOT NULL,
            extra TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create conflicting table");
    pool.close().await;
    path
}

#[allow(dead_code)]
pub fn activity_json(id: i64) -> Value {
    json!({
        "resource_state": 2,
        "athlete": { "id": 12345, "resource_state": 1 },
        "name": format!("Activity {}", id),
        "distance": 5000.0,
        "moving_time": 1800,
        "elapsed_time": 1900,
        "total_elevation_gain": 100,
        "type": "Run",
        "sport_type": "Run",
        "id": id,
        "start_date": "2024-01-01T06:00:00Z",
        "start_date_local": "2024-01-01T06:00:00Z",
        "timezone": "(GMT+00:00) GMT"
    })
}

#[allow(dead_code)]
pub fn route_json(id: i64, athlete_id: i64) -> Value {
    json!({
        "athlete": { "id": athlete_id },
        "description": "Scenic route",
        "distance": 10000.0,
        "elevation_gain": 200.0,
        "id": id,
        "id_str": id.to_string(),
        "map": { "id": format!("r{}", id), "polyline": "a~l~Fjk~uOwHJy@P" },
        "name": format!("Route {}", id),
        "private": false,
        "resource_state": 3,
        "starred": false,
        "sub_type": 1,
        "created_at": "2024-01-01T06:00:00Z",
        "updated_at": "2024-01-01T06:00:00Z",
        "timestamp": 1672531200,
        "type": 1,
        "estimated_moving_time": 3600,
        "waypoints": [],
        "segments": []
    })
}

/// Log output captured from a scoped `tracing` subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    #[allow(dead_code)]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

pub struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter(self.0.clone())
    }
}

/// Capture logs on the current thread until the guard is dropped.
#[allow(dead_code)]
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
