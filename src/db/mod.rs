// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite).

pub mod store;

pub use store::{Record, SaveOutcome, Store};

/// Table names as constants.
pub mod tables {
    pub const ACTIVITY: &str = "activity";
    pub const ROUTE: &str = "route";
}

/// Embedded schema, applied on every open.
pub(crate) const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS activity (
        id INTEGER PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        distance REAL NOT NULL,
        moving_time REAL NOT NULL,
        elapsed_time REAL NOT NULL,
        total_elevation_gain REAL NOT NULL,
        "type" TEXT NOT NULL,
        start_date TEXT NOT NULL,
        start_date_local TEXT NOT NULL,
        timezone TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS route (
        id INTEGER PRIMARY KEY NOT NULL,
        athlete_id INTEGER NOT NULL,
        description TEXT,
        distance REAL NOT NULL,
        elevation_gain REAL NOT NULL,
        id_str TEXT NOT NULL,
        map_id TEXT NOT NULL,
        map_polyline TEXT NOT NULL,
        name TEXT NOT NULL,
        private INTEGER NOT NULL,
        resource_state INTEGER NOT NULL,
        starred INTEGER NOT NULL,
        sub_type INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        "type" INTEGER NOT NULL,
        estimated_moving_time INTEGER NOT NULL,
        waypoints TEXT NOT NULL,
        segments TEXT NOT NULL
    )
    "#,
];
