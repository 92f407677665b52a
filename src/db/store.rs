// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite store with all-or-nothing batch inserts.
//!
//! A batch is inserted inside one transaction. If any row collides with an
//! existing primary key (or with another row of the same batch) the whole
//! transaction is rolled back and nothing from that batch is kept.

use super::{tables, SCHEMA};
use crate::error::{AppError, Result};
use crate::models::{Activity, Route};
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteJournalMode,
    SqlitePool, SqlitePoolOptions,
};
use std::path::Path;
use std::time::Duration;

/// A row type the store knows how to insert.
pub trait Record {
    const TABLE: &'static str;
    const INSERT_SQL: &'static str;

    /// Bind this record's values in `INSERT_SQL` column order.
    fn bind<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>>;
}

/// What a call to [`Store::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing to save; no transaction was opened.
    Empty,
    /// Every record in the batch was committed.
    Saved(usize),
    /// A primary key collided and the whole batch was rolled back.
    Duplicate,
}

/// Handle to the local SQLite database.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database file and apply the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        // One writer, one transaction at a time.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&pool).await?;
        }

        tracing::debug!(path = %path.display(), "Database opened");
        Ok(Self { pool })
    }

    /// Close the underlying pool, waiting for the connection to be released.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Insert `records` as one unit of work.
    ///
    /// Returns [`SaveOutcome::Duplicate`] (after a full rollback) when any
    /// row collides on its primary key; every other database failure is
    /// rolled back and returned as [`AppError::Storage`].
    pub async fn save<R: Record>(&self, records: &[R]) -> Result<SaveOutcome> {
        if records.is_empty() {
            return Ok(SaveOutcome::Empty);
        }

        let mut tx = self.pool.begin().await?;

        if let Err(e) = insert_all(&mut tx, records).await {
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(table = R::TABLE, error = %rollback, "Rollback failed");
            }
            return Self::failed::<R>(e);
        }

        // A failed commit leaves nothing behind; the transaction is dropped.
        if let Err(e) = tx.commit().await {
            return Self::failed::<R>(e);
        }

        tracing::info!(
            table = R::TABLE,
            count = records.len(),
            "Successfully saved {} records to the database.",
            records.len()
        );
        Ok(SaveOutcome::Saved(records.len()))
    }

    fn failed<R: Record>(err: sqlx::Error) -> Result<SaveOutcome> {
        if is_duplicate_key(&err) {
            tracing::warn!(
                table = R::TABLE,
                error = %err,
                "Operation cancelled: Some records already exist in the database."
            );
            return Ok(SaveOutcome::Duplicate);
        }

        tracing::error!(table = R::TABLE, error = %err, "Failed to save records");
        Err(AppError::Storage(err.to_string()))
    }

    /// Number of rows currently stored for `R`.
    pub async fn count<R: Record>(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Stored primary keys for `R` in ascending order.
    pub async fn ids<R: Record>(&self) -> Result<Vec<i64>> {
        let sql = format!("SELECT id FROM {} ORDER BY id", R::TABLE);
        let ids = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

async fn insert_all<R: Record>(
    conn: &mut SqliteConnection,
    records: &[R],
) -> std::result::Result<(), sqlx::Error> {
    for record in records {
        record
            .bind(sqlx::query(R::INSERT_SQL))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn is_duplicate_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() || db.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

impl Record for Activity {
    const TABLE: &'static str = tables::ACTIVITY;
    const INSERT_SQL: &'static str = r#"
        INSERT INTO activity (
            id, name, distance, moving_time, elapsed_time, total_elevation_gain,
            "type", start_date, start_date_local, timezone
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#;

    fn bind<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.id)
            .bind(self.name.as_str())
            .bind(self.distance)
            .bind(self.moving_time)
            .bind(self.elapsed_time)
            .bind(self.total_elevation_gain)
            .bind(self.activity_type.as_str())
            .bind(self.start_date.as_str())
            .bind(self.start_date_local.as_str())
            .bind(self.timezone.as_str())
    }
}

impl Record for Route {
    const TABLE: &'static str = tables::ROUTE;
    const INSERT_SQL: &'static str = r#"
        INSERT INTO route (
            id, athlete_id, description, distance, elevation_gain, id_str, map_id,
            map_polyline, name, private, resource_state, starred, sub_type,
            created_at, updated_at, timestamp, "type", estimated_moving_time,
            waypoints, segments
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#;

    fn bind<'q>(
        &'q self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(self.id)
            .bind(self.athlete_id)
            .bind(self.description.as_str())
            .bind(self.distance)
            .bind(self.elevation_gain)
            .bind(self.id_str.as_str())
            .bind(self.map_id.as_str())
            .bind(self.map_polyline.as_str())
            .bind(self.name.as_str())
            .bind(self.private)
            .bind(self.resource_state)
            .bind(self.starred)
            .bind(self.sub_type)
            .bind(self.created_at.as_str())
            .bind(self.updated_at.as_str())
            .bind(self.timestamp)
            .bind(self.route_type)
            .bind(self.estimated_moving_time)
            .bind(self.waypoints.as_str())
            .bind(self.segments.as_str())
    }
}
