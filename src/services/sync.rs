// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync jobs: fetch from Strava, map, and persist.
//!
//! Handles the core workflow:
//! 1. Exchange the refresh token for an access token
//! 2. Fetch the listing (and, for routes, each route's details)
//! 3. Map every raw record onto its stored field set
//! 4. Save the batch in one transaction

use crate::config::Config;
use crate::db::{Record, SaveOutcome, Store};
use crate::error::Result;
use crate::models::{map_batch, Activity, Route};
use crate::services::strava::{PageFetch, StravaClient};
use serde_json::Value;
use std::fmt;

/// Which Strava collection a run exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Activities,
    Routes,
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTarget::Activities => f.write_str("activities"),
            SyncTarget::Routes => f.write_str("routes"),
        }
    }
}

/// Summary of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub target: SyncTarget,
    /// Records returned by Strava (after detail lookups, for routes)
    pub fetched: usize,
    pub outcome: SaveOutcome,
    /// False when pagination stopped on an error rather than an empty page
    pub complete: bool,
}

/// Fetch all activities and save them.
pub async fn sync_activities(client: &StravaClient, store: &Store) -> Result<SyncReport> {
    let access_token = client.get_access_token().await?;
    let fetch = client.fetch_activities(&access_token).await?;
    persist(SyncTarget::Activities, fetch, store, Activity::from_json).await
}

/// Fetch all routes with their details and save them.
pub async fn sync_routes(client: &StravaClient, store: &Store) -> Result<SyncReport> {
    let access_token = client.get_access_token().await?;
    let fetch = client.fetch_athlete_routes(&access_token).await?;
    persist(SyncTarget::Routes, fetch, store, Route::from_json).await
}

async fn persist<R: Record>(
    target: SyncTarget,
    fetch: PageFetch,
    store: &Store,
    map: impl Fn(&Value) -> Result<R>,
) -> Result<SyncReport> {
    if let Some(page) = fetch.aborted_at {
        tracing::warn!(
            %target,
            page,
            fetched = fetch.records.len(),
            "Listing stopped early; saving partial results"
        );
    }

    let records = map_batch(&fetch.records, map)?;
    let outcome = store.save(&records).await?;

    Ok(SyncReport {
        target,
        fetched: fetch.records.len(),
        outcome,
        complete: fetch.is_complete(),
    })
}

/// Run one sync end to end, logging instead of returning errors.
///
/// Opens the store at `config.database_path`, runs the job and always
/// closes the store again. Returns the report on success and `None` after
/// logging a single error line otherwise.
pub async fn run(config: &Config, target: SyncTarget) -> Option<SyncReport> {
    let client = match StravaClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "An error occurred");
            return None;
        }
    };

    let store = match Store::open(&config.database_path).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "An error occurred");
            return None;
        }
    };

    let result = match target {
        SyncTarget::Activities => sync_activities(&client, &store).await,
        SyncTarget::Routes => sync_routes(&client, &store).await,
    };
    store.close().await;

    match result {
        Ok(report) => {
            if report.fetched == 0 {
                tracing::info!("No {} were found.", target);
            } else {
                tracing::info!(
                    %target,
                    fetched = report.fetched,
                    outcome = ?report.outcome,
                    complete = report.complete,
                    "Sync finished"
                );
            }
            Some(report)
        }
        Err(e) => {
            tracing::error!(%target, fatal = e.is_fatal(), error = %e, "An error occurred");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_display() {
        assert_eq!(SyncTarget::Activities.to_string(), "activities");
        assert_eq!(SyncTarget::Routes.to_string(), "routes");
    }
}
