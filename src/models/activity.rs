// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model for storage.

use super::fields;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored activity row.
///
/// Created once from an `/athlete/activities` listing entry and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID (primary key)
    pub id: i64,
    /// Activity name/title
    pub name: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: f64,
    /// Elapsed time in seconds
    pub elapsed_time: f64,
    /// Elevation gain in meters
    pub total_elevation_gain: f64,
    /// Activity type (Ride, Run, Hike, etc.)
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Start date/time (ISO 8601, stored verbatim)
    pub start_date: String,
    pub start_date_local: String,
    pub timezone: String,
}

impl Activity {
    /// Map one raw listing entry onto the stored field set.
    pub fn from_json(record: &Value) -> Result<Self> {
        Ok(Self {
            id: fields::integer(record, "id")?,
            name: fields::string(record, "name")?,
            distance: fields::float(record, "distance")?,
            moving_time: fields::float(record, "moving_time")?,
            elapsed_time: fields::float(record, "elapsed_time")?,
            total_elevation_gain: fields::float(record, "total_elevation_gain")?,
            activity_type: fields::string(record, "type")?,
            start_date: fields::string(record, "start_date")?,
            start_date_local: fields::string(record, "start_date_local")?,
            timezone: fields::string(record, "timezone")?,
        })
    }
}
