// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava route model for storage.

use super::fields;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored in place of a missing route description.
pub const DEFAULT_ROUTE_DESCRIPTION: &str = "No description";

/// Stored route row, built from a `/routes/{id}` detail payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Strava route ID (primary key)
    pub id: i64,
    /// Owning athlete (not a foreign key)
    pub athlete_id: i64,
    pub description: String,
    /// Distance in meters
    pub distance: f64,
    /// Elevation gain in meters
    pub elevation_gain: f64,
    pub id_str: String,
    pub map_id: String,
    /// Encoded polyline, empty when Strava sent none
    pub map_polyline: String,
    pub name: String,
    pub private: bool,
    pub resource_state: i64,
    pub starred: bool,
    pub sub_type: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Epoch seconds
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub route_type: i64,
    /// Seconds
    pub estimated_moving_time: i64,
    /// JSON text
    pub waypoints: String,
    /// JSON text
    pub segments: String,
}

/// Constructor input for [`Route::new`]; `id` is checked before anything else.
#[derive(Debug, Clone, Default)]
pub struct RouteFields {
    pub id: Option<i64>,
    pub athlete_id: i64,
    pub description: Option<String>,
    pub distance: f64,
    pub elevation_gain: f64,
    pub id_str: String,
    pub map_id: String,
    pub map_polyline: Option<String>,
    pub name: String,
    pub private: bool,
    pub resource_state: i64,
    pub starred: bool,
    pub sub_type: i64,
    pub created_at: String,
    pub updated_at: String,
    pub timestamp: i64,
    pub route_type: i64,
    pub estimated_moving_time: i64,
    pub waypoints: String,
    pub segments: String,
}

impl Route {
    /// Build a route, applying the description and polyline defaults.
    pub fn new(f: RouteFields) -> Result<Self> {
        let id = f.id.ok_or_else(id_required)?;
        Ok(Self {
            id,
            athlete_id: f.athlete_id,
            description: f
                .description
                .unwrap_or_else(|| DEFAULT_ROUTE_DESCRIPTION.to_string()),
            distance: f.distance,
            elevation_gain: f.elevation_gain,
            id_str: f.id_str,
            map_id: f.map_id,
            map_polyline: f.map_polyline.unwrap_or_default(),
            name: f.name,
            private: f.private,
            resource_state: f.resource_state,
            starred: f.starred,
            sub_type: f.sub_type,
            created_at: f.created_at,
            updated_at: f.updated_at,
            timestamp: f.timestamp,
            route_type: f.route_type,
            estimated_moving_time: f.estimated_moving_time,
            waypoints: f.waypoints,
            segments: f.segments,
        })
    }

    /// Map one raw route detail payload onto the stored field set.
    pub fn from_json(record: &Value) -> Result<Self> {
        let id = fields::lookup(record, "id")
            .map(|v| v.as_i64().ok_or_else(id_required))
            .transpose()?;
        if id.is_none() {
            return Err(id_required());
        }

        Self::new(RouteFields {
            id,
            athlete_id: fields::integer(record, "athlete.id")?,
            description: fields::lookup(record, "description")
                .map(|_| fields::string(record, "description"))
                .transpose()?,
            distance: fields::float(record, "distance")?,
            elevation_gain: fields::float(record, "elevation_gain")?,
            id_str: fields::string(record, "id_str")?,
            map_id: fields::text(record, "map.id")?,
            map_polyline: Some(fields::string_or(record, "map.polyline", "")?),
            name: fields::string(record, "name")?,
            private: fields::boolean(record, "private")?,
            resource_state: fields::integer(record, "resource_state")?,
            starred: fields::boolean(record, "starred")?,
            sub_type: fields::integer(record, "sub_type")?,
            created_at: fields::string(record, "created_at")?,
            updated_at: fields::string(record, "updated_at")?,
            timestamp: fields::integer(record, "timestamp")?,
            route_type: fields::integer(record, "type")?,
            estimated_moving_time: fields::integer(record, "estimated_moving_time")?,
            waypoints: fields::serialized(record, "waypoints")?,
            segments: fields::serialized(record, "segments")?,
        })
    }
}

fn id_required() -> AppError {
    AppError::Validation("Field 'id' is required".to_string())
}
