// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod strava;
pub mod sync;

pub use strava::{Credentials, PageFetch, StravaClient};
pub use sync::{run, sync_activities, sync_routes, SyncReport, SyncTarget};
