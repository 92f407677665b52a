// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod fields;
pub mod route;

pub use activity::Activity;
pub use route::{Route, RouteFields, DEFAULT_ROUTE_DESCRIPTION};

use crate::error::Result;
use serde_json::Value;

/// Map a whole batch, stopping at the first record that fails.
pub fn map_batch<T>(records: &[Value], map: impl Fn(&Value) -> Result<T>) -> Result<Vec<T>> {
    records.iter().map(map).collect()
}
