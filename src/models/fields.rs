// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field lookups on raw Strava JSON objects.
//!
//! Paths are dotted (`map.polyline`); every lookup that misses or finds a
//! value of the wrong type yields [`AppError::Mapping`] naming the path.

use crate::error::{AppError, Result};
use serde_json::Value;

/// Resolve a dotted path, returning `None` for absent or `null` values.
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |node, key| node.get(key))
        .filter(|v| !v.is_null())
}

pub fn required<'a>(record: &'a Value, path: &str) -> Result<&'a Value> {
    lookup(record, path).ok_or_else(|| AppError::missing_field(path))
}

pub fn string(record: &Value, path: &str) -> Result<String> {
    required(record, path)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::missing_field(path))
}

/// Optional string with a fallback for absent fields.
pub fn string_or(record: &Value, path: &str, default: &str) -> Result<String> {
    match lookup(record, path) {
        None => Ok(default.to_string()),
        Some(v) => v
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::missing_field(path)),
    }
}

/// Numeric field as `f64`; integral JSON numbers are accepted.
pub fn float(record: &Value, path: &str) -> Result<f64> {
    required(record, path)?
        .as_f64()
        .ok_or_else(|| AppError::missing_field(path))
}

pub fn integer(record: &Value, path: &str) -> Result<i64> {
    required(record, path)?
        .as_i64()
        .ok_or_else(|| AppError::missing_field(path))
}

pub fn boolean(record: &Value, path: &str) -> Result<bool> {
    required(record, path)?
        .as_bool()
        .ok_or_else(|| AppError::missing_field(path))
}

/// Scalar or string id rendered as text (`map.id` is a string like `"r123"`).
pub fn text(record: &Value, path: &str) -> Result<String> {
    match required(record, path)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(AppError::missing_field(path)),
    }
}

/// Structured field stored as compact JSON text.
pub fn serialized(record: &Value, path: &str) -> Result<String> {
    let value = required(record, path)?;
    serde_json::to_string(value).map_err(|e| AppError::Mapping(format!("{}: {}", path, e)))
}
