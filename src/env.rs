//! Typed environment variable accessors
//!
//! Container configuration arrives exclusively through environment
//! variables, so malformed values must surface as configuration errors
//! rather than panics or silent fallbacks.

use anyhow::{bail, Result};
use std::env;

/// Read a string setting, falling back to a default when unset or empty.
pub fn get_string(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

/// Read a boolean setting.
///
/// Accepts `0`/`1`, `true`/`false` and `yes`/`no` (case-insensitive).
pub fn get_bool(name: &str, default: bool) -> Result<bool> {
    let value = match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(default),
    };

    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("The environment variable {} must be a boolean value (0/1/true/false/yes/no), got '{}'.", name, other),
    }
}

/// Read an integer setting, enforcing an inclusive range.
pub fn get_integer(name: &str, default: i64, min: i64, max: i64) -> Result<i64> {
    let value = match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(default),
    };

    let parsed: i64 = match value.trim().parse() {
        Ok(parsed) => parsed,
        Err(_) => bail!("The environment variable {} must be an integer, got '{}'.", name, value),
    };

    if parsed < min || parsed > max {
        bail!("The environment variable {} must be in the range [{}, {}], got {}.", name, min, max, parsed);
    }

    Ok(parsed)
}
