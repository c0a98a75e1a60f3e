// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

//! Construction-time configuration keys.
//!
//! Nodes are configured through a string dictionary passed to their factory.
//! This module names the keys every node understands and provides the helpers
//! used to read them.

use crate::{Error, Result, node::Properties};

/// Pace output to wall-clock time (`true`/`false`).
pub const NODE_LIVE: &str = "node.live";

/// Drive non-live output from the timer instead of from demand (`true`/`false`).
pub const NODE_ASYNC: &str = "node.async";

/// Name of the pattern a test source paints.
pub const NODE_PATTERN: &str = "node.pattern";

/// Media class advertised in the node properties.
pub const MEDIA_CLASS: &str = "media.class";

/// Reads a boolean key.
///
/// Accepts `true`/`false` and `1`/`0`.
///
/// # Returns
///
/// `Ok(None)` if the key is absent.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for any other value.
///
/// # Examples
///
/// ```
/// use medianode::{Properties, config};
///
/// let info = Properties::from([(config::NODE_LIVE.to_owned(), "1".to_owned())]);
/// assert_eq!(config::get_bool(&info, config::NODE_LIVE).unwrap(), Some(true));
/// assert_eq!(config::get_bool(&info, config::NODE_ASYNC).unwrap(), None);
/// ```
pub fn get_bool(info: &Properties, key: &str) -> Result<Option<bool>> {
    let Some(value) = info.get(key) else {
        return Ok(None);
    };
    match value.trim() {
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        other => Err(Error::InvalidValue(format!(
            "'{key}' expects a boolean, got '{other}'"
        ))),
    }
}

/// Reads a string key.
pub fn get_str<'a>(info: &'a Properties, key: &str) -> Option<&'a str> {
    info.get(key).map(String::as_str)
}
