//! Stack trace location extraction.
//!
//! Error sources hand over whatever stack text they have, including none.
//! This module pulls the first `scheme://path:line:column` occurrence out
//! of that text and degrades to an all-unknown location otherwise.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder for location fields that could not be derived.
pub const UNKNOWN_LOCATION: &str = "N/A";

/// First `scheme://…:line:column` occurrence in stack text.
static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(https?://[^\s]+|file://[^\s]+):(\d+):(\d+)").expect("location pattern is valid")
});

/// Source location derived from a stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackLocation {
    pub url: String,
    pub line: String,
    pub column: String,
}

impl StackLocation {
    /// Location with every field unknown.
    pub fn unknown() -> Self {
        Self {
            url: UNKNOWN_LOCATION.to_string(),
            line: UNKNOWN_LOCATION.to_string(),
            column: UNKNOWN_LOCATION.to_string(),
        }
    }
}

/// Extract the first recognizable location from stack text.
///
/// Recognizes http, https and file URIs followed by `:line:column`. Empty,
/// missing, or unparsable input yields [`StackLocation::unknown`]. Total:
/// never panics, always returns a fully-populated location.
pub fn parse_stack(stack: Option<&str>) -> StackLocation {
    let Some(stack) = stack else {
        return StackLocation::unknown();
    };
    match LOCATION_RE.captures(stack) {
        Some(caps) => StackLocation {
            url: caps[1].to_string(),
            line: caps[2].to_string(),
            column: caps[3].to_string(),
        },
        None => StackLocation::unknown(),
    }
}
