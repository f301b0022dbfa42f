//! Error record model and normalization.
//!
//! Capture sources hand in loosely-shaped reports. Normalization fills
//! every field from the caller value, the parsed stack location, or a
//! fixed default, in that order, so downstream code never sees a partial
//! record. Records are keyed by their (message, stack) pair: two records
//! with identical message and stack text are the same logical error no
//! matter which channel produced them or when.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::stack::{parse_stack, StackLocation};

/// Message used when a report carries none.
pub const DEFAULT_MESSAGE: &str = "No message provided";

/// Stack text used when a report carries none.
pub const DEFAULT_STACK: &str = "Stack trace unavailable";

/// Classification tag for a captured error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Uncaught synchronous error (panic channel).
    Exception,
    /// Async failure that reached the top level with nobody handling it.
    UnhandledRejection,
    /// HTTP fetch that failed or returned a non-2xx status.
    FetchError,
    /// The source did not say.
    #[default]
    Unspecified,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Exception => "Exception",
            ErrorKind::UnhandledRejection => "Unhandled Rejection",
            ErrorKind::FetchError => "Fetch Error",
            ErrorKind::Unspecified => "Unspecified",
        };
        write!(f, "{label}")
    }
}

/// Loosely-shaped input to the capture API.
///
/// Every field is optional; capture hooks assemble reports piecemeal with
/// the builder methods and normalization fills the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawErrorReport {
    pub kind: Option<ErrorKind>,
    pub message: Option<String>,
    pub stack: Option<String>,
    pub url: Option<String>,
    pub line: Option<String>,
    pub column: Option<String>,
}

impl RawErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_stack(mut self, stack: &str) -> Self {
        self.stack = Some(stack.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_line(mut self, line: &str) -> Self {
        self.line = Some(line.to_string());
        self
    }

    pub fn with_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }
}

/// One captured error, fully populated.
///
/// Immutable after insertion except for `resolved`, which is one-way:
/// once a record is marked handled it is never revived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Classification tag.
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub stack: String,
    pub url: String,
    pub line: String,
    pub column: String,
    /// Marked handled by the user; hides the record from the active view.
    pub resolved: bool,
}

impl ErrorRecord {
    /// Build a fully-populated record from a loosely-shaped report.
    ///
    /// A missing report is tolerated with a diagnostic rather than an
    /// error: the capture API promises to never fail.
    pub fn normalize(report: Option<RawErrorReport>) -> Self {
        let report = report.unwrap_or_else(|| {
            warn!("error report missing or malformed, coercing to defaults");
            RawErrorReport::default()
        });

        let parsed = parse_stack(report.stack.as_deref());

        Self {
            kind: report.kind.unwrap_or_default(),
            message: non_empty(report.message).unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            stack: non_empty(report.stack).unwrap_or_else(|| DEFAULT_STACK.to_string()),
            url: non_empty(report.url).unwrap_or(parsed.url),
            line: non_empty(report.line).unwrap_or(parsed.line),
            column: non_empty(report.column).unwrap_or(parsed.column),
            resolved: false,
        }
    }

    /// Dedup identity: exact (message, stack) equality.
    pub fn same_error(&self, other: &ErrorRecord) -> bool {
        self.message == other.message && self.stack == other.stack
    }

    /// Parsed location, for the details view.
    pub fn location(&self) -> StackLocation {
        parse_stack(Some(&self.stack))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::UNKNOWN_LOCATION;

    #[test]
    fn test_normalize_empty_report_uses_defaults() {
        let record = ErrorRecord::normalize(Some(RawErrorReport::new()));
        assert_eq!(record.kind, ErrorKind::Unspecified);
        assert_eq!(record.message, DEFAULT_MESSAGE);
        assert_eq!(record.stack, DEFAULT_STACK);
        assert_eq!(record.url, UNKNOWN_LOCATION);
        assert_eq!(record.line, UNKNOWN_LOCATION);
        assert_eq!(record.column, UNKNOWN_LOCATION);
        assert!(!record.resolved);
    }

    #[test]
    fn test_normalize_missing_report_is_coerced() {
        let record = ErrorRecord::normalize(None);
        assert_eq!(record.kind, ErrorKind::Unspecified);
        assert_eq!(record.message, DEFAULT_MESSAGE);
    }

    #[test]
    fn test_normalize_location_falls_back_to_stack() {
        let report = RawErrorReport::new()
            .with_message("x")
            .with_stack("https://a.com/app.js:10:5");
        let record = ErrorRecord::normalize(Some(report));
        assert_eq!(record.url, "https://a.com/app.js");
        assert_eq!(record.line, "10");
        assert_eq!(record.column, "5");
    }

    #[test]
    fn test_normalize_caller_location_wins_over_stack() {
        let report = RawErrorReport::new()
            .with_stack("https://a.com/app.js:10:5")
            .with_url("https://b.com/other.js")
            .with_line("99");
        let record = ErrorRecord::normalize(Some(report));
        assert_eq!(record.url, "https://b.com/other.js");
        assert_eq!(record.line, "99");
        // Column was not supplied, so the parsed value fills it.
        assert_eq!(record.column, "5");
    }

    #[test]
    fn test_normalize_empty_strings_count_as_missing() {
        let report = RawErrorReport::new().with_message("").with_url("");
        let record = ErrorRecord::normalize(Some(report));
        assert_eq!(record.message, DEFAULT_MESSAGE);
        assert_eq!(record.url, UNKNOWN_LOCATION);
    }

    #[test]
    fn test_same_error_ignores_kind_and_location() {
        let a = ErrorRecord::normalize(Some(
            RawErrorReport::new()
                .with_kind(ErrorKind::Exception)
                .with_message("boom")
                .with_stack("trace"),
        ));
        let b = ErrorRecord::normalize(Some(
            RawErrorReport::new()
                .with_kind(ErrorKind::FetchError)
                .with_message("boom")
                .with_stack("trace")
                .with_url("https://a.com"),
        ));
        assert!(a.same_error(&b));
    }

    #[test]
    fn test_kind_tag_serialization() {
        let record = ErrorRecord::normalize(Some(
            RawErrorReport::new().with_kind(ErrorKind::UnhandledRejection),
        ));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"unhandled-rejection\""));
    }
}
