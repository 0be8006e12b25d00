//! Data quality handling for mapper and reducer input.
//!
//! Forum dumps are dirty: header rows, truncated lines, fields that are not
//! numbers where numbers are expected. None of that is fatal. Every rejected
//! record is classified by a [`SkipReason`], counted, and dropped; the stream
//! keeps going.
//!
//! # Overview
//!
//! - [`SkipReason`] - the three ways a record can be rejected
//! - [`ValidationError`] - a reason plus the field and message that caused it
//! - [`ValidationMode`] - drop silently, or drop and remember
//! - [`ErrorCollector`] - accumulates rejected records for end-of-run reporting
//!
//! # Example
//!
//! ```
//! use forumstats::validation::*;
//!
//! let mut collector = ErrorCollector::new();
//! collector.add_error(
//!     Some("line 3".into()),
//!     ValidationError::field(SkipReason::ParseFailure, "count", "not an integer: 'x'"),
//! );
//! assert_eq!(collector.error_count(), 1);
//! assert_eq!(collector.count_by_reason(SkipReason::ParseFailure), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::io::Error;
use std::path::Path;
use std::{fmt, io};

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Wrong number of columns, or undecodable bytes.
    SchemaMismatch,
    /// A requested field is not part of the schema.
    FieldMissing,
    /// A numeric field, tag, or timestamp failed to parse.
    ParseFailure,
}

impl SkipReason {
    /// All reasons, in reporting order.
    pub const ALL: [SkipReason; 3] = [
        SkipReason::SchemaMismatch,
        SkipReason::FieldMissing,
        SkipReason::ParseFailure,
    ];

    /// Stable snake-case name, used as a metric suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::SchemaMismatch => "schema_mismatch",
            SkipReason::FieldMissing => "field_missing",
            SkipReason::ParseFailure => "parse_failure",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for SkipReason {}

/// A single rejected record, with context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Classification used for counting.
    pub reason: SkipReason,
    /// The field that failed validation (optional)
    pub field: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error with just a message.
    pub fn new<S: Into<String>>(reason: SkipReason, message: S) -> Self {
        Self {
            reason,
            field: None,
            message: message.into(),
        }
    }

    /// Create a validation error for a specific field.
    pub fn field<S: Into<String>, M: Into<String>>(reason: SkipReason, field: S, message: M) -> Self {
        Self {
            reason,
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Wrong column count.
    pub fn columns(expected: usize, actual: usize) -> Self {
        Self::new(
            SkipReason::SchemaMismatch,
            format!("expected {expected} columns, found {actual}"),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "{}: [{}] {}", self.reason, field, self.message)
        } else {
            write!(f, "{}: {}", self.reason, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for SkipReason {
    fn from(e: ValidationError) -> Self {
        e.reason
    }
}

/// Defines what happens to a rejected record besides being dropped.
///
/// There is deliberately no fail-fast mode: a bad line never aborts a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Drop the record, only bump the counter.
    #[default]
    SkipInvalid,
    /// Drop the record and keep it in an [`ErrorCollector`].
    LogAndContinue,
}

/// Collects rejected records for batch reporting.
///
/// Use this with [`ValidationMode::LogAndContinue`].
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<RecordError>,
}

/// A validation error with optional record context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordError {
    /// Line number or identifier of the record that failed
    pub record_id: Option<String>,
    /// What went wrong
    pub error: ValidationError,
}

impl ErrorCollector {
    /// Create a new empty error collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error for a record.
    pub fn add_error(&mut self, record_id: Option<String>, error: ValidationError) {
        self.errors.push(RecordError { record_id, error });
    }

    /// Get the total number of failed records.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of failed records with the given reason.
    pub fn count_by_reason(&self, reason: SkipReason) -> usize {
        self.errors.iter().filter(|e| e.error.reason == reason).count()
    }

    /// Get all collected errors.
    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }

    /// Clear all collected errors.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Export errors to JSON format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.errors)
    }

    /// Write errors to a file in JSON format.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = self.to_json().map_err(Error::other)?;
        std::fs::write(path, json)
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.record_id.as_deref().unwrap_or("-"), self.error)
    }
}

/// One skipped record per line: position, then the error.
impl fmt::Display for ErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.errors {
            writeln!(f, "{e}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_reason_and_field() {
        let e = ValidationError::field(SkipReason::ParseFailure, "hour", "not an integer: 'xx'");
        assert_eq!(e.to_string(), "parse_failure: [hour] not an integer: 'xx'");
        let e = ValidationError::columns(3, 2);
        assert_eq!(e.to_string(), "schema_mismatch: expected 3 columns, found 2");
    }

    #[test]
    fn collector_counts_per_reason() {
        let mut c = ErrorCollector::new();
        c.add_error(None, ValidationError::columns(2, 5));
        c.add_error(None, ValidationError::columns(2, 1));
        c.add_error(
            Some("7".into()),
            ValidationError::new(SkipReason::ParseFailure, "bad"),
        );
        assert_eq!(c.error_count(), 3);
        assert_eq!(c.count_by_reason(SkipReason::SchemaMismatch), 2);
        assert_eq!(c.count_by_reason(SkipReason::FieldMissing), 0);
        assert!(c.to_json().unwrap().contains("\"parse_failure\""));
        c.clear();
        assert_eq!(c.error_count(), 0);
    }
}
