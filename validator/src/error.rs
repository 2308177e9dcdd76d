//! Error types for the CSV email validator.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV parsing errors (fatal, no report is produced)
//! - [`ReportError`] - Report persistence errors
//! - [`SyncError`] - Remote report sink errors
//! - [`UsageError`] - Malformed command-line invocations
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Row-level violations are never errors: they are recorded in the
//! [`crate::models::Report`]. Error conversion is automatic via `From`
//! implementations, allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Input ended inside a quoted field.
    #[error("Malformed CSV: unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    /// Any other structural defect reported by the CSV reader.
    #[error("Malformed CSV: {0}")]
    Malformed(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::Malformed(err.to_string())
    }
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while persisting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to create the destination or write the file.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the report.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Sync Errors
// =============================================================================

/// Errors from the remote report sink.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required environment variable is not set.
    #[error("Missing sync configuration: {0}")]
    MissingConfig(String),

    /// HTTP request could not be completed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Remote endpoint answered with a non-success status.
    #[error("Webhook rejected report ({status}): {body}")]
    Rejected { status: u16, body: String },
}

// =============================================================================
// Usage Errors
// =============================================================================

/// Malformed command-line invocation. Detected before any I/O.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    /// A flag that takes a value was given without one.
    #[error("Usage: missing value for {0}")]
    MissingValue(String),

    /// Neither `--input` nor a positional path was given.
    #[error("Usage: csv-email-validator [--input] <csv-file> [--output <path>] [--strict] [--json] [--sync-sheets]")]
    MissingInput,

    /// Any other argument problem reported by the parser.
    #[error("Usage: {0}")]
    Invalid(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by
/// [`crate::pipeline::validate_csv_file`]. Every variant is fatal for the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input path does not exist.
    #[error("File does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Input could not be read.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("{0}")]
    Csv(#[from] CsvError),

    /// Report could not be persisted.
    #[error("{0}")]
    Report(#[from] ReportError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for report persistence.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
