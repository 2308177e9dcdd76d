//! # csv-email-validator - email column validation for CSV files
//!
//! Checks every row of a CSV file for a well-formed, unique `email` value and
//! produces a JSON report plus a status for the caller.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV bytes  │────▶│   Parser    │────▶│  Validator  │────▶│   Report    │
//! │   (UTF-8)   │     │ (normalize) │     │ (rows+dups) │     │ (+ status)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//!                                              write_report ◀────────┤
//!                                              ReportSink   ◀────────┘ (--sync-sheets)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use csv_email_validator::{validate_text, derive_status, Status};
//!
//! let report = validate_text("email\nuser@example.com\nUSER@example.com\n").unwrap();
//! assert_eq!(report.valid, 1);
//! assert_eq!(report.invalid, 1);
//! assert_eq!(derive_status(&report, false), Status::Ok);
//! assert_eq!(derive_status(&report, true), Status::FatalValidation);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Record, RowError, Report
//! - [`parser`] - CSV parsing and normalization
//! - [`validation`] - Row rules and duplicate detection
//! - [`report`] - Persistence and status derivation
//! - [`pipeline`] - File-level orchestration
//! - [`sync`] - Remote report sink
//! - [`logs`] - Run log
//! - [`cli`] - Command-line surface

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Report
pub mod report;

// Orchestration
pub mod pipeline;

// Remote sync
pub mod sync;

// Logging
pub mod logs;

// CLI
pub mod cli;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, ReportError, SyncError, UsageError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ErrorCode, Record, Report, RowError};

// =============================================================================
// Re-exports - Parsing & validation
// =============================================================================

pub use parser::{parse_bytes, parse_csv, ParseResult};
pub use validation::{is_valid_email, validate_records, EMAIL_COLUMN};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{derive_status, write_report, Status, DEFAULT_REPORT_PATH};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    validate_bytes,
    validate_csv_file,
    validate_text,
    ValidationOptions,
    ValidationOutcome,
};

// =============================================================================
// Re-exports - Sync
// =============================================================================

pub use sync::{ReportSink, SyncConfig, WebhookSink};
