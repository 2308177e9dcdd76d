//! Domain models for the validation pipeline.
//!
//! - [`Record`] - One parsed data row, keyed by header name
//! - [`ErrorCode`] - Kind of violation detected on a row
//! - [`RowError`] - A single violation tied to a row number
//! - [`Report`] - Aggregate result for one file

use serde::{Deserialize, Serialize};

// =============================================================================
// Record
// =============================================================================

/// One parsed data row.
///
/// Fields keep header order. A row shorter than the header simply has no
/// entry for the missing trailing columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Build a record by pairing header names with trimmed values.
    ///
    /// Values beyond the header length are dropped.
    pub fn from_pairs<'h, 'v, H, V>(headers: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'h String>,
        V: IntoIterator<Item = &'v str>,
    {
        let fields = headers
            .into_iter()
            .zip(values)
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        Self { fields }
    }

    /// Value of `column`, if the row carries it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// Row errors
// =============================================================================

/// Kind of violation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Header has no `email` column. Structural, reported once.
    MissingEmailColumn,
    /// Email absent, empty or not shaped like `local@domain.tld`.
    InvalidEmail,
    /// Email already seen earlier in the file (case-insensitive).
    DuplicateEmail,
}

impl ErrorCode {
    /// Fixed human-readable message for this code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::MissingEmailColumn => "Missing required column: email",
            ErrorCode::InvalidEmail => "Email is not valid",
            ErrorCode::DuplicateEmail => "Email is duplicated",
        }
    }
}

/// A single detected violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based line position. Row 1 is the header.
    pub row_number: usize,
    /// Offending email as written in the file; `null` when absent or empty.
    pub email: Option<String>,
    pub error_code: ErrorCode,
    pub message: String,
}

impl RowError {
    pub fn new(row_number: usize, email: Option<&str>, error_code: ErrorCode) -> Self {
        Self {
            row_number,
            email: email.filter(|e| !e.is_empty()).map(str::to_string),
            error_code,
            message: error_code.message().to_string(),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Aggregate validation result for one file.
///
/// `valid + invalid == total` always holds. `errors.len() == invalid` holds
/// except for the missing-column short-circuit, which carries one error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<RowError>,
}

impl Report {
    /// Report for a header without an `email` column: every row is invalid.
    pub fn missing_email_column(total: usize) -> Self {
        Self {
            total,
            valid: 0,
            invalid: total,
            errors: vec![RowError::new(1, None, ErrorCode::MissingEmailColumn)],
        }
    }

    /// Whether this report is the structural missing-column short-circuit.
    pub fn is_missing_email_column(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.error_code == ErrorCode::MissingEmailColumn)
    }
}
