//! Row validation for the `email` column.
//!
//! Rules, applied to each record in file order:
//!
//! 1. The header must contain `email` (exact, case-sensitive). Otherwise the
//!    whole file is reported with a single `MISSING_EMAIL_COLUMN` error and
//!    no row is inspected.
//! 2. An absent, empty or malformed email is `INVALID_EMAIL`.
//! 3. An email already seen (compared lower-cased) is `DUPLICATE_EMAIL`.
//!
//! Syntax is checked before duplicates, so an invalid email never enters the
//! seen set and is never reported as a duplicate.
//!
//! # Example
//!
//! ```
//! use csv_email_validator::parser::parse_csv;
//! use csv_email_validator::validation::validate_records;
//!
//! let parsed = parse_csv("email\nTest@Example.com\ntest@example.com\n").unwrap();
//! let report = validate_records(&parsed.headers, &parsed.records);
//!
//! assert_eq!(report.valid, 1);
//! assert_eq!(report.invalid, 1);
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ErrorCode, Record, Report, RowError};

/// Column every file must carry.
pub const EMAIL_COLUMN: &str = "email";

/// Deliberately permissive `local@domain.tld` shape.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("Invalid embedded email pattern"));

/// First data row; line 1 is the header.
const FIRST_DATA_ROW: usize = 2;

/// Whether `email` has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Validate parsed records against the header set.
///
/// Pure: the duplicate-tracking set lives only for this call.
pub fn validate_records(headers: &[String], records: &[Record]) -> Report {
    let total = records.len();

    if !headers.iter().any(|h| h == EMAIL_COLUMN) {
        return Report::missing_email_column(total);
    }

    let mut errors = Vec::new();
    let mut seen_emails: HashSet<String> = HashSet::new();
    let mut valid = 0;

    for (index, record) in records.iter().enumerate() {
        let row_number = index + FIRST_DATA_ROW;
        let email = record.get(EMAIL_COLUMN);

        let Some(email) = email.filter(|e| is_valid_email(e)) else {
            errors.push(RowError::new(row_number, email, ErrorCode::InvalidEmail));
            continue;
        };

        if !seen_emails.insert(email.to_lowercase()) {
            errors.push(RowError::new(row_number, Some(email), ErrorCode::DuplicateEmail));
            continue;
        }

        valid += 1;
    }

    Report {
        total,
        valid,
        invalid: total - valid,
        errors,
    }
}
