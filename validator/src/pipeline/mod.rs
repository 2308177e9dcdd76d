//! High-level pipeline API: read, parse, validate, persist.
//!
//! # Example
//!
//! ```rust,no_run
//! use csv_email_validator::pipeline::{validate_csv_file, ValidationOptions};
//! use std::path::Path;
//!
//! let outcome = validate_csv_file(Path::new("contacts.csv"), &ValidationOptions::default())?;
//! println!("{} valid of {}", outcome.report.valid, outcome.report.total);
//! # Ok::<(), csv_email_validator::error::PipelineError>(())
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CsvResult, PipelineError, PipelineResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::Report;
use crate::parser::{parse_bytes, parse_csv};
use crate::report::{derive_status, write_report, Status, DEFAULT_REPORT_PATH};
use crate::validation::validate_records;

/// Errors listed individually in the run log before summarising
const MAX_LOGGED_ERRORS: usize = 5;

/// Options for a file validation run
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Report destination, `out/report.json` when unset
    pub report_path: Option<PathBuf>,

    /// Treat row-level violations as a failing status
    pub strict: bool,
}

impl ValidationOptions {
    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH))
    }
}

/// Result of a file validation run
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub report: Report,
    pub status: Status,
    /// Where the report was written
    pub report_path: PathBuf,
}

/// Validate CSV text. Pure: no I/O, no logging.
pub fn validate_text(content: &str) -> CsvResult<Report> {
    let parsed = parse_csv(content)?;
    Ok(validate_records(&parsed.headers, &parsed.records))
}

/// Validate raw CSV bytes.
pub fn validate_bytes(bytes: &[u8]) -> CsvResult<Report> {
    let parsed = parse_bytes(bytes)?;
    Ok(validate_records(&parsed.headers, &parsed.records))
}

/// Validate a CSV file and persist its report.
///
/// This is the main entry point. It:
/// 1. Reads the file (a missing file is [`PipelineError::NotFound`])
/// 2. Parses and validates it (a malformed file aborts, nothing is written)
/// 3. Writes the report to `options.report_path`
/// 4. Derives the status under `options.strict`
pub fn validate_csv_file(
    path: &Path,
    options: &ValidationOptions,
) -> PipelineResult<ValidationOutcome> {
    log_info(format!("Reading {}", path.display()));
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::NotFound(path.to_path_buf()),
        _ => PipelineError::Io(e),
    })?;

    let report = validate_bytes(&bytes)?;
    log_report(&report);

    let report_path = options.report_path();
    write_report(&report, &report_path)?;
    log_success(format!("Report written to {}", report_path.display()));

    let status = derive_status(&report, options.strict);
    Ok(ValidationOutcome {
        report,
        status,
        report_path,
    })
}

fn log_report(report: &Report) {
    if report.is_missing_email_column() {
        log_warning("Missing required column: email");
        return;
    }

    log_success(format!("{} rows checked, {} valid", report.total, report.valid));
    if report.invalid == 0 {
        return;
    }

    log_warning(format!("{} invalid rows", report.invalid));
    for err in report.errors.iter().take(MAX_LOGGED_ERRORS) {
        log_info_indent(
            format!(
                "row {}: {} ({})",
                err.row_number,
                err.message,
                err.email.as_deref().unwrap_or("<empty>")
            ),
            1,
        );
    }
    if report.errors.len() > MAX_LOGGED_ERRORS {
        log_info_indent(
            format!("... and {} more", report.errors.len() - MAX_LOGGED_ERRORS),
            1,
        );
    }
}
