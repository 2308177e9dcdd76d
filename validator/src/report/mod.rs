//! Report persistence and status derivation.
//!
//! The status policy: a missing `email` column always fails; per-row
//! violations fail only when strict mode is requested.
//!
//! | Report                    | strict | Status             | Exit |
//! |---------------------------|--------|--------------------|------|
//! | missing `email` column    | any    | `FatalStructural`  | 2    |
//! | `invalid > 0`             | yes    | `FatalValidation`  | 2    |
//! | anything else             | any    | `Ok`               | 0    |

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::ReportResult;
use crate::models::Report;

/// Where the report goes when no destination is given (relative to cwd).
pub const DEFAULT_REPORT_PATH: &str = "out/report.json";

/// Overall outcome derived from a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    /// The header lacks the `email` column.
    FatalStructural,
    /// Row-level violations under strict mode.
    FatalValidation,
}

impl Status {
    /// Process exit code for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::FatalStructural | Status::FatalValidation => 2,
        }
    }
}

/// Derive the status of a run. Pure function of the report and strict flag.
pub fn derive_status(report: &Report, strict: bool) -> Status {
    if report.is_missing_email_column() {
        Status::FatalStructural
    } else if strict && report.invalid > 0 {
        Status::FatalValidation
    } else {
        Status::Ok
    }
}

/// Write `report` as pretty-printed JSON, creating parent directories.
pub fn write_report(report: &Report, path: &Path) -> ReportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(report)?;
    fs::write(path, content)?;
    Ok(())
}

/// Serialize `report` on a single line, as printed by `--json`.
pub fn to_json_line(report: &Report) -> ReportResult<String> {
    Ok(serde_json::to_string(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorCode, RowError};
    use tempfile::tempdir;

    fn report_with_invalid() -> Report {
        Report {
            total: 2,
            valid: 1,
            invalid: 1,
            errors: vec![RowError::new(3, Some("nope"), ErrorCode::InvalidEmail)],
        }
    }

    #[test]
    fn test_status_ok_when_clean() {
        let report = Report { total: 1, valid: 1, invalid: 0, errors: vec![] };
        assert_eq!(derive_status(&report, false), Status::Ok);
        assert_eq!(derive_status(&report, true), Status::Ok);
    }

    #[test]
    fn test_row_errors_fatal_only_when_strict() {
        let report = report_with_invalid();
        assert_eq!(derive_status(&report, false), Status::Ok);
        assert_eq!(derive_status(&report, true), Status::FatalValidation);
        assert_eq!(Status::FatalValidation.exit_code(), 2);
    }

    #[test]
    fn test_missing_column_always_fatal() {
        let report = Report::missing_email_column(0);
        assert_eq!(derive_status(&report, false), Status::FatalStructural);
        assert_eq!(derive_status(&report, true), Status::FatalStructural);
        assert_eq!(Status::FatalStructural.exit_code(), 2);
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("report.json");

        let report = report_with_invalid();
        write_report(&report, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"total\": 2"));
        let read_back: Report = serde_json::from_str(&content).unwrap();
        assert_eq!(read_back, report);
    }

    #[test]
    fn test_json_line_is_single_line() {
        let line = to_json_line(&report_with_invalid()).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.starts_with("{\"total\":2"));
    }
}
