//! Command-line surface.
//!
//! ```bash
//! csv-email-validator contacts.csv                      # validate, report to out/report.json
//! csv-email-validator --input contacts.csv --output r.json
//! csv-email-validator --strict contacts.csv             # row errors fail the run
//! csv-email-validator --json contacts.csv               # print the report as one JSON line
//! csv-email-validator --sync-sheets contacts.csv        # also push the report to the webhook
//! csv-email-validator -- -odd-name.csv                  # `--` ends flag parsing
//! ```
//!
//! Exit codes: `0` success, `1` usage error / missing file / malformed CSV,
//! `2` missing `email` column, or row errors under `--strict`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

use crate::error::{ReportError, UsageError};
use crate::logs::{log_error, log_success, RUN_LOG};
use crate::models::Report;
use crate::pipeline::{validate_csv_file, ValidationOptions};
use crate::report::to_json_line;
use crate::sync::{ReportSink, SyncConfig, WebhookSink};

const BIN_NAME: &str = "csv-email-validator";

/// Flags that take a value, with the canonical name used in messages.
const VALUE_FLAGS: [(&str, &str); 4] = [
    ("--input", "--input"),
    ("-i", "--input"),
    ("--output", "--output"),
    ("-o", "--output"),
];

/// Flags that take no value.
const SWITCH_FLAGS: [&str; 7] = [
    "--strict",
    "--json",
    "--sync-sheets",
    "-h",
    "--help",
    "-V",
    "--version",
];

#[derive(Debug, Parser)]
#[command(name = BIN_NAME)]
#[command(version)]
#[command(about = "Validate the email column of a CSV file and write a JSON report", long_about = None)]
struct Cli {
    /// Input CSV file
    #[arg(value_name = "CSV_FILE")]
    path: Option<PathBuf>,

    /// Input CSV file (takes precedence over the positional path)
    #[arg(short, long, value_name = "PATH", allow_hyphen_values = true)]
    input: Option<PathBuf>,

    /// Report destination (default: out/report.json)
    #[arg(short, long, value_name = "PATH", allow_hyphen_values = true)]
    output: Option<PathBuf>,

    /// Exit with status 2 when any row is invalid or duplicated
    #[arg(long)]
    strict: bool,

    /// Print the report as a single JSON line and nothing else
    #[arg(long)]
    json: bool,

    /// Push the report to the webhook configured in the environment
    #[arg(long)]
    sync_sheets: bool,
}

/// Options resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub strict: bool,
    pub json: bool,
    pub sync_sheets: bool,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Validate a file
    Run(CliOptions),
    /// Print help or version text and exit successfully
    Info(String),
}

/// Result of a CLI run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub exit_code: i32,
    /// `None` when the run failed before a report existed
    pub report: Option<Report>,
}

/// Parse arguments (without the program name).
pub fn parse_cli_args<I, T>(args: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    check_flag_values(&args)?;

    let argv = std::iter::once(OsString::from(BIN_NAME)).chain(args);
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(Invocation::Info(e.render().to_string()));
        }
        Err(e) => {
            let rendered = e.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            return Err(UsageError::Invalid(first.trim_start_matches("error: ").to_string()));
        }
    };

    let input_path = cli.input.or(cli.path).ok_or(UsageError::MissingInput)?;

    Ok(Invocation::Run(CliOptions {
        input_path,
        output_path: cli.output,
        strict: cli.strict,
        json: cli.json,
        sync_sheets: cli.sync_sheets,
    }))
}

/// Reject a value flag followed by nothing, by `--` or by another known flag.
///
/// Any other token is taken as the value, even one starting with `-`.
fn check_flag_values(args: &[OsString]) -> Result<(), UsageError> {
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let Some(arg) = arg.to_str() else {
            continue;
        };
        if arg == "--" {
            break;
        }
        let Some((_, flag)) = VALUE_FLAGS.iter().find(|(name, _)| *name == arg) else {
            continue;
        };

        let missing = match iter.next().map(|v| v.to_str()) {
            None => true,
            Some(Some(value)) => is_known_flag(value),
            Some(None) => false,
        };
        if missing {
            return Err(UsageError::MissingValue(flag.to_string()));
        }
    }

    Ok(())
}

fn is_known_flag(token: &str) -> bool {
    if token == "--" {
        return true;
    }
    let name = token.split_once('=').map_or(token, |(name, _)| name);
    SWITCH_FLAGS.contains(&name) || VALUE_FLAGS.iter().any(|(flag, _)| *flag == name)
}

/// Run a validation, syncing the report when `--sync-sheets` is set.
pub async fn run(options: &CliOptions) -> RunOutcome {
    RUN_LOG.set_quiet(options.json);

    if !options.sync_sheets {
        return run_with_sink::<WebhookSink>(options, None).await;
    }

    match SyncConfig::from_env().and_then(WebhookSink::new) {
        Ok(sink) => run_with_sink(options, Some(&sink)).await,
        Err(e) => {
            log_error(format!("Sync disabled: {}", e));
            run_with_sink::<WebhookSink>(options, None).await
        }
    }
}

/// Run a validation and hand the report to `sink`, if any.
///
/// Sync failures are logged and never change the exit code.
pub async fn run_with_sink<S: ReportSink>(options: &CliOptions, sink: Option<&S>) -> RunOutcome {
    let validation = ValidationOptions {
        report_path: options.output_path.clone(),
        strict: options.strict,
    };

    let outcome = match validate_csv_file(&options.input_path, &validation) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            return RunOutcome { exit_code: 1, report: None };
        }
    };

    if let Err(e) = print_report(&outcome.report, options.json) {
        eprintln!("❌ Error: {}", e);
        return RunOutcome { exit_code: 1, report: Some(outcome.report) };
    }

    if let Some(sink) = sink {
        match sink.deliver(&outcome.report).await {
            Ok(()) => log_success("Report synced"),
            Err(e) => log_error(format!("Sync failed: {}", e)),
        }
    }

    RunOutcome {
        exit_code: outcome.status.exit_code(),
        report: Some(outcome.report),
    }
}

fn print_report(report: &Report, json: bool) -> Result<(), ReportError> {
    if json {
        println!("{}", to_json_line(report)?);
    } else {
        println!("Total: {}", report.total);
        println!("Valid: {}", report.valid);
        println!("Invalid: {}", report.invalid);
        println!("Errors: {}", report.errors.len());
    }
    Ok(())
}
