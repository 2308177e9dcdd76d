//! csv-email-validator CLI - check the email column of a CSV file
//!
//! ```bash
//! csv-email-validator contacts.csv                  # summary on stdout, report in out/report.json
//! csv-email-validator --json --strict contacts.csv  # one JSON line, exit 2 on any row error
//! ```

use csv_email_validator::cli::{parse_cli_args, run, Invocation};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let options = match parse_cli_args(std::env::args_os().skip(1)) {
        Ok(Invocation::Run(options)) => options,
        Ok(Invocation::Info(text)) => {
            print!("{}", text);
            return;
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let outcome = run(&options).await;
    std::process::exit(outcome.exit_code);
}
