mod cli;
mod core;

use clap::error::ErrorKind;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::cli::check_cmd::{CheckOutcome, CheckPlan, CheckRequest};
use crate::core::config::AppConfig;
use crate::core::error::CheckError;

/// Monitoring plugin for the daily costs of a STACKIT project.
///
/// The higher of today's and yesterday's cost (UTC days) is compared against
/// the thresholds. Exit codes: 0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN.
#[derive(Parser)]
#[command(name = "check_stackit_cost", version)]
struct Cli {
    /// STACKIT customer account ID
    #[arg(long)]
    customer_account_id: String,

    /// STACKIT project ID
    #[arg(long)]
    project_id: String,

    /// Warning threshold for daily cost in EUR [default: 10.00]
    #[arg(short, long)]
    warning: Option<Decimal>,

    /// Critical threshold for daily cost in EUR [default: 50.00]
    #[arg(short, long)]
    critical: Option<Decimal>,

    /// Path to service account key JSON [default: ~/.stackit/sa-key.json]
    #[arg(long)]
    sa_key_json: Option<PathBuf>,

    /// Evaluate net charges without adding granted discounts
    #[arg(long)]
    skip_discount: bool,

    /// Give up with UNKNOWN after this many seconds [default: 30]
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file [default: $XDG_CONFIG_HOME/stackit-cost-check/config.toml]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable ANSI colors in logs
    #[arg(long)]
    no_color: bool,
}

fn finish(outcome: CheckOutcome) -> ! {
    println!("{}", outcome.line);
    std::process::exit(outcome.exit_code)
}

fn config_failure(message: String) -> ! {
    finish(CheckOutcome::unknown(&CheckError::Config(message)))
}

/// Usage errors exit 3 (UNKNOWN), not clap's 2. `None` for help and version,
/// which clap prints itself.
fn usage_outcome(err: &clap::Error) -> Option<CheckOutcome> {
    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return None;
    }
    let rendered = err.to_string();
    let message = rendered
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("Usage:") && !line.starts_with("For more information"))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let message = message.trim_start_matches("error: ").to_string();
    Some(CheckOutcome::unknown(&CheckError::Config(message)))
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match usage_outcome(&e) {
            Some(outcome) => finish(outcome),
            None => {
                let _ = e.print();
                std::process::exit(0);
            }
        },
    };

    let output_opts = cli::output::OutputOptions {
        verbosity: cli.verbose,
        use_color: cli::output::detect_color(!cli.no_color),
    };
    cli::output::init_logging(&output_opts);

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => config_failure(e.to_string()),
    };

    let request = CheckRequest {
        customer_account_id: cli.customer_account_id,
        project_id: cli.project_id,
        warning: cli.warning,
        critical: cli.critical,
        sa_key_json: cli.sa_key_json,
        skip_discount: cli.skip_discount,
        timeout_secs: cli.timeout,
    };
    let plan = match CheckPlan::resolve(request, &config) {
        Ok(plan) => plan,
        Err(e) => finish(CheckOutcome::unknown(&e)),
    };

    finish(cli::check_cmd::run(&plan).await)
}
