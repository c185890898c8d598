use anyhow::Context;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::auth::{self, AccessToken};
use crate::core::billing::api::CostApi;
use crate::core::billing::extract::select_cost;
use crate::core::config::AppConfig;
use crate::core::days::DayPair;
use crate::core::error::CheckError;
use crate::core::evaluate::{unknown_line, CheckReport};
use crate::core::models::verdict::{Thresholds, Verdict};

/// Values given on the command line; `None` falls back to the config file.
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    pub customer_account_id: String,
    pub project_id: String,
    pub warning: Option<Decimal>,
    pub critical: Option<Decimal>,
    pub sa_key_json: Option<PathBuf>,
    pub skip_discount: bool,
    pub timeout_secs: Option<u64>,
}

/// Fully validated inputs of one check run.
#[derive(Debug, Clone)]
pub struct CheckPlan {
    pub customer_account_id: String,
    pub project_id: String,
    pub thresholds: Thresholds,
    pub sa_key_json: PathBuf,
    pub include_discount: bool,
    pub timeout: Duration,
    pub cost_url: String,
    pub token_url: String,
}

fn required_id(value: &str, flag: &str) -> Result<String, CheckError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CheckError::Config(format!("--{} must not be empty", flag)));
    }
    Ok(value.to_string())
}

impl CheckPlan {
    /// Merge CLI values over the config file and validate, before any I/O.
    pub fn resolve(request: CheckRequest, config: &AppConfig) -> Result<Self, CheckError> {
        let customer_account_id = required_id(&request.customer_account_id, "customer-account-id")?;
        let project_id = required_id(&request.project_id, "project-id")?;

        let mut merged = config.clone();
        if let Some(w) = request.warning {
            merged.thresholds.warning = w;
        }
        if let Some(c) = request.critical {
            merged.thresholds.critical = c;
        }
        if let Some(t) = request.timeout_secs {
            merged.settings.timeout_secs = t;
        }
        let issues = merged.validate();
        if !issues.is_empty() {
            return Err(CheckError::Config(issues.join("; ")));
        }

        Ok(Self {
            customer_account_id,
            project_id,
            thresholds: Thresholds {
                warning: merged.thresholds.warning,
                critical: merged.thresholds.critical,
            },
            sa_key_json: request
                .sa_key_json
                .or(merged.auth.sa_key_json)
                .unwrap_or_else(auth::default_key_path),
            include_discount: !(request.skip_discount || merged.settings.skip_discount),
            timeout: Duration::from_secs(merged.settings.timeout_secs),
            cost_url: merged.api.cost_url,
            token_url: merged.api.token_url,
        })
    }
}

/// What gets printed and returned to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub line: String,
    pub exit_code: i32,
}

impl CheckOutcome {
    pub fn unknown(err: &CheckError) -> Self {
        Self {
            line: unknown_line(err),
            exit_code: Verdict::Unknown.exit_code(),
        }
    }
}

impl From<Result<CheckReport, CheckError>> for CheckOutcome {
    fn from(result: Result<CheckReport, CheckError>) -> Self {
        match result {
            Ok(report) => Self {
                line: report.status_line(),
                exit_code: report.exit_code(),
            },
            Err(err) => Self::unknown(&err),
        }
    }
}

/// Fetch both days concurrently and evaluate. Either fetch failing fails the run.
pub async fn evaluate_project(
    api: &CostApi,
    plan: &CheckPlan,
    token: &AccessToken,
    days: &DayPair,
) -> Result<CheckReport, CheckError> {
    let today_window = days.today_window();
    let yesterday_window = days.yesterday_window();
    let (today, yesterday) = tokio::join!(
        api.fetch_report(&plan.customer_account_id, &plan.project_id, &today_window, token),
        api.fetch_report(&plan.customer_account_id, &plan.project_id, &yesterday_window, token),
    );

    for (label, result) in [("today", &today), ("yesterday", &yesterday)] {
        match result {
            Ok(report) => debug!(
                "{}: {} report entries, reportData missing: {}",
                label,
                report.entries.len(),
                report.report_data_missing()
            ),
            Err(e) => warn!("Fetching {} costs failed: {}", label, e),
        }
    }

    let selection = select_cost(&today?, &yesterday?, days, plan.include_discount)?;
    Ok(CheckReport::new(selection, plan.thresholds))
}

async fn check(plan: &CheckPlan, days: &DayPair) -> Result<CheckReport, CheckError> {
    let client = reqwest::Client::builder()
        .timeout(plan.timeout)
        .build()
        .context("Failed to build HTTP client")
        .map_err(CheckError::fetch)?;

    let token = auth::authenticate(&client, &plan.token_url, &plan.sa_key_json).await?;
    let api = CostApi::new(client, plan.cost_url.as_str());
    evaluate_project(&api, plan, &token, days).await
}

/// Run one check for `days` under the plan's overall deadline. Never fails:
/// errors become an UNKNOWN outcome.
pub async fn run_for(plan: &CheckPlan, days: DayPair) -> CheckOutcome {
    debug!(
        "Checking project {} for {} and {}",
        plan.project_id, days.yesterday, days.today
    );
    let result = match tokio::time::timeout(plan.timeout, check(plan, &days)).await {
        Ok(result) => result,
        Err(_) => Err(CheckError::Timeout(plan.timeout)),
    };
    CheckOutcome::from(result)
}

pub async fn run(plan: &CheckPlan) -> CheckOutcome {
    run_for(plan, DayPair::now()).await
}
