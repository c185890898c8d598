use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::auth::AccessToken;
use crate::core::error::CheckError;
use crate::core::models::billing::{BillingReport, DateWindow, ReportEntry, TotalsFallback};

pub const DEFAULT_COST_URL: &str = "https://cost.api.stackit.cloud";

const CENTS_PER_EURO: Decimal = Decimal::ONE_HUNDRED;

#[derive(Deserialize)]
struct TimePeriod {
    start: NaiveDate,
    #[allow(dead_code)]
    end: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportDataRow {
    time_period: TimePeriod,
    charge: Decimal,
    #[serde(default)]
    discount: Decimal,
}

/// Project cost item. `reportData` is only present on the detailed variant.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CostItemResponse {
    total_charge: Option<Decimal>,
    total_discount: Option<Decimal>,
    report_data: Option<Vec<ReportDataRow>>,
}

/// Reject negative API amounts and convert cents to euros.
fn euros(value: Decimal, what: &str) -> Result<Decimal, CheckError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CheckError::Data(format!("negative {}: {}", what, value)));
    }
    Ok(value / CENTS_PER_EURO)
}

fn into_report(item: CostItemResponse, window: &DateWindow) -> Result<BillingReport, CheckError> {
    let Some(rows) = item.report_data else {
        if item.total_charge.is_none() && item.total_discount.is_none() {
            debug!("No report data and no totals for {}", window.start);
            return Ok(BillingReport::default());
        }
        warn!(
            "Cost API returned no reportData for {}, falling back to totals",
            window.start
        );
        return Ok(BillingReport::totals_only(TotalsFallback {
            period: *window,
            total_charge: euros(item.total_charge.unwrap_or_default(), "total charge")?,
            total_discount: euros(
                item.total_discount.unwrap_or_default(),
                "total discount",
            )?,
        }));
    };

    let mut entries: Vec<ReportEntry> = Vec::with_capacity(rows.len());
    for row in rows {
        let date = row.time_period.start;
        if !window.contains(date) {
            return Err(CheckError::Data(format!(
                "cost API returned unexpected date: {}",
                date
            )));
        }
        if entries.iter().any(|e| e.date == date) {
            return Err(CheckError::Data(format!(
                "cost API returned more than one entry for {}",
                date
            )));
        }
        entries.push(ReportEntry {
            date,
            charge: euros(row.charge, "charge")?,
            discount: euros(row.discount, "discount")?,
        });
    }
    Ok(BillingReport::daily(entries))
}

/// Client for the project cost endpoint.
pub struct CostApi {
    client: reqwest::Client,
    base_url: String,
}

impl CostApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn project_url(&self, customer_account_id: &str, project_id: &str) -> String {
        format!(
            "{}/v3/costs/{}/projects/{}",
            self.base_url, customer_account_id, project_id
        )
    }

    /// Query daily, project-level costs for one window. Not retried.
    pub async fn fetch_report(
        &self,
        customer_account_id: &str,
        project_id: &str,
        window: &DateWindow,
        token: &AccessToken,
    ) -> Result<BillingReport, CheckError> {
        let Some(to) = window.last_day() else {
            return Err(CheckError::Data(format!(
                "empty date window starting {}",
                window.start
            )));
        };
        let url = self.project_url(customer_account_id, project_id);
        debug!("GET {} from={} to={}", url, window.start, to);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("from", window.start.to_string()),
                ("to", to.to_string()),
                ("granularity", "daily".to_string()),
                ("depth", "project".to_string()),
                ("includeZeroCosts", "false".to_string()),
            ])
            .bearer_auth(token.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to cost API")
            .map_err(CheckError::fetch)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckError::Fetch(format!(
                "HTTP {} from cost API: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let item: CostItemResponse = response
            .json()
            .await
            .context("Failed to parse cost API response")
            .map_err(CheckError::fetch)?;

        into_report(item, window)
    }
}
