use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::core::days::DayPair;
use crate::core::error::CheckError;
use crate::core::models::billing::{gross, BillingReport, TotalsFallback};
use crate::core::models::cost::{CostSource, EffectiveCost};

/// Apportion aggregate totals to a single day. A one-day period is taken as-is,
/// longer periods are divided evenly. The quotient stays exact; only output rounds.
fn estimate_day(totals: &TotalsFallback) -> Result<(Decimal, Decimal), CheckError> {
    let days = totals.period.days();
    if days <= 0 {
        return Err(CheckError::Data(format!(
            "totals period {}..{} covers zero days",
            totals.period.start, totals.period.end
        )));
    }
    if days == 1 {
        return Ok((totals.total_charge, totals.total_discount));
    }
    let days = Decimal::from(days);
    Ok((totals.total_charge / days, totals.total_discount / days))
}

/// Reduce one cost report to the cost of `date`.
///
/// Precedence: an exact report entry, then an estimate from totals, then zero.
/// A day without any data yet (usual for today) costs zero and is not an error.
pub fn extract_cost(
    report: &BillingReport,
    date: NaiveDate,
    include_discount: bool,
) -> Result<EffectiveCost, CheckError> {
    if let Some(entry) = report.entry_for(date) {
        return Ok(EffectiveCost {
            amount: entry.amount(include_discount),
            charge: entry.charge,
            discount: entry.discount,
            source: CostSource::Reported,
            for_date: date,
        });
    }

    if let Some(totals) = &report.totals {
        let (charge, discount) = estimate_day(totals)?;
        warn!(
            "No report data for {}, estimating {} EUR from totals over {} day(s)",
            date,
            charge,
            totals.period.days()
        );
        return Ok(EffectiveCost {
            amount: gross(charge, discount, include_discount),
            charge,
            discount,
            source: CostSource::Estimated,
            for_date: date,
        });
    }

    Ok(EffectiveCost::zero(date))
}

/// Pick the higher of the two days. On a tie yesterday wins, since it is the
/// complete day.
pub fn select_effective(today: &EffectiveCost, yesterday: &EffectiveCost) -> EffectiveCost {
    if today.amount > yesterday.amount {
        today.clone()
    } else {
        yesterday.clone()
    }
}

/// Per-day costs plus the one chosen for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSelection {
    pub today: EffectiveCost,
    pub yesterday: EffectiveCost,
    pub effective: EffectiveCost,
}

/// Extract both days and select the figure to evaluate.
pub fn select_cost(
    today_report: &BillingReport,
    yesterday_report: &BillingReport,
    days: &DayPair,
    include_discount: bool,
) -> Result<CostSelection, CheckError> {
    let today = extract_cost(today_report, days.today, include_discount)?;
    let yesterday = extract_cost(yesterday_report, days.yesterday, include_discount)?;
    let effective = select_effective(&today, &yesterday);
    Ok(CostSelection {
        today,
        yesterday,
        effective,
    })
}
