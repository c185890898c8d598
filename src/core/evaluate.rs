use rust_decimal::Decimal;
use tracing::warn;

use crate::core::billing::extract::CostSelection;
use crate::core::error::CheckError;
use crate::core::formatter::{format_eur, format_perf_item};
use crate::core::models::verdict::{Thresholds, Verdict};

/// Map an amount to a verdict. Critical is checked first, so it wins even when
/// the thresholds are inverted. Never returns `Unknown`.
pub fn evaluate(amount: Decimal, thresholds: &Thresholds) -> Verdict {
    if amount >= thresholds.critical {
        Verdict::Critical
    } else if amount >= thresholds.warning {
        Verdict::Warning
    } else {
        Verdict::Ok
    }
}

/// Result of a successful check run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub verdict: Verdict,
    pub selection: CostSelection,
    pub thresholds: Thresholds,
}

impl CheckReport {
    pub fn new(selection: CostSelection, thresholds: Thresholds) -> Self {
        if thresholds.warning > thresholds.critical {
            warn!(
                "Warning threshold {} exceeds critical threshold {}",
                thresholds.warning, thresholds.critical
            );
        }
        Self {
            verdict: evaluate(selection.effective.amount, &thresholds),
            selection,
            thresholds,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code()
    }

    /// Single output line:
    ///
    /// ```text
    /// WARNING: Daily costs 12.50 EUR on 2026-10-18 (REPORTED) >= warning 10.00 EUR, critical 50.00 EUR | cost=12.50;10.00;50.00;0 ...
    /// ```
    pub fn status_line(&self) -> String {
        let effective = &self.selection.effective;
        let warning = format_eur(self.thresholds.warning);
        let critical = format_eur(self.thresholds.critical);
        let limits = match self.verdict {
            Verdict::Critical => format!(">= critical {}, warning {}", critical, warning),
            Verdict::Warning => format!(">= warning {}, critical {}", warning, critical),
            Verdict::Ok | Verdict::Unknown => {
                format!("below warning {}, critical {}", warning, critical)
            }
        };
        format!(
            "{}: Daily costs {} on {} ({}) {} | {}",
            self.verdict,
            format_eur(effective.amount),
            effective.for_date,
            effective.source,
            limits,
            self.perf_data()
        )
    }

    fn perf_data(&self) -> String {
        let sel = &self.selection;
        [
            format_perf_item(
                "cost",
                sel.effective.amount,
                Some(self.thresholds.warning),
                Some(self.thresholds.critical),
                Some(Decimal::ZERO),
            ),
            format_perf_item("yesterday_cost", sel.yesterday.charge, None, None, None),
            format_perf_item(
                "yesterday_discounted_cost",
                sel.yesterday.discount,
                None,
                None,
                None,
            ),
            format_perf_item("today_cost", sel.today.charge, None, None, None),
            format_perf_item("today_discounted_cost", sel.today.discount, None, None, None),
        ]
        .join(" ")
    }
}

/// Status line for a run that produced no cost figure.
pub fn unknown_line(err: &CheckError) -> String {
    // Keep the output to one line and free of the perfdata separator.
    let cause = err.to_string().replace(['\n', '\r'], " ").replace('|', "/");
    format!("{}: {} |", Verdict::Unknown, cause)
}
