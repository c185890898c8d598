use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Currency of every amount reported by the cost API.
pub const CURRENCY: &str = "EUR";

/// Half-open range of UTC calendar days: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day + chrono::Duration::days(1),
        }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Last day inside the window, as sent in the API's inclusive `to` parameter.
    pub fn last_day(&self) -> Option<NaiveDate> {
        if self.days() == 0 {
            return None;
        }
        self.end.pred_opt()
    }
}

/// One day of reported costs, converted to euros.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub date: NaiveDate,
    /// Charge after discounts.
    pub charge: Decimal,
    /// Discount granted on top of `charge`.
    pub discount: Decimal,
}

impl ReportEntry {
    pub fn amount(&self, include_discount: bool) -> Decimal {
        gross(self.charge, self.discount, include_discount)
    }
}

/// Aggregate totals returned when per-day report data is unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsFallback {
    pub period: DateWindow,
    pub total_charge: Decimal,
    pub total_discount: Decimal,
}

/// Outcome of one cost query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingReport {
    pub entries: Vec<ReportEntry>,
    /// Only set when the response carried no `reportData`.
    pub totals: Option<TotalsFallback>,
}

impl BillingReport {
    pub fn daily(entries: Vec<ReportEntry>) -> Self {
        Self {
            entries,
            totals: None,
        }
    }

    pub fn totals_only(totals: TotalsFallback) -> Self {
        Self {
            entries: Vec::new(),
            totals: Some(totals),
        }
    }

    pub fn report_data_missing(&self) -> bool {
        self.totals.is_some()
    }

    pub fn entry_for(&self, date: NaiveDate) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.date == date)
    }
}

pub(crate) fn gross(charge: Decimal, discount: Decimal, include_discount: bool) -> Decimal {
    if include_discount {
        charge + discount
    } else {
        charge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn single_day_window_is_half_open() {
        let w = DateWindow::single_day(date("2026-10-18"));
        assert_eq!(w.end, date("2026-10-19"));
        assert_eq!(w.days(), 1);
        assert!(w.contains(date("2026-10-18")));
        assert!(!w.contains(date("2026-10-19")));
        assert_eq!(w.last_day(), Some(date("2026-10-18")));
    }

    #[test]
    fn empty_window_has_no_last_day() {
        let empty = DateWindow {
            start: date("2026-10-18"),
            end: date("2026-10-18"),
        };
        assert_eq!(empty.days(), 0);
        assert_eq!(empty.last_day(), None);
    }

    #[test]
    fn window_crosses_month_boundary() {
        let w = DateWindow::single_day(date("2026-02-28"));
        assert_eq!(w.end, date("2026-03-01"));
    }

    #[test]
    fn entry_amount_respects_discount_flag() {
        let entry = ReportEntry {
            date: date("2026-10-18"),
            charge: dec!(12.50),
            discount: dec!(2.00),
        };
        assert_eq!(entry.amount(true), dec!(14.50));
        assert_eq!(entry.amount(false), dec!(12.50));
    }

    #[test]
    fn report_data_missing_only_with_totals() {
        assert!(!BillingReport::default().report_data_missing());
        let report = BillingReport::totals_only(TotalsFallback {
            period: DateWindow::single_day(date("2026-10-18")),
            total_charge: dec!(1),
            total_discount: dec!(0),
        });
        assert!(report.report_data_missing());
    }
}
