use chrono::{DateTime, NaiveDate, Utc};

use crate::core::models::billing::DateWindow;

/// The two UTC calendar days a check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPair {
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
}

impl DayPair {
    /// Days for the current instant. The cost API bills in UTC, so the local
    /// timezone is never consulted.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::for_today(instant.date_naive())
    }

    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            today,
            yesterday: today - chrono::Duration::days(1),
        }
    }

    pub fn today_window(&self) -> DateWindow {
        DateWindow::single_day(self.today)
    }

    pub fn yesterday_window(&self) -> DateWindow {
        DateWindow::single_day(self.yesterday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn yesterday_is_one_day_before_today() {
        let days = DayPair::for_today("2026-03-01".parse().unwrap());
        assert_eq!(days.yesterday, "2026-02-28".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn uses_utc_date_not_local_offset() {
        // 00:30 on Oct 19 in UTC+2 is still Oct 18 in UTC.
        let local = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 0, 30, 0)
            .unwrap();
        let days = DayPair::at(local.with_timezone(&Utc));
        assert_eq!(days.today, "2026-10-18".parse::<NaiveDate>().unwrap());
        assert_eq!(days.yesterday, "2026-10-17".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn windows_cover_single_days() {
        let days = DayPair::for_today("2026-10-19".parse().unwrap());
        assert_eq!(days.today_window().days(), 1);
        assert_eq!(days.yesterday_window().start, days.yesterday);
        assert_eq!(days.yesterday_window().end, days.today);
    }
}
