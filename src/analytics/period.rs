use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::Transaction;

/// Trailing window used by the dashboards and flow diagram.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AnalysisPeriod {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    LastYear,
}

impl AnalysisPeriod {
    pub const ALL: [AnalysisPeriod; 4] = [
        AnalysisPeriod::Last7Days,
        AnalysisPeriod::Last30Days,
        AnalysisPeriod::Last90Days,
        AnalysisPeriod::LastYear,
    ];

    /// Earliest date included in the window.
    pub fn cutoff(self, today: NaiveDate) -> NaiveDate {
        let shifted = match self {
            AnalysisPeriod::Last7Days => today.checked_sub_signed(Duration::days(7)),
            AnalysisPeriod::Last30Days => today.checked_sub_signed(Duration::days(30)),
            AnalysisPeriod::Last90Days => today.checked_sub_signed(Duration::days(90)),
            AnalysisPeriod::LastYear => today.checked_sub_months(Months::new(12)),
        };
        shifted.unwrap_or(NaiveDate::MIN)
    }

    pub fn filter<'a>(
        self,
        transactions: &'a [Transaction],
        today: NaiveDate,
    ) -> Vec<&'a Transaction> {
        let cutoff = self.cutoff(today);
        transactions
            .iter()
            .filter(|txn| txn.date >= cutoff)
            .collect()
    }

    pub fn code(self) -> &'static str {
        match self {
            AnalysisPeriod::Last7Days => "7d",
            AnalysisPeriod::Last30Days => "30d",
            AnalysisPeriod::Last90Days => "90d",
            AnalysisPeriod::LastYear => "1y",
        }
    }
}

impl fmt::Display for AnalysisPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisPeriod::Last7Days => "Last 7 days",
            AnalysisPeriod::Last30Days => "Last 30 days",
            AnalysisPeriod::Last90Days => "Last 90 days",
            AnalysisPeriod::LastYear => "Last year",
        };
        f.write_str(label)
    }
}

impl FromStr for AnalysisPeriod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "7d" | "week" | "last7days" => Ok(AnalysisPeriod::Last7Days),
            "30d" | "month" | "last30days" => Ok(AnalysisPeriod::Last30Days),
            "90d" | "quarter" | "last90days" => Ok(AnalysisPeriod::Last90Days),
            "1y" | "year" | "lastyear" => Ok(AnalysisPeriod::LastYear),
            other => Err(format!("unknown period `{other}` (use 7d, 30d, 90d or 1y)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cutoffs() {
        let today = date(2024, 3, 31);
        assert_eq!(AnalysisPeriod::Last7Days.cutoff(today), date(2024, 3, 24));
        assert_eq!(AnalysisPeriod::Last30Days.cutoff(today), date(2024, 3, 1));
        assert_eq!(AnalysisPeriod::LastYear.cutoff(today), date(2023, 3, 31));
    }

    #[test]
    fn filter_keeps_cutoff_day() {
        let today = date(2024, 3, 31);
        let txns = vec![
            Transaction::income("a", 1.0, "Salary", date(2024, 3, 24)),
            Transaction::income("b", 1.0, "Salary", date(2024, 3, 23)),
        ];
        let kept = AnalysisPeriod::Last7Days.filter(&txns, today);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].description, "a");
    }

    #[test]
    fn codes_round_trip_through_parse() {
        for period in AnalysisPeriod::ALL {
            assert_eq!(period.code().parse::<AnalysisPeriod>(), Ok(period));
        }
    }
}
