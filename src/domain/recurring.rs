use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::{Transaction, TransactionKind};
use crate::currency::DEFAULT_CURRENCY;

const MAX_OCCURRENCES: u32 = 10_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecurrenceKind::Daily => "Daily",
            RecurrenceKind::Weekly => "Weekly",
            RecurrenceKind::Monthly => "Monthly",
            RecurrenceKind::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

impl FromStr for RecurrenceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(RecurrenceKind::Daily),
            "weekly" | "week" => Ok(RecurrenceKind::Weekly),
            "monthly" | "month" => Ok(RecurrenceKind::Monthly),
            "yearly" | "year" | "annual" => Ok(RecurrenceKind::Yearly),
            other => Err(format!("unknown recurrence `{other}`")),
        }
    }
}

/// Template for a transaction that repeats on a fixed schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringTransaction {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub recurrence: RecurrenceKind,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Pins monthly and yearly occurrences to this day, clamped to the month length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated: Option<NaiveDate>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_active() -> bool {
    true
}

impl RecurringTransaction {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        category: impl Into<String>,
        recurrence: RecurrenceKind,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            kind,
            category: category.into(),
            currency: default_currency(),
            recurrence,
            start_date,
            end_date: None,
            is_active: true,
            day_of_month: None,
            last_generated: None,
        }
    }

    /// Date of the `index`-th occurrence, counting the start date as 0.
    pub fn occurrence(&self, index: u32) -> Option<NaiveDate> {
        match self.recurrence {
            RecurrenceKind::Daily => self
                .start_date
                .checked_add_signed(Duration::days(i64::from(index))),
            RecurrenceKind::Weekly => self
                .start_date
                .checked_add_signed(Duration::weeks(i64::from(index))),
            RecurrenceKind::Monthly => self.month_step(index),
            RecurrenceKind::Yearly => self.month_step(index.checked_mul(12)?),
        }
    }

    fn month_step(&self, months: u32) -> Option<NaiveDate> {
        let shifted = self.start_date.checked_add_months(Months::new(months))?;
        match self.day_of_month {
            Some(day) => {
                let day = day.clamp(1, days_in_month(shifted.year(), shifted.month()));
                shifted.with_day(day)
            }
            None => Some(shifted),
        }
    }

    /// Occurrences after `last_generated` (or from the start) up to and including `today`.
    /// A pinned day earlier than the start day never yields a date before `start_date`.
    pub fn due_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        if !self.is_active {
            return Vec::new();
        }
        let mut dates = Vec::new();
        for index in 0..MAX_OCCURRENCES {
            let Some(date) = self.occurrence(index) else {
                break;
            };
            if date > today || self.end_date.map_or(false, |end| date > end) {
                break;
            }
            if date >= self.start_date && self.last_generated.map_or(true, |last| date > last) {
                dates.push(date);
            }
        }
        dates
    }

    pub fn next_due(&self, today: NaiveDate) -> Option<NaiveDate> {
        if !self.is_active {
            return None;
        }
        (0..MAX_OCCURRENCES)
            .map_while(|index| self.occurrence(index))
            .take_while(|date| self.end_date.map_or(true, |end| *date <= end))
            .filter(|date| *date >= self.start_date)
            .find(|date| *date >= today && self.last_generated.map_or(true, |last| *date > last))
    }

    pub fn materialize(&self, date: NaiveDate) -> Transaction {
        let mut txn = Transaction::new(
            self.description.clone(),
            self.amount,
            self.kind,
            self.category.clone(),
            date,
        )
        .with_currency(self.currency.clone());
        txn.notes = format!("Recurring ({})", self.recurrence);
        txn
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rent(start: NaiveDate) -> RecurringTransaction {
        RecurringTransaction::new(
            "Rent",
            900.0,
            TransactionKind::Expense,
            "Rent",
            RecurrenceKind::Monthly,
            start,
        )
    }

    #[test]
    fn monthly_dates_clamp_to_short_months() {
        let mut series = rent(date(2024, 1, 31));
        series.day_of_month = Some(31);
        assert_eq!(series.occurrence(1), Some(date(2024, 2, 29)));
        assert_eq!(series.occurrence(2), Some(date(2024, 3, 31)));
    }

    #[test]
    fn due_dates_skip_generated_and_respect_end() {
        let mut series = rent(date(2024, 1, 5));
        series.last_generated = Some(date(2024, 1, 5));
        series.end_date = Some(date(2024, 3, 31));
        let due = series.due_dates(date(2024, 6, 1));
        assert_eq!(due, vec![date(2024, 2, 5), date(2024, 3, 5)]);
    }

    #[test]
    fn pinned_day_before_start_skips_the_first_month() {
        let mut series = rent(date(2024, 1, 15));
        series.day_of_month = Some(5);
        assert!(series.due_dates(date(2024, 1, 20)).is_empty());
        assert_eq!(series.due_dates(date(2024, 2, 10)), vec![date(2024, 2, 5)]);
        assert_eq!(series.next_due(date(2024, 1, 1)), Some(date(2024, 2, 5)));
    }

    #[test]
    fn inactive_series_has_nothing_due() {
        let mut series = rent(date(2024, 1, 1));
        series.is_active = false;
        assert!(series.due_dates(date(2024, 5, 1)).is_empty());
        assert_eq!(series.next_due(date(2024, 5, 1)), None);
    }

    #[test]
    fn weekly_next_due_is_on_or_after_today() {
        let series = RecurringTransaction::new(
            "Cleaning",
            40.0,
            TransactionKind::Expense,
            "Other",
            RecurrenceKind::Weekly,
            date(2024, 1, 1),
        );
        assert_eq!(series.next_due(date(2024, 1, 3)), Some(date(2024, 1, 8)));
    }

    #[test]
    fn days_in_month_handles_december_and_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
    }
}
