use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::DEFAULT_CURRENCY;

/// A spending cap for one expense category over a one-month window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub category: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Budget {
    pub fn new(category: impl Into<String>, amount: f64, start_date: NaiveDate) -> Self {
        let end_date = start_date
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self {
            id: Uuid::new_v4(),
            category: category.into(),
            amount,
            currency: default_currency(),
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
