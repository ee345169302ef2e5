use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::round_to;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum InvestmentKind {
    #[default]
    Stock,
    Crypto,
    Bond,
    Etf,
}

impl fmt::Display for InvestmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvestmentKind::Stock => "Stock",
            InvestmentKind::Crypto => "Crypto",
            InvestmentKind::Bond => "Bond",
            InvestmentKind::Etf => "ETF",
        };
        f.write_str(label)
    }
}

impl FromStr for InvestmentKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(InvestmentKind::Stock),
            "crypto" => Ok(InvestmentKind::Crypto),
            "bond" => Ok(InvestmentKind::Bond),
            "etf" => Ok(InvestmentKind::Etf),
            other => Err(format!("unknown investment type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Investment {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: InvestmentKind,
    /// Amount originally invested.
    pub amount: f64,
    pub current_value: f64,
    pub purchase_date: NaiveDate,
}

impl Investment {
    pub fn new(
        name: impl Into<String>,
        kind: InvestmentKind,
        amount: f64,
        current_value: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            amount,
            current_value,
            purchase_date,
        }
    }

    pub fn return_amount(&self) -> f64 {
        self.current_value - self.amount
    }

    pub fn return_percent(&self) -> f64 {
        if self.amount <= 0.0 {
            return 0.0;
        }
        round_to(self.return_amount() / self.amount * 100.0, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_percent_is_rounded_to_two_places() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let inv = Investment::new("BTC", InvestmentKind::Crypto, 300.0, 400.0, date);
        assert_eq!(inv.return_amount(), 100.0);
        assert_eq!(inv.return_percent(), 33.33);
    }

    #[test]
    fn zero_principal_has_no_return_percent() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let inv = Investment::new("Gift", InvestmentKind::Stock, 0.0, 50.0, date);
        assert_eq!(inv.return_percent(), 0.0);
    }
}
