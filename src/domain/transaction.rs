use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::DEFAULT_CURRENCY;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn is_income(self) -> bool {
        matches!(self, TransactionKind::Income)
    }

    /// Applies the direction of money flow to an unsigned amount.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => f.write_str("Income"),
            TransactionKind::Expense => f.write_str("Expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "in" | "+" => Ok(TransactionKind::Income),
            "expense" | "out" | "-" => Ok(TransactionKind::Expense),
            other => Err(format!("unknown transaction type `{other}`")),
        }
    }
}

/// A single income or expense booking. `amount` is always positive; `kind` carries the sign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            kind,
            category: category.into(),
            project: None,
            currency: default_currency(),
            date,
            notes: String::new(),
        }
    }

    pub fn income(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(description, amount, TransactionKind::Income, category, date)
    }

    pub fn expense(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(description, amount, TransactionKind::Expense, category, date)
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_uppercase();
        self
    }

    pub fn is_income(&self) -> bool {
        self.kind.is_income()
    }

    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }

    /// Case-insensitive match against description or category.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.description.to_lowercase().contains(&needle)
            || self.category.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn signed_amount_follows_kind() {
        assert_eq!(Transaction::income("Pay", 10.0, "Salary", date()).signed_amount(), 10.0);
        assert_eq!(Transaction::expense("Bus", 2.5, "Transport", date()).signed_amount(), -2.5);
    }

    #[test]
    fn matches_is_case_insensitive_over_description_and_category() {
        let txn = Transaction::expense("AWS Cloud Services", 12.0, "Infrastructure", date());
        assert!(txn.matches("cloud"));
        assert!(txn.matches("INFRA"));
        assert!(!txn.matches("food"));
    }

    #[test]
    fn kind_parses_aliases() {
        assert_eq!("IN".parse::<TransactionKind>(), Ok(TransactionKind::Income));
        assert_eq!("expense".parse::<TransactionKind>(), Ok(TransactionKind::Expense));
        assert!("gift".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn missing_currency_defaults_when_deserializing() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000000","description":"x","amount":1.0,
            "kind":"Income","category":"Salary","date":"2024-03-01"}"#;
        let txn: Transaction = serde_json::from_str(json).expect("parse");
        assert_eq!(txn.currency, DEFAULT_CURRENCY);
        assert!(txn.notes.is_empty());
    }
}
