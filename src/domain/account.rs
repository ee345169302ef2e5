use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AccountKind {
    #[default]
    Checking,
    Savings,
    Cash,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
            AccountKind::Cash => "Cash",
        };
        f.write_str(label)
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            "cash" => Ok(AccountKind::Cash),
            other => Err(format!("unknown account type `{other}`")),
        }
    }
}

/// A place where money sits. Balances may go negative (credit lines, overdrafts).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub institution: String,
    pub balance: f64,
    #[serde(default)]
    pub kind: AccountKind,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, kind: AccountKind, balance: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            institution: String::new(),
            balance,
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = institution.into();
        self
    }
}
