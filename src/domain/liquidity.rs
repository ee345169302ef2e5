use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How pressing an unpaid obligation is, relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UrgencyLevel {
    Overdue,
    Critical,
    High,
    Medium,
    Low,
    Paid,
}

impl UrgencyLevel {
    pub fn classify(days_until_due: i64) -> Self {
        match days_until_due {
            d if d < 0 => UrgencyLevel::Overdue,
            d if d <= 3 => UrgencyLevel::Critical,
            d if d <= 7 => UrgencyLevel::High,
            d if d <= 14 => UrgencyLevel::Medium,
            _ => UrgencyLevel::Low,
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UrgencyLevel::Overdue => "Overdue",
            UrgencyLevel::Critical => "Critical",
            UrgencyLevel::High => "High",
            UrgencyLevel::Medium => "Medium",
            UrgencyLevel::Low => "Low",
            UrgencyLevel::Paid => "Paid",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ProbabilityLevel {
    Confirmed,
    #[default]
    Likely,
    Uncertain,
}

impl ProbabilityLevel {
    pub fn weight(self) -> f64 {
        match self {
            ProbabilityLevel::Confirmed => 1.0,
            ProbabilityLevel::Likely => 0.75,
            ProbabilityLevel::Uncertain => 0.4,
        }
    }

    pub fn percent(self) -> u8 {
        match self {
            ProbabilityLevel::Confirmed => 100,
            ProbabilityLevel::Likely => 75,
            ProbabilityLevel::Uncertain => 40,
        }
    }
}

impl fmt::Display for ProbabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProbabilityLevel::Confirmed => "Confirmed",
            ProbabilityLevel::Likely => "Likely",
            ProbabilityLevel::Uncertain => "Uncertain",
        };
        f.write_str(label)
    }
}

impl FromStr for ProbabilityLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(ProbabilityLevel::Confirmed),
            "likely" => Ok(ProbabilityLevel::Likely),
            "uncertain" => Ok(ProbabilityLevel::Uncertain),
            other => Err(format!("unknown probability `{other}`")),
        }
    }
}

/// Money owed to someone else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payable {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    #[serde(default)]
    pub creditor: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Payable {
    pub fn new(title: impl Into<String>, amount: f64, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            amount,
            creditor: String::new(),
            due_date,
            is_paid: false,
            created_at: Utc::now(),
        }
    }

    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn urgency(&self, today: NaiveDate) -> UrgencyLevel {
        if self.is_paid {
            return UrgencyLevel::Paid;
        }
        UrgencyLevel::classify(self.days_until_due(today))
    }
}

/// Money expected from someone else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receivable {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    #[serde(default)]
    pub debtor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    pub expected_date: NaiveDate,
    #[serde(default)]
    pub probability: ProbabilityLevel,
    #[serde(default)]
    pub is_received: bool,
    pub created_at: DateTime<Utc>,
}

impl Receivable {
    pub fn new(
        title: impl Into<String>,
        amount: f64,
        expected_date: NaiveDate,
        probability: ProbabilityLevel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            amount,
            debtor: String::new(),
            project_id: None,
            expected_date,
            probability,
            is_received: false,
            created_at: Utc::now(),
        }
    }

    pub fn weighted_amount(&self) -> f64 {
        if self.is_received {
            return self.amount;
        }
        self.amount * self.probability.weight()
    }

    pub fn confidence_percent(&self) -> u8 {
        self.probability.percent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn urgency_bands_follow_days_left() {
        let today = day(10);
        let cases = [
            (day(9), UrgencyLevel::Overdue),
            (day(10), UrgencyLevel::Critical),
            (day(13), UrgencyLevel::Critical),
            (day(14), UrgencyLevel::High),
            (day(17), UrgencyLevel::High),
            (day(24), UrgencyLevel::Medium),
            (day(25), UrgencyLevel::Low),
        ];
        for (due, expected) in cases {
            assert_eq!(Payable::new("x", 1.0, due).urgency(today), expected, "due {due}");
        }
    }

    #[test]
    fn paid_payables_are_never_urgent() {
        let mut payable = Payable::new("Rent", 500.0, day(1));
        payable.is_paid = true;
        assert_eq!(payable.urgency(day(20)), UrgencyLevel::Paid);
    }

    #[test]
    fn receivable_weight_depends_on_probability() {
        let mut r = Receivable::new("Invoice", 1000.0, day(20), ProbabilityLevel::Uncertain);
        assert_eq!(r.weighted_amount(), 400.0);
        r.probability = ProbabilityLevel::Likely;
        assert_eq!(r.weighted_amount(), 750.0);
        assert_eq!(r.confidence_percent(), 75);
        r.is_received = true;
        assert_eq!(r.weighted_amount(), 1000.0);
    }
}
