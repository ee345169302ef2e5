use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billable hours per month assumed for hourly contractors.
pub const HOURS_PER_MONTH: f64 = 160.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Hourly,
    OneTime,
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentFrequency::Monthly => "Monthly",
            PaymentFrequency::Hourly => "Hourly",
            PaymentFrequency::OneTime => "One-time",
        };
        f.write_str(label)
    }
}

impl FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "monthly" => Ok(PaymentFrequency::Monthly),
            "hourly" => Ok(PaymentFrequency::Hourly),
            "onetime" | "once" => Ok(PaymentFrequency::OneTime),
            other => Err(format!("unknown payment frequency `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub salary: f64,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub project_id: Uuid,
    pub joined_date: NaiveDate,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        salary: f64,
        frequency: PaymentFrequency,
        project_id: Uuid,
        joined_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role: role.into(),
            salary,
            frequency,
            is_active: true,
            project_id,
            joined_date,
        }
    }

    pub fn monthly_cost(&self) -> f64 {
        match self.frequency {
            PaymentFrequency::Monthly => self.salary,
            PaymentFrequency::Hourly => self.salary * HOURS_PER_MONTH,
            PaymentFrequency::OneTime => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_cost_scales_by_frequency() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let project = Uuid::new_v4();
        let mut member =
            TeamMember::new("Ana", "Dev", 25.0, PaymentFrequency::Hourly, project, date);
        assert_eq!(member.monthly_cost(), 4000.0);
        member.frequency = PaymentFrequency::Monthly;
        assert_eq!(member.monthly_cost(), 25.0);
        member.frequency = PaymentFrequency::OneTime;
        assert_eq!(member.monthly_cost(), 0.0);
    }
}
