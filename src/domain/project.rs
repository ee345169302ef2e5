use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::round_to;
use crate::currency::DEFAULT_CURRENCY;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ProjectStatus {
    #[default]
    Planned,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planned,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProjectStatus::Planned => "Planned",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "planned" | "planning" => Ok(ProjectStatus::Planned),
            "inprogress" | "active" => Ok(ProjectStatus::InProgress),
            "onhold" | "paused" => Ok(ProjectStatus::OnHold),
            "completed" | "done" => Ok(ProjectStatus::Completed),
            "cancelled" | "canceled" => Ok(ProjectStatus::Cancelled),
            _ => Err(format!("unknown project status `{}`", value.trim())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMilestone {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub payment_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub xp: u64,
}

impl ProjectMilestone {
    pub fn new(name: impl Into<String>, payment_amount: f64, due_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            payment_amount,
            due_date,
            is_completed: false,
            completed_date: None,
            xp: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectExpense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub notes: String,
}

impl ProjectExpense {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            date,
            category: category.into(),
            notes: String::new(),
        }
    }
}

/// A client engagement. Revenue is what has actually been received; cost is the
/// sum of recorded project expenses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub received_amount: f64,
    #[serde(default)]
    pub expected_income: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub milestones: Vec<ProjectMilestone>,
    #[serde(default)]
    pub expenses: Vec<ProjectExpense>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_priority() -> u8 {
    3
}

impl Project {
    pub fn new(name: impl Into<String>, budget: f64, start_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            client: String::new(),
            status: ProjectStatus::Planned,
            budget,
            received_amount: 0.0,
            expected_income: budget,
            currency: default_currency(),
            priority: default_priority(),
            start_date,
            end_date: None,
            deadline: None,
            milestones: Vec::new(),
            expenses: Vec::new(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }

    pub fn revenue(&self) -> f64 {
        self.received_amount
    }

    pub fn profit(&self) -> f64 {
        self.received_amount - self.total_expenses()
    }

    pub fn profit_margin(&self) -> f64 {
        if self.received_amount <= 0.0 {
            return 0.0;
        }
        round_to(self.profit() / self.received_amount * 100.0, 1)
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.budget <= 0.0 {
            return 0.0;
        }
        self.received_amount / self.budget * 100.0
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, ProjectStatus::Planned | ProjectStatus::InProgress)
    }

    /// Negative when the deadline has passed.
    pub fn days_until_deadline(&self, today: NaiveDate) -> Option<i64> {
        self.deadline.map(|deadline| (deadline - today).num_days())
    }

    pub fn milestone(&self, name: &str) -> Option<&ProjectMilestone> {
        let needle = name.trim().to_lowercase();
        self.milestones
            .iter()
            .find(|milestone| milestone.name.to_lowercase() == needle)
    }
}
