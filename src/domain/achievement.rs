use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AchievementKind {
    Level,
    TasksCompleted,
    HabitsStreak,
    TransactionsCount,
    BudgetSaved,
    DaysActive,
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AchievementKind::Level => "Level",
            AchievementKind::TasksCompleted => "Tasks",
            AchievementKind::HabitsStreak => "Habit streak",
            AchievementKind::TransactionsCount => "Transactions",
            AchievementKind::BudgetSaved => "Budget saved",
            AchievementKind::DaysActive => "Days active",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub kind: AchievementKind,
    pub target: f64,
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_date: Option<DateTime<Utc>>,
}

impl Achievement {
    fn template(
        id: &str,
        title: &str,
        description: &str,
        icon: &str,
        kind: AchievementKind,
        target: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            kind,
            target,
            current: 0.0,
            is_unlocked: false,
            unlocked_date: None,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.target <= 0.0 {
            return 100.0;
        }
        (self.current / self.target * 100.0).clamp(0.0, 100.0)
    }

    pub fn defaults() -> Vec<Achievement> {
        use AchievementKind::*;
        vec![
            Self::template("level_5", "Rising Star", "Reach level 5", "⭐", Level, 5.0),
            Self::template("level_10", "Veteran", "Reach level 10", "🌟", Level, 10.0),
            Self::template("level_20", "Legend", "Reach level 20", "🏆", Level, 20.0),
            Self::template("tasks_10", "Getting Things Done", "Complete 10 tasks", "✅", TasksCompleted, 10.0),
            Self::template("tasks_50", "Productivity Machine", "Complete 50 tasks", "⚡", TasksCompleted, 50.0),
            Self::template("habit_streak_7", "Habit Builder", "Keep a habit streak for 7 days", "🔥", HabitsStreak, 7.0),
            Self::template("transactions_20", "Bookkeeper", "Record 20 transactions", "📒", TransactionsCount, 20.0),
            Self::template("budget_saved_10000", "Saver", "Stay 10000 under budget", "💎", BudgetSaved, 10_000.0),
            Self::template("days_active_30", "Dedicated", "Log 30 different days", "📅", DaysActive, 30.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_has_unique_ids() {
        let defaults = Achievement::defaults();
        let mut ids: Vec<_> = defaults.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), defaults.len());
        assert!(defaults.iter().all(|a| !a.is_unlocked));
    }
}
