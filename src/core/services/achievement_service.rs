use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use super::BudgetService;
use crate::domain::{AchievementKind, FinanceData};

pub struct AchievementService;

impl AchievementService {
    /// Refreshes progress on every locked achievement and unlocks those that reached
    /// their target. Returns the titles unlocked by this call.
    pub fn evaluate(data: &mut FinanceData, now: DateTime<Utc>) -> Vec<String> {
        let metrics = Metrics::collect(data);
        let mut unlocked = Vec::new();
        for achievement in data.achievements.iter_mut().filter(|a| !a.is_unlocked) {
            achievement.current = metrics.value(achievement.kind);
            if achievement.current >= achievement.target {
                achievement.is_unlocked = true;
                achievement.unlocked_date = Some(now);
                info!(title = %achievement.title, "achievement unlocked");
                unlocked.push(achievement.title.clone());
            }
        }
        if !unlocked.is_empty() {
            data.touch();
        }
        unlocked
    }

    /// Longest run of consecutive days on which the same habit was completed.
    pub fn longest_habit_streak(data: &FinanceData) -> u32 {
        let mut days_by_habit: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();
        for entry in &data.daily_entries {
            for habit in entry.habits.iter().filter(|habit| habit.is_completed) {
                days_by_habit
                    .entry(habit.name.to_lowercase())
                    .or_default()
                    .insert(entry.date);
            }
        }
        days_by_habit
            .values()
            .map(|days| {
                let mut best = 0;
                let mut run = 0;
                let mut previous: Option<NaiveDate> = None;
                for day in days {
                    run = match previous {
                        Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
                        _ => 1,
                    };
                    best = best.max(run);
                    previous = Some(*day);
                }
                best
            })
            .max()
            .unwrap_or(0)
    }
}

struct Metrics {
    level: f64,
    tasks_completed: f64,
    habit_streak: f64,
    transactions: f64,
    budget_saved: f64,
    days_active: f64,
}

impl Metrics {
    fn collect(data: &FinanceData) -> Self {
        let days: BTreeSet<NaiveDate> = data.daily_entries.iter().map(|entry| entry.date).collect();
        let budget_saved = BudgetService::progress(data)
            .iter()
            .map(|progress| progress.remaining.max(0.0))
            .sum();
        Self {
            level: f64::from(data.level.level),
            tasks_completed: data
                .daily_entries
                .iter()
                .map(|entry| entry.completed_tasks())
                .sum::<usize>() as f64,
            habit_streak: f64::from(AchievementService::longest_habit_streak(data)),
            transactions: data.transactions.len() as f64,
            budget_saved,
            days_active: days.len() as f64,
        }
    }

    fn value(&self, kind: AchievementKind) -> f64 {
        match kind {
            AchievementKind::Level => self.level,
            AchievementKind::TasksCompleted => self.tasks_completed,
            AchievementKind::HabitsStreak => self.habit_streak,
            AchievementKind::TransactionsCount => self.transactions,
            AchievementKind::BudgetSaved => self.budget_saved,
            AchievementKind::DaysActive => self.days_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::TrackerService;
    use crate::domain::Transaction;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    #[test]
    fn unlocks_transaction_milestone_once() {
        let mut data = FinanceData::seeded();
        for i in 0..20 {
            data.transactions
                .push(Transaction::expense(format!("t{i}"), 1.0, "Food", day(1)));
        }
        let now = Utc::now();
        let unlocked = AchievementService::evaluate(&mut data, now);
        assert_eq!(unlocked, vec!["Bookkeeper".to_string()]);
        assert!(AchievementService::evaluate(&mut data, now).is_empty());
        let bookkeeper = data
            .achievements
            .iter()
            .find(|a| a.id == "transactions_20")
            .expect("present");
        assert_eq!(bookkeeper.unlocked_date, Some(now));
    }

    #[test]
    fn habit_streak_counts_consecutive_days_per_habit() {
        let mut data = FinanceData::seeded();
        let now = Utc::now();
        for d in [1, 2, 3, 5, 6] {
            TrackerService::add_habit(&mut data, day(d), "Run").expect("habit");
            TrackerService::toggle_habit(&mut data, day(d), "Run", now).expect("toggle");
        }
        TrackerService::add_habit(&mut data, day(4), "Read").expect("habit");
        TrackerService::toggle_habit(&mut data, day(4), "Read", now).expect("toggle");
        assert_eq!(AchievementService::longest_habit_streak(&data), 3);

        AchievementService::evaluate(&mut data, now);
        let streak = data
            .achievements
            .iter()
            .find(|a| a.kind == AchievementKind::HabitsStreak)
            .expect("present");
        assert_eq!(streak.current, 3.0);
        assert!(!streak.is_unlocked);
    }
}
