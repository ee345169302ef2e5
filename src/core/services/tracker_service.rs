//! Daily journal: notes, mood, prioritized tasks, and recurring habits.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{require_range, require_text, ProgressService, ServiceError, ServiceResult, XpAward};
use crate::domain::{DailyEntry, FinanceData, HabitCheck, LevelCalculator, TaskItem};

/// Result of flipping a task or habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub completed: bool,
    pub award: Option<XpAward>,
}

pub struct TrackerService;

impl TrackerService {
    /// Returns the entry for `date`, creating an empty one when missing.
    pub fn entry_for(data: &mut FinanceData, date: NaiveDate) -> &mut DailyEntry {
        let index = match data.daily_entries.iter().position(|entry| entry.date == date) {
            Some(index) => index,
            None => {
                data.daily_entries.push(DailyEntry::new(date));
                data.daily_entries.len() - 1
            }
        };
        &mut data.daily_entries[index]
    }

    pub fn find(data: &FinanceData, date: NaiveDate) -> Option<&DailyEntry> {
        data.daily_entries.iter().find(|entry| entry.date == date)
    }

    fn existing_entry(data: &mut FinanceData, date: NaiveDate) -> ServiceResult<&mut DailyEntry> {
        data.daily_entries
            .iter_mut()
            .find(|entry| entry.date == date)
            .ok_or_else(|| ServiceError::NotFound(format!("Daily entry for {date}")))
    }

    pub fn set_notes(data: &mut FinanceData, date: NaiveDate, notes: &str) -> ServiceResult<()> {
        Self::entry_for(data, date).notes = notes.trim().to_string();
        data.touch();
        Ok(())
    }

    pub fn set_mood(data: &mut FinanceData, date: NaiveDate, mood: u8) -> ServiceResult<()> {
        require_range(mood, 1, 10, "Mood")?;
        Self::entry_for(data, date).mood = mood;
        data.touch();
        Ok(())
    }

    pub fn add_task(
        data: &mut FinanceData,
        date: NaiveDate,
        description: &str,
        priority: u8,
    ) -> ServiceResult<TaskItem> {
        require_text(description, "Task description")?;
        require_range(priority, 1, 5, "Priority")?;
        let task = TaskItem::new(
            description.trim(),
            priority,
            LevelCalculator::xp_for_task(priority),
        );
        Self::entry_for(data, date).tasks.push(task.clone());
        data.touch();
        Ok(task)
    }

    /// Flips completion. XP is paid the first time a task is completed only.
    pub fn toggle_task(
        data: &mut FinanceData,
        date: NaiveDate,
        task_id: Uuid,
        now: DateTime<Utc>,
    ) -> ServiceResult<Toggle> {
        let entry = Self::existing_entry(data, date)?;
        let task = entry
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| ServiceError::NotFound("Task".into()))?;
        task.is_completed = !task.is_completed;
        let completed = task.is_completed;
        let payout = if completed && !task.xp_claimed {
            task.xp_claimed = true;
            Some((task.xp, format!("Task: {}", task.description)))
        } else {
            None
        };
        let award =
            payout.map(|(xp, source)| ProgressService::award(&mut data.level, xp, &source, now));
        data.touch();
        Ok(Toggle { completed, award })
    }

    /// Registers the habit globally and on the given day, ignoring duplicates.
    pub fn add_habit(data: &mut FinanceData, date: NaiveDate, name: &str) -> ServiceResult<()> {
        require_text(name, "Habit name")?;
        let name = name.trim();
        if !data.habits.iter().any(|habit| habit.eq_ignore_ascii_case(name)) {
            data.habits.push(name.to_string());
        }
        let entry = Self::entry_for(data, date);
        if entry.habit_mut(name).is_none() {
            entry.habits.push(HabitCheck::new(name));
        }
        data.touch();
        Ok(())
    }

    /// Flips a habit for the day. XP is paid once per habit per day.
    pub fn toggle_habit(
        data: &mut FinanceData,
        date: NaiveDate,
        name: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Toggle> {
        let entry = Self::existing_entry(data, date)?;
        let habit = entry
            .habit_mut(name)
            .ok_or_else(|| ServiceError::NotFound(format!("Habit `{}`", name.trim())))?;
        habit.is_completed = !habit.is_completed;
        let completed = habit.is_completed;
        let payout = if completed && !habit.xp_claimed {
            habit.xp_claimed = true;
            Some(format!("Habit: {}", habit.name))
        } else {
            None
        };
        let award = payout.map(|source| {
            ProgressService::award(&mut data.level, LevelCalculator::xp_for_habit(), &source, now)
        });
        data.touch();
        Ok(Toggle { completed, award })
    }

    /// Copies every registered habit onto the day that does not have it yet.
    pub fn sync_habits(data: &mut FinanceData, date: NaiveDate) {
        if data.habits.is_empty() {
            return;
        }
        let habits = data.habits.clone();
        let entry = Self::entry_for(data, date);
        for habit in habits {
            if entry.habit_mut(&habit).is_none() {
                entry.habits.push(HabitCheck::new(habit));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
    }

    #[test]
    fn entry_is_created_once() {
        let mut data = FinanceData::seeded();
        TrackerService::set_notes(&mut data, today(), "  good day ").expect("notes");
        TrackerService::set_mood(&mut data, today(), 8).expect("mood");
        assert_eq!(data.daily_entries.len(), 1);
        assert_eq!(data.daily_entries[0].notes, "good day");
        assert!(TrackerService::set_mood(&mut data, today(), 11).is_err());
    }

    #[test]
    fn task_xp_is_paid_once() {
        let mut data = FinanceData::seeded();
        let task = TrackerService::add_task(&mut data, today(), "Write report", 3).expect("task");
        assert_eq!(task.xp, 70);
        assert!(TrackerService::add_task(&mut data, today(), "Nope", 0).is_err());

        let now = Utc::now();
        let first = TrackerService::toggle_task(&mut data, today(), task.id, now).expect("toggle");
        assert!(first.completed);
        assert_eq!(first.award.map(|a| a.xp), Some(70));

        let undo = TrackerService::toggle_task(&mut data, today(), task.id, now).expect("toggle");
        assert!(!undo.completed && undo.award.is_none());
        let redo = TrackerService::toggle_task(&mut data, today(), task.id, now).expect("toggle");
        assert!(redo.completed && redo.award.is_none());
        assert_eq!(data.level.total_xp, 70);
    }

    #[test]
    fn habits_register_without_duplicates_and_pay_once_per_day() {
        let mut data = FinanceData::seeded();
        TrackerService::add_habit(&mut data, today(), "Read").expect("habit");
        TrackerService::add_habit(&mut data, today(), "read").expect("habit");
        assert_eq!(data.habits, vec!["Read".to_string()]);
        assert_eq!(data.daily_entries[0].habits.len(), 1);

        let now = Utc::now();
        for _ in 0..3 {
            TrackerService::toggle_habit(&mut data, today(), "READ", now).expect("toggle");
        }
        assert_eq!(data.level.total_xp, 15);

        let tomorrow = today().succ_opt().unwrap();
        TrackerService::sync_habits(&mut data, tomorrow);
        let toggle = TrackerService::toggle_habit(&mut data, tomorrow, "Read", now).expect("toggle");
        assert_eq!(toggle.award.map(|a| a.xp), Some(15));
        assert!(TrackerService::toggle_habit(&mut data, tomorrow, "Run", now).is_err());
    }

    #[test]
    fn failed_toggles_leave_the_journal_untouched() {
        let mut data = FinanceData::seeded();
        let now = Utc::now();
        let task = TrackerService::toggle_task(&mut data, today(), Uuid::new_v4(), now);
        assert!(matches!(task, Err(ServiceError::NotFound(_))));
        let habit = TrackerService::toggle_habit(&mut data, today(), "Stretch", now);
        assert!(matches!(habit, Err(ServiceError::NotFound(_))));
        TrackerService::sync_habits(&mut data, today());
        assert!(data.daily_entries.is_empty());

        TrackerService::set_notes(&mut data, today(), "quiet").expect("notes");
        assert!(TrackerService::toggle_task(&mut data, today(), Uuid::new_v4(), now).is_err());
        assert_eq!(data.daily_entries.len(), 1);
        assert!(data.daily_entries[0].tasks.is_empty());
        assert_eq!(data.level.total_xp, 0);
    }
}
