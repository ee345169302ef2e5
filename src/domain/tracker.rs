use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MOOD: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitCheck {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_completed: bool,
    /// Set once the completion XP for this entry has been paid out.
    #[serde(default)]
    pub xp_claimed: bool,
}

impl HabitCheck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_completed: false,
            xp_claimed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskItem {
    pub id: Uuid,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    pub priority: u8,
    pub xp: u64,
    #[serde(default)]
    pub xp_claimed: bool,
}

impl TaskItem {
    pub fn new(description: impl Into<String>, priority: u8, xp: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            is_completed: false,
            priority,
            xp,
            xp_claimed: false,
        }
    }
}

/// Journal page for a single calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_mood")]
    pub mood: u8,
    #[serde(default)]
    pub habits: Vec<HabitCheck>,
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
}

fn default_mood() -> u8 {
    DEFAULT_MOOD
}

impl DailyEntry {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            notes: String::new(),
            mood: DEFAULT_MOOD,
            habits: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn habit_mut(&mut self, name: &str) -> Option<&mut HabitCheck> {
        self.habits
            .iter_mut()
            .find(|habit| habit.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn has_completed_habit(&self) -> bool {
        self.habits.iter().any(|habit| habit.is_completed)
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_completed).count()
    }
}
