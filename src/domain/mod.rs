//! Persistence-friendly records shared by the services, analytics, and shell.

pub mod account;
pub mod achievement;
pub mod budget;
pub mod category;
pub mod data;
pub mod investment;
pub mod level;
pub mod liquidity;
pub mod project;
pub mod recurring;
pub mod team;
pub mod tracker;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use achievement::{Achievement, AchievementKind};
pub use budget::Budget;
pub use category::{Category, CategoryKind};
pub use data::{FinanceData, CURRENT_SCHEMA_VERSION};
pub use investment::{Investment, InvestmentKind};
pub use level::{LevelCalculator, LevelState};
pub use liquidity::{Payable, ProbabilityLevel, Receivable, UrgencyLevel};
pub use project::{Project, ProjectExpense, ProjectMilestone, ProjectStatus};
pub use recurring::{RecurrenceKind, RecurringTransaction};
pub use team::{PaymentFrequency, TeamMember};
pub use tracker::{DailyEntry, HabitCheck, TaskItem};
pub use transaction::{Transaction, TransactionKind};

/// Rounds to the given number of decimal places, half away from zero.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
