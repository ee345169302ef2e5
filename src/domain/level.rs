use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard ceiling for the level search.
pub const MAX_LEVEL: u32 = 1000;

const BASE_XP: f64 = 100.0;
const CURVE_EXPONENT: f64 = 1.5;
const HABIT_XP: u64 = 15;
const PAYMENT_XP_CAP: u64 = 500;

/// Persisted progression for the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelState {
    pub level: u32,
    pub total_xp: u64,
    pub current_level_xp: u64,
    pub xp_to_next_level: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_level_up: Option<DateTime<Utc>>,
}

impl Default for LevelState {
    fn default() -> Self {
        Self {
            level: 1,
            total_xp: 0,
            current_level_xp: 0,
            xp_to_next_level: LevelCalculator::xp_for_level(1),
            last_level_up: None,
        }
    }
}

impl LevelState {
    pub fn progress_percent(&self) -> f64 {
        if self.xp_to_next_level == 0 {
            return 0.0;
        }
        (self.current_level_xp as f64 / self.xp_to_next_level as f64 * 100.0).min(100.0)
    }
}

/// The XP curve: level `n` costs `floor(100 * n^1.5)` XP to clear.
pub struct LevelCalculator;

impl LevelCalculator {
    pub fn xp_for_level(level: u32) -> u64 {
        (BASE_XP * f64::from(level).powf(CURVE_EXPONENT)).floor() as u64
    }

    pub fn calculate_level(total_xp: u64) -> u32 {
        let mut level: u32 = 1;
        let mut needed: u64 = 0;
        while needed <= total_xp {
            level += 1;
            needed += Self::xp_for_level(level - 1);
            if level > MAX_LEVEL {
                break;
            }
        }
        level.saturating_sub(1).max(1)
    }

    /// Returns `(xp earned inside the level, xp the level costs)`.
    pub fn level_progress(total_xp: u64, level: u32) -> (u64, u64) {
        let spent: u64 = (1..level).map(Self::xp_for_level).sum();
        (total_xp.saturating_sub(spent), Self::xp_for_level(level))
    }

    pub fn xp_for_task(priority: u8) -> u64 {
        u64::from(priority) * 20 + 10
    }

    pub fn xp_for_habit() -> u64 {
        HABIT_XP
    }

    pub fn xp_for_milestone(priority: u8) -> u64 {
        50 + u64::from(priority) * 10
    }

    pub fn xp_for_payment(amount: f64) -> u64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0;
        }
        ((amount / 100.0).floor() as u64).min(PAYMENT_XP_CAP)
    }
}
