use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{LevelCalculator, LevelState};

/// Outcome of granting experience points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpAward {
    pub xp: u64,
    pub source: String,
    pub old_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
}

pub struct ProgressService;

impl ProgressService {
    pub fn award(
        state: &mut LevelState,
        xp: u64,
        source: &str,
        now: DateTime<Utc>,
    ) -> XpAward {
        let old_level = state.level;
        state.total_xp = state.total_xp.saturating_add(xp);
        Self::recalculate(state);
        let leveled_up = state.level > old_level;
        if leveled_up {
            state.last_level_up = Some(now);
            info!(old_level, new_level = state.level, "level up");
        }
        info!(xp, source, total = state.total_xp, "xp awarded");
        XpAward {
            xp,
            source: source.to_string(),
            old_level,
            new_level: state.level,
            leveled_up,
        }
    }

    /// Re-derives level and in-level progress from `total_xp`.
    pub fn recalculate(state: &mut LevelState) {
        state.level = LevelCalculator::calculate_level(state.total_xp);
        let (current, to_next) = LevelCalculator::level_progress(state.total_xp, state.level);
        state.current_level_xp = current;
        state.xp_to_next_level = to_next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_updates_every_field() {
        let mut state = LevelState::default();
        let now = Utc::now();

        let first = ProgressService::award(&mut state, 50, "task", now);
        assert!(!first.leveled_up);
        assert_eq!((state.level, state.current_level_xp, state.xp_to_next_level), (1, 50, 100));
        assert_eq!(state.last_level_up, None);

        let second = ProgressService::award(&mut state, 100, "milestone", now);
        assert!(second.leveled_up);
        assert_eq!((second.old_level, second.new_level), (1, 2));
        assert_eq!((state.total_xp, state.current_level_xp, state.xp_to_next_level), (150, 50, 282));
        assert_eq!(state.last_level_up, Some(now));
    }

    #[test]
    fn zero_award_is_a_no_op() {
        let mut state = LevelState::default();
        let award = ProgressService::award(&mut state, 0, "nothing", Utc::now());
        assert_eq!(award.new_level, 1);
        assert_eq!(state, LevelState::default());
    }
}
