//! Daily streak and freeze state machine.
//!
//! Exactly one transition runs per application session, at startup. All gap
//! arithmetic happens on calendar dates, never timestamps, so the time of
//! day a session starts can never change the outcome.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::program::Program;
use crate::rules::MAX_STREAK_FREEZES;

/// The streak-relevant slice of program state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub streak: u32,
    pub best_streak: u32,
    pub freezes: u32,
    pub last_active: Option<NaiveDate>,
}

impl StreakState {
    pub fn of(program: &Program) -> Self {
        Self {
            streak: program.streak,
            best_streak: program.best_streak,
            freezes: program.streak_freezes,
            last_active: program.last_active_date,
        }
    }

    /// Write this slice back onto the program.
    pub fn store(self, program: &mut Program) {
        program.streak = self.streak;
        program.best_streak = self.best_streak;
        program.streak_freezes = self.freezes;
        program.last_active_date = self.last_active;
    }
}

/// Result of one session-start transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakOutcome {
    pub state: StreakState,
    /// A banked freeze was consumed to bridge a one-day gap.
    pub freeze_used: bool,
}

/// Advance the streak machine to `today`.
///
/// Exactly one arm fires, checked in order: first-ever activation, same-day
/// re-entry, perfect consecutive day, one-day gap bridged by a freeze, or
/// reset. `last_active` becomes `today` on every exit.
pub fn advance(state: StreakState, today: NaiveDate) -> StreakOutcome {
    let Some(last) = state.last_active else {
        return StreakOutcome {
            state: StreakState {
                streak: 1,
                best_streak: state.best_streak.max(1),
                freezes: state.freezes,
                last_active: Some(today),
            },
            freeze_used: false,
        };
    };

    let gap = (today - last).num_days();
    let mut next = state;
    next.last_active = Some(today);
    let mut freeze_used = false;

    if gap == 0 {
        // Same-day re-entry: nothing to count.
    } else if gap == 1 {
        next.streak += 1;
        next.best_streak = next.best_streak.max(next.streak);
    } else if gap == 2 && state.freezes > 0 {
        // Exactly one missed day and a freeze in the pool: the freeze
        // bridges it and the streak continues as if unbroken.
        next.streak += 1;
        next.best_streak = next.best_streak.max(next.streak);
        next.freezes -= 1;
        freeze_used = true;
    } else {
        // Two or more missed days, or a clock that went backwards. Freezes
        // never bridge more than a single day, regardless of pool size.
        next.streak = 1;
        next.best_streak = next.best_streak.max(1);
    }

    StreakOutcome { state: next, freeze_used }
}

/// Bank one earned freeze, capped at the pool limit.
pub fn earn_freeze(freezes: u32) -> u32 {
    (freezes + 1).min(MAX_STREAK_FREEZES)
}
