//! Level math: flat 250-XP bands, 1-indexed, unbounded.

use serde::{Deserialize, Serialize};

use crate::rules::XP_PER_LEVEL;

/// Level for a total-XP value. Level 1 starts at 0 XP; every band costs a
/// flat `XP_PER_LEVEL`.
pub fn level_for_xp(total_xp: u64) -> u32 {
    (total_xp / XP_PER_LEVEL) as u32 + 1
}

/// Progress through the current band, in `[0, 1)`.
pub fn level_progress(total_xp: u64) -> f64 {
    (total_xp % XP_PER_LEVEL) as f64 / XP_PER_LEVEL as f64
}

/// XP still needed to reach the next level. Never zero: at an exact band
/// boundary a full band remains.
pub fn xp_to_next_level(total_xp: u64) -> u64 {
    XP_PER_LEVEL - (total_xp % XP_PER_LEVEL)
}

/// Snapshot of the level derivations for one XP value, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub total_xp: u64,
    pub level: u32,
    pub progress: f64,
    pub xp_to_next: u64,
}

impl Progression {
    pub fn from_xp(total_xp: u64) -> Self {
        Self {
            total_xp,
            level: level_for_xp(total_xp),
            progress: level_progress(total_xp),
            xp_to_next: xp_to_next_level(total_xp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_xp_is_level_one() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(xp_to_next_level(0), 250);
        assert_eq!(level_progress(0), 0.0);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(level_for_xp(249), 1);
        assert_eq!(level_for_xp(250), 2);
        assert_eq!(level_for_xp(499), 2);
        assert_eq!(level_for_xp(500), 3);
    }

    #[test]
    fn progress_at_band_start_is_zero() {
        assert_eq!(level_progress(250), 0.0);
        assert_eq!(xp_to_next_level(250), 250);
    }

    #[test]
    fn progress_mid_band() {
        assert_eq!(level_progress(125), 0.5);
        assert_eq!(xp_to_next_level(125), 125);
    }

    #[test]
    fn snapshot_matches_the_free_functions() {
        let snapshot = Progression::from_xp(613);
        assert_eq!(snapshot.level, 3);
        assert_eq!(snapshot.xp_to_next, 137);
        assert!((snapshot.progress - 113.0 / 250.0).abs() < 1e-12);
    }

    #[test]
    fn levels_are_unbounded() {
        assert_eq!(level_for_xp(250_000), 1001);
    }
}
