//! Achievement badges for the progression system.
//!
//! Badges are derived on demand from program and lifetime-stats state; the
//! engine never persists them. ASCII badge symbols only.

use serde::Serialize;

use crate::program::Program;
use crate::rules::MAX_STREAK_FREEZES;
use crate::stats::LifetimeStats;

/// Achievement badge with ASCII symbol and description
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Badge {
    /// Unique identifier
    pub id: &'static str,
    /// ASCII badge symbol (e.g., "[1]", "<7d>", "{w1}")
    pub symbol: &'static str,
    /// Short name
    pub name: &'static str,
    /// Description of how to earn it
    pub description: &'static str,
    /// Whether it's been unlocked
    pub unlocked: bool,
}

impl Badge {
    const fn new(
        id: &'static str,
        symbol: &'static str,
        name: &'static str,
        desc: &'static str,
    ) -> Self {
        Self {
            id,
            symbol,
            name,
            description: desc,
            unlocked: false,
        }
    }

    #[cfg(test)]
    fn unlock(mut self) -> Self {
        self.unlocked = true;
        self
    }
}

/// All available badges
pub fn all_badges() -> Vec<Badge> {
    vec![
        // XP milestones
        Badge::new("first_xp", "[1]", "First Steps", "Earn your first XP"),
        Badge::new("xp_500", "[500]", "Getting Serious", "Earn 500 XP"),
        Badge::new("xp_2500", "[2.5k]", "Dean's List", "Earn 2,500 XP"),
        // Levels
        Badge::new("level_5", "(L5)", "Level Five", "Reach level 5"),
        Badge::new("level_10", "(L10)", "Double Digits", "Reach level 10"),
        // Streaks
        Badge::new("streak_3", "<3d>", "Warming Up", "Hold a 3-day streak"),
        Badge::new("streak_7", "<7d>", "Week Warrior", "Hold a 7-day streak"),
        Badge::new("streak_30", "<30d>", "Iron Habit", "Hold a 30-day streak"),
        Badge::new("freezer_full", "<*>", "Fully Stocked", "Bank a full pool of streak freezes"),
        // Course progress
        Badge::new("first_week", "{w1}", "Week One Down", "Complete your first week"),
        Badge::new("five_weeks", "{w5}", "Halfway There", "Complete 5 weeks"),
        Badge::new("lectures_10", "{10}", "Lecture Devourer", "Finish the core of 10 lectures"),
        // Habits
        Badge::new("revisions_25", "[rx]", "Revision Machine", "Log 25 revision passes"),
        Badge::new("days_30", "|30|", "Regular", "Study on 30 different days"),
    ]
}

/// Check which badges are unlocked for the given program state
pub fn check_badges(program: &Program, stats: &LifetimeStats) -> Vec<Badge> {
    let mut badges = all_badges();
    for badge in &mut badges {
        badge.unlocked = is_unlocked(badge.id, program, stats);
    }
    badges
}

/// Get only unlocked badges
pub fn unlocked_badges(program: &Program, stats: &LifetimeStats) -> Vec<Badge> {
    check_badges(program, stats)
        .into_iter()
        .filter(|b| b.unlocked)
        .collect()
}

/// Badges unlocked in `after` but not in `before` (for notifications)
pub fn newly_unlocked(before: &[Badge], after: &[Badge]) -> Vec<Badge> {
    let already: Vec<_> = before.iter().filter(|b| b.unlocked).map(|b| b.id).collect();
    after
        .iter()
        .filter(|b| b.unlocked && !already.contains(&b.id))
        .cloned()
        .collect()
}

/// Check if a specific badge is unlocked
fn is_unlocked(id: &str, program: &Program, stats: &LifetimeStats) -> bool {
    match id {
        // XP milestones
        "first_xp" => program.total_xp >= 1,
        "xp_500" => program.total_xp >= 500,
        "xp_2500" => program.total_xp >= 2500,

        // Levels
        "level_5" => program.level >= 5,
        "level_10" => program.level >= 10,

        // Streaks
        "streak_3" => program.best_streak >= 3,
        "streak_7" => program.best_streak >= 7,
        "streak_30" => program.best_streak >= 30,
        "freezer_full" => program.streak_freezes >= MAX_STREAK_FREEZES,

        // Course progress
        "first_week" => stats.weeks_completed >= 1,
        "five_weeks" => stats.weeks_completed >= 5,
        "lectures_10" => stats.completed_lectures >= 10,

        // Habits
        "revisions_25" => stats.total_revisions >= 25,
        "days_30" => stats.active_days >= 30,

        _ => false,
    }
}

/// Format badges for display (ASCII style)
pub fn format_badges(badges: &[Badge], max_display: usize) -> String {
    let unlocked: Vec<_> = badges.iter().filter(|b| b.unlocked).collect();
    if unlocked.is_empty() {
        return String::new();
    }

    let display: Vec<_> = unlocked.iter().take(max_display).collect();
    let symbols: String = display.iter().map(|b| b.symbol).collect::<Vec<_>>().join(" ");

    if unlocked.len() > max_display {
        format!("{} +{} more", symbols, unlocked.len() - max_display)
    } else {
        symbols
    }
}

/// Format a single badge for an unlock notification (ASCII style)
pub fn format_badge_unlock(badge: &Badge) -> String {
    format!("{} Badge unlocked: {} - {}", badge.symbol, badge.name, badge.description)
}
