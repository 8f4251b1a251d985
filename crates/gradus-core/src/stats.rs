//! Lifetime statistics.
//!
//! Read-only derivations for the stats panel. Everything here is rebuilt on
//! demand from the program; nothing is cached or persisted.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::program::{Program, Week};

/// Lifetime counters across the whole program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub total_weeks: u32,
    pub weeks_completed: u32,
    pub total_lectures: u32,
    /// Lectures whose three core actions are all done.
    pub completed_lectures: u32,
    pub total_revisions: u32,
    pub activity_done: u32,
    pub activity_total: u32,
    pub practice_done: u32,
    pub practice_total: u32,
    pub graded_done: u32,
    pub graded_total: u32,
    /// XP earned in the current calendar month.
    pub month_xp: u64,
    /// Days with a positive XP history entry.
    pub active_days: u32,
}

/// Walk the program once and derive the lifetime counters. `today` anchors
/// the current-calendar-month window for `month_xp`.
pub fn collect(program: &Program, today: NaiveDate) -> LifetimeStats {
    let mut stats = LifetimeStats::default();
    for week in &program.weeks {
        stats.total_weeks += 1;
        if week.week_completed {
            stats.weeks_completed += 1;
        }
        for lecture in &week.lectures {
            stats.total_lectures += 1;
            if lecture.core_complete() {
                stats.completed_lectures += 1;
            }
            stats.total_revisions += lecture.revision_count;
            stats.activity_done += lecture.activity_done_clamped();
            stats.activity_total += lecture.activity_total;
        }
        stats.practice_done += week.practice.done_clamped();
        stats.practice_total += week.practice.total_questions;
        stats.graded_done += week.graded.done_clamped();
        stats.graded_total += week.graded.total_questions;
    }
    for (day, xp) in &program.xp_history {
        if *xp > 0 {
            stats.active_days += 1;
        }
        if day.year() == today.year() && day.month() == today.month() {
            stats.month_xp += xp;
        }
    }
    stats
}

/// Completion ratio for one week, in `[0, 1]`.
///
/// Unit weighting: three core ticks per lecture, one unit per activity or
/// assignment question, two units for the weekly note pair. The note pair
/// keeps the denominator positive even for a freshly added week.
pub fn week_progress(week: &Week) -> f64 {
    let mut done: u32 = 0;
    let mut total: u32 = 0;
    for lecture in &week.lectures {
        total += 3;
        done += u32::from(lecture.watched)
            + u32::from(lecture.memory_note)
            + u32::from(lecture.final_note);
        total += lecture.activity_total;
        done += lecture.activity_done_clamped();
    }
    total += week.practice.total_questions + week.graded.total_questions;
    done += week.practice.done_clamped() + week.graded.done_clamped();
    total += 2;
    done += u32::from(week.weekly_memory_note) + u32::from(week.weekly_final_note);
    f64::from(done) / f64::from(total)
}
