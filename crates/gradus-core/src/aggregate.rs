//! XP aggregation.
//!
//! `recompute_xp` is the only writer of `total_xp`, `level` and the cached
//! `xp_earned` fields. It rebuilds everything bottom-up from checklist and
//! counter state alone and never reads a cached value, which is what makes
//! repeated passes idempotent and double-counting structurally impossible.

use crate::levels;
use crate::program::{Lecture, Program, Week};
use crate::rules::{
    XP_ACTIVITY_QUESTION, XP_ASSIGNMENT_QUESTION, XP_LECTURE_FINAL_NOTE, XP_LECTURE_MEMORY_NOTE,
    XP_LECTURE_REVISION, XP_LECTURE_WATCHED, XP_WEEKLY_FINAL_NOTE, XP_WEEKLY_MEMORY_NOTE,
    XP_WEEK_COMPLETION,
};

/// XP for one lecture, derived from its flags and counters.
fn lecture_xp(lecture: &Lecture) -> u64 {
    let mut xp = 0;
    if lecture.watched {
        xp += XP_LECTURE_WATCHED;
    }
    if lecture.memory_note {
        xp += XP_LECTURE_MEMORY_NOTE;
    }
    if lecture.final_note {
        xp += XP_LECTURE_FINAL_NOTE;
    }
    xp += XP_ACTIVITY_QUESTION * u64::from(lecture.activity_done_clamped());
    xp += XP_LECTURE_REVISION * u64::from(lecture.revision_count);
    xp
}

/// Recompute one week's subtotal, overwriting each lecture's cache on the
/// way through.
fn week_xp(week: &mut Week) -> u64 {
    let mut subtotal = 0;
    for lecture in &mut week.lectures {
        lecture.xp_earned = lecture_xp(lecture);
        subtotal += lecture.xp_earned;
    }
    subtotal += XP_ASSIGNMENT_QUESTION * u64::from(week.practice.done_clamped());
    subtotal += XP_ASSIGNMENT_QUESTION * u64::from(week.graded.done_clamped());
    if week.weekly_memory_note {
        subtotal += XP_WEEKLY_MEMORY_NOTE;
    }
    if week.weekly_final_note {
        subtotal += XP_WEEKLY_FINAL_NOTE;
    }
    // The completion bonus is re-gated on every pass. A completed week whose
    // core actions regressed stops earning it even before the flag is
    // cleared.
    if week.week_completed && week.core_complete() {
        subtotal += XP_WEEK_COMPLETION;
    }
    week.xp_earned = subtotal;
    subtotal
}

/// Rebuild every cached XP field bottom-up and return the new grand total.
/// The derived level is refreshed in the same pass.
pub fn recompute_xp(program: &mut Program) -> u64 {
    let mut total = 0;
    for week in &mut program.weeks {
        total += week_xp(week);
    }
    program.total_xp = total;
    program.level = levels::level_for_xp(total);
    total
}
