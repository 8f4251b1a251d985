//! XP rule table.
//!
//! Every point value the engine can award lives here. The aggregator in
//! `aggregate` decides how each value stacks (once per flag, per unit with a
//! cap, or per unit unbounded); this module only says how much a unit is
//! worth. Tuning the economy means editing these constants and nothing else.

/// Marking a lecture as watched.
pub const XP_LECTURE_WATCHED: u64 = 5;

/// Writing the memory (during-lecture) note for a lecture.
pub const XP_LECTURE_MEMORY_NOTE: u64 = 7;

/// Writing the final (after-lecture) note for a lecture.
pub const XP_LECTURE_FINAL_NOTE: u64 = 5;

/// One activity question done, capped at the lecture's declared total.
pub const XP_ACTIVITY_QUESTION: u64 = 1;

/// One full revision pass over a lecture. Uncapped.
pub const XP_LECTURE_REVISION: u64 = 10;

/// One assignment question done (practice or graded), capped at the
/// assignment's declared total.
pub const XP_ASSIGNMENT_QUESTION: u64 = 2;

/// The weekly memory note.
pub const XP_WEEKLY_MEMORY_NOTE: u64 = 10;

/// The weekly final note.
pub const XP_WEEKLY_FINAL_NOTE: u64 = 10;

/// Week completion bonus. Only counts while the week's completion gate
/// (every lecture watched + both notes) still holds.
pub const XP_WEEK_COMPLETION: u64 = 15;

/// Flat XP cost of every level band.
pub const XP_PER_LEVEL: u64 = 250;

/// Ceiling on banked streak freezes.
pub const MAX_STREAK_FREEZES: u32 = 3;

/// Days of per-day XP history kept on disk.
pub const HISTORY_RETENTION_DAYS: u64 = 365;
