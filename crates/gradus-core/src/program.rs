//! Program data model.
//!
//! `Program` is the root aggregate the engine persists: an ordered list of
//! study weeks, each owning lectures and two assignment trackers, plus the
//! streak and XP bookkeeping that hangs off the root.
//!
//! The `xp_earned` fields on weeks and lectures are cached projections. The
//! aggregator overwrites them on every pass and never reads them back, so
//! they exist purely so renderers do not have to re-derive subtotals.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::rules::HISTORY_RETENTION_DAYS;

/// Current persisted-document schema version.
///
/// History:
/// - v1: initial layout
/// - v2: per-lecture `revision_count`
/// - v3: per-lecture free-text `notes`
/// - v4: `best_streak` and `streak_freezes` on the root
pub const SCHEMA_VERSION: u32 = 4;

// ===== ASSIGNMENTS =====

/// Which of a week's two assignment trackers an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    Practice,
    Graded,
}

/// Question-counter pair backing a practice or graded assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub total_questions: u32,
    pub done_questions: u32,
}

impl Assignment {
    /// Done count with the `0 <= done <= total` invariant applied.
    pub fn done_clamped(&self) -> u32 {
        self.done_questions.min(self.total_questions)
    }
}

// ===== LECTURES =====

/// One lecture: three core checkmarks, an activity counter, a revision
/// counter and free-text notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: Uuid,
    pub title: String,
    pub watched: bool,
    pub memory_note: bool,
    pub final_note: bool,
    pub activity_total: u32,
    pub activity_done: u32,
    #[serde(default)]
    pub revision_count: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub xp_earned: u64,
}

impl Lecture {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            watched: false,
            memory_note: false,
            final_note: false,
            activity_total: 0,
            activity_done: 0,
            revision_count: 0,
            notes: String::new(),
            xp_earned: 0,
        }
    }

    /// Core predicate: watched, memory note and final note all done.
    pub fn core_complete(&self) -> bool {
        self.watched && self.memory_note && self.final_note
    }

    /// Activity count with the `0 <= done <= total` invariant applied.
    pub fn activity_done_clamped(&self) -> u32 {
        self.activity_done.min(self.activity_total)
    }
}

// ===== WEEKS =====

/// One study week: lectures, two assignments, the weekly note pair and the
/// completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub id: Uuid,
    pub title: String,
    pub lectures: Vec<Lecture>,
    #[serde(default)]
    pub practice: Assignment,
    #[serde(default)]
    pub graded: Assignment,
    #[serde(default)]
    pub weekly_memory_note: bool,
    #[serde(default)]
    pub weekly_final_note: bool,
    #[serde(default)]
    pub week_completed: bool,
    #[serde(default)]
    pub xp_earned: u64,
}

impl Week {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            lectures: Vec::new(),
            practice: Assignment::default(),
            graded: Assignment::default(),
            weekly_memory_note: false,
            weekly_final_note: false,
            week_completed: false,
            xp_earned: 0,
        }
    }

    /// Completion gate: every lecture passes the core predicate. A week
    /// with no lectures never qualifies.
    pub fn core_complete(&self) -> bool {
        !self.lectures.is_empty() && self.lectures.iter().all(Lecture::core_complete)
    }

    pub fn lecture(&self, id: Uuid) -> Option<&Lecture> {
        self.lectures.iter().find(|l| l.id == id)
    }

    pub fn lecture_mut(&mut self, id: Uuid) -> Option<&mut Lecture> {
        self.lectures.iter_mut().find(|l| l.id == id)
    }

    pub fn assignment(&self, kind: AssignmentKind) -> &Assignment {
        match kind {
            AssignmentKind::Practice => &self.practice,
            AssignmentKind::Graded => &self.graded,
        }
    }

    pub fn assignment_mut(&mut self, kind: AssignmentKind) -> &mut Assignment {
        match kind {
            AssignmentKind::Practice => &mut self.practice,
            AssignmentKind::Graded => &mut self.graded,
        }
    }
}

// ===== PROGRAM ROOT =====

/// The root aggregate. Everything the engine persists hangs off this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub weeks: Vec<Week>,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub streak_freezes: u32,
    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
    /// XP earned per calendar day, pruned to the retention window on write.
    #[serde(default)]
    pub xp_history: BTreeMap<NaiveDate, u64>,
    #[serde(default = "oldest_schema")]
    pub schema_version: u32,
}

fn default_level() -> u32 {
    1
}

/// Documents without a version marker predate versioning and count as v1.
fn oldest_schema() -> u32 {
    1
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// Fresh never-opened program at the current schema.
    pub fn new() -> Self {
        Self {
            weeks: Vec::new(),
            total_xp: 0,
            level: 1,
            streak: 0,
            best_streak: 0,
            streak_freezes: 0,
            last_active_date: None,
            xp_history: BTreeMap::new(),
            schema_version: SCHEMA_VERSION,
        }
    }

    pub fn week(&self, id: Uuid) -> Option<&Week> {
        self.weeks.iter().find(|w| w.id == id)
    }

    pub fn week_mut(&mut self, id: Uuid) -> Option<&mut Week> {
        self.weeks.iter_mut().find(|w| w.id == id)
    }

    /// Week by zero-based position, for callers that address by order.
    pub fn week_at(&self, index: usize) -> Option<&Week> {
        self.weeks.get(index)
    }

    pub fn add_week(&mut self, title: impl Into<String>) -> Uuid {
        let week = Week::new(title);
        let id = week.id;
        self.weeks.push(week);
        id
    }

    /// Remove a week by id. Returns the removed week so callers can report
    /// on it.
    pub fn remove_week(&mut self, id: Uuid) -> Option<Week> {
        let index = self.weeks.iter().position(|w| w.id == id)?;
        Some(self.weeks.remove(index))
    }

    /// Record XP earned on `today` into the day-keyed history, then prune
    /// entries that fell out of the retention window.
    pub fn record_xp(&mut self, today: NaiveDate, delta: u64) {
        if delta == 0 {
            return;
        }
        *self.xp_history.entry(today).or_insert(0) += delta;
        self.prune_history(today);
    }

    /// Drop history entries older than the retention window.
    pub fn prune_history(&mut self, today: NaiveDate) {
        if let Some(cutoff) = today.checked_sub_days(Days::new(HISTORY_RETENTION_DAYS)) {
            self.xp_history.retain(|day, _| *day >= cutoff);
        }
    }
}
