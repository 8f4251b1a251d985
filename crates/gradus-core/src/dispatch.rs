//! Dispatch orchestrator.
//!
//! Every state change flows through `dispatch` as a named action. After a
//! real mutation the same sequence always runs: recompute XP from scratch,
//! record the day's positive delta, persist, and hand the caller an outcome
//! to render. Session start has its own entry point, `begin_session`, which
//! runs the streak machine exactly once before any action is dispatched.
//!
//! Expansion toggles mutate only transient UI state and skip the whole
//! recompute/persist tail.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregate;
use crate::program::{AssignmentKind, Lecture, Program, Week};
use crate::store::ProgramStore;
use crate::streak::{self, StreakState};

// ===== ACTIONS =====

/// The closed set of mutations. Every variant carries its full payload and
/// `apply` matches exhaustively, so a new action cannot be half-wired.
#[derive(Debug, Clone)]
pub enum Action {
    AddWeek { title: String },
    RenameWeek { week: Uuid, title: String },
    DeleteWeek { week: Uuid },
    AddLecture { week: Uuid, title: String },
    RenameLecture { week: Uuid, lecture: Uuid, title: String },
    DeleteLecture { week: Uuid, lecture: Uuid },
    ToggleWatched { week: Uuid, lecture: Uuid },
    ToggleMemoryNote { week: Uuid, lecture: Uuid },
    ToggleFinalNote { week: Uuid, lecture: Uuid },
    SetActivityTotal { week: Uuid, lecture: Uuid, total: u32 },
    StepActivity { week: Uuid, lecture: Uuid, delta: i32 },
    LogRevision { week: Uuid, lecture: Uuid },
    EditNotes { week: Uuid, lecture: Uuid, notes: String },
    SetAssignmentTotal { week: Uuid, kind: AssignmentKind, total: u32 },
    StepAssignment { week: Uuid, kind: AssignmentKind, delta: i32 },
    ToggleWeeklyMemoryNote { week: Uuid },
    ToggleWeeklyFinalNote { week: Uuid },
    ToggleWeekCompleted { week: Uuid },
    /// Wholesale replacement, used to commit a validated import.
    ReplaceProgram { program: Box<Program> },
    /// UI-only: expand or collapse a week in the view.
    ToggleWeekExpanded { week: Uuid },
    /// UI-only: expand or collapse a lecture in the view.
    ToggleLectureExpanded { lecture: Uuid },
}

impl Action {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddWeek { .. } => "add_week",
            Action::RenameWeek { .. } => "rename_week",
            Action::DeleteWeek { .. } => "delete_week",
            Action::AddLecture { .. } => "add_lecture",
            Action::RenameLecture { .. } => "rename_lecture",
            Action::DeleteLecture { .. } => "delete_lecture",
            Action::ToggleWatched { .. } => "toggle_watched",
            Action::ToggleMemoryNote { .. } => "toggle_memory_note",
            Action::ToggleFinalNote { .. } => "toggle_final_note",
            Action::SetActivityTotal { .. } => "set_activity_total",
            Action::StepActivity { .. } => "step_activity",
            Action::LogRevision { .. } => "log_revision",
            Action::EditNotes { .. } => "edit_notes",
            Action::SetAssignmentTotal { .. } => "set_assignment_total",
            Action::StepAssignment { .. } => "step_assignment",
            Action::ToggleWeeklyMemoryNote { .. } => "toggle_weekly_memory_note",
            Action::ToggleWeeklyFinalNote { .. } => "toggle_weekly_final_note",
            Action::ToggleWeekCompleted { .. } => "toggle_week_completed",
            Action::ReplaceProgram { .. } => "replace_program",
            Action::ToggleWeekExpanded { .. } => "toggle_week_expanded",
            Action::ToggleLectureExpanded { .. } => "toggle_lecture_expanded",
        }
    }
}

// ===== APPLICATION STATE =====

/// Transient view state: which weeks and lectures are expanded. Never
/// persisted; a new session starts collapsed.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub expanded_weeks: HashSet<Uuid>,
    pub expanded_lectures: HashSet<Uuid>,
}

impl UiState {
    pub fn week_expanded(&self, id: Uuid) -> bool {
        self.expanded_weeks.contains(&id)
    }

    pub fn lecture_expanded(&self, id: Uuid) -> bool {
        self.expanded_lectures.contains(&id)
    }

    fn toggle_week(&mut self, id: Uuid) {
        if !self.expanded_weeks.remove(&id) {
            self.expanded_weeks.insert(id);
        }
    }

    fn toggle_lecture(&mut self, id: Uuid) {
        if !self.expanded_lectures.remove(&id) {
            self.expanded_lectures.insert(id);
        }
    }

    /// Drop expansion entries whose entity no longer exists.
    fn prune(&mut self, program: &Program) {
        self.expanded_weeks.retain(|id| program.week(*id).is_some());
        let live: HashSet<Uuid> = program
            .weeks
            .iter()
            .flat_map(|w| w.lectures.iter().map(|l| l.id))
            .collect();
        self.expanded_lectures.retain(|id| live.contains(id));
    }
}

/// What the orchestrator owns: the persisted program plus UI bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub program: Program,
    pub ui: UiState,
}

impl AppState {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            ui: UiState::default(),
        }
    }
}

// ===== OUTCOMES =====

/// What a dispatch call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Mutation applied and aggregated. `persist_error` carries the save
    /// failure when there was one; in-memory state stays authoritative
    /// either way.
    Committed {
        xp_delta: u64,
        persist_error: Option<String>,
    },
    /// Expansion-only change: render it, persist nothing.
    UiOnly,
    /// The target week or lecture no longer exists; the action was dropped.
    NotFound,
    /// A gated action was refused; nothing changed.
    Rejected { reason: String },
}

/// Result of the once-per-session streak transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub streak: u32,
    pub best_streak: u32,
    pub freezes: u32,
    /// The streak value before this session's transition.
    pub previous_streak: u32,
    pub freeze_used: bool,
    pub persist_error: Option<String>,
}

// ===== ENTRY POINTS =====

/// Run the once-per-session streak transition, resync aggregates against
/// the checklist tree, and persist.
///
/// Call this exactly once at startup, before dispatching any action.
/// Re-entry on the same calendar day leaves the streak untouched.
pub fn begin_session(state: &mut AppState, store: &ProgramStore, today: NaiveDate) -> SessionSummary {
    let before = StreakState::of(&state.program);
    let outcome = streak::advance(before, today);
    outcome.state.store(&mut state.program);

    // Stored totals are advisory after migrations or hand edits; the
    // checklist tree is the truth.
    aggregate::recompute_xp(&mut state.program);

    let persist_error = match store.save(&state.program) {
        Ok(()) => None,
        Err(e) => {
            warn!("save failed at session start: {}", e);
            Some(e.to_string())
        }
    };
    if outcome.freeze_used {
        info!("streak freeze consumed, {} left", state.program.streak_freezes);
    }
    SessionSummary {
        streak: state.program.streak,
        best_streak: state.program.best_streak,
        freezes: state.program.streak_freezes,
        previous_streak: before.streak,
        freeze_used: outcome.freeze_used,
        persist_error,
    }
}

/// Apply one action and run the post-mutation tail.
pub fn dispatch(
    state: &mut AppState,
    store: &ProgramStore,
    action: Action,
    today: NaiveDate,
) -> DispatchOutcome {
    let name = action.name();
    let prior_total = state.program.total_xp;
    match apply(state, action) {
        Applied::UiOnly => DispatchOutcome::UiOnly,
        Applied::NotFound => {
            debug!("dispatch {}: target missing, dropped", name);
            DispatchOutcome::NotFound
        }
        Applied::Rejected(reason) => {
            debug!("dispatch {}: rejected ({})", name, reason);
            DispatchOutcome::Rejected { reason }
        }
        Applied::Mutated => commit(state, store, today, prior_total, true, name),
        // An imported document brings its own history; only organic actions
        // feed the day counter.
        Applied::Replaced => commit(state, store, today, prior_total, false, name),
    }
}

fn commit(
    state: &mut AppState,
    store: &ProgramStore,
    today: NaiveDate,
    prior_total: u64,
    record_history: bool,
    name: &str,
) -> DispatchOutcome {
    let new_total = aggregate::recompute_xp(&mut state.program);
    // History only ever counts gains; undoing work never claws a day back.
    let xp_delta = new_total.saturating_sub(prior_total);
    if record_history && xp_delta > 0 {
        state.program.record_xp(today, xp_delta);
    }
    let persist_error = match store.save(&state.program) {
        Ok(()) => None,
        Err(e) => {
            warn!("save failed after {}: {}", name, e);
            Some(e.to_string())
        }
    };
    DispatchOutcome::Committed {
        xp_delta,
        persist_error,
    }
}

// ===== MUTATION =====

enum Applied {
    Mutated,
    Replaced,
    UiOnly,
    NotFound,
    Rejected(String),
}

/// Clear a stale completion flag the moment core actions regress.
fn reconcile_completion(week: &mut Week) {
    if week.week_completed && !week.core_complete() {
        week.week_completed = false;
    }
}

/// Step a counter by a signed delta, clamped into `[0, max]`.
fn step_counter(value: u32, delta: i32, max: u32) -> u32 {
    let next = i64::from(value) + i64::from(delta);
    next.clamp(0, i64::from(max)) as u32
}

fn toggle_core_flag(
    state: &mut AppState,
    week: Uuid,
    lecture: Uuid,
    flip: impl FnOnce(&mut Lecture),
) -> Applied {
    let Some(w) = state.program.week_mut(week) else {
        return Applied::NotFound;
    };
    let Some(l) = w.lecture_mut(lecture) else {
        return Applied::NotFound;
    };
    flip(l);
    reconcile_completion(w);
    Applied::Mutated
}

fn apply(state: &mut AppState, action: Action) -> Applied {
    match action {
        Action::AddWeek { title } => {
            state.program.add_week(title);
            Applied::Mutated
        }
        Action::RenameWeek { week, title } => match state.program.week_mut(week) {
            Some(w) => {
                w.title = title;
                Applied::Mutated
            }
            None => Applied::NotFound,
        },
        Action::DeleteWeek { week } => {
            if state.program.remove_week(week).is_none() {
                return Applied::NotFound;
            }
            state.ui.prune(&state.program);
            Applied::Mutated
        }
        Action::AddLecture { week, title } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            w.lectures.push(Lecture::new(title));
            // A fresh lecture breaks the completion gate of a done week.
            reconcile_completion(w);
            Applied::Mutated
        }
        Action::RenameLecture { week, lecture, title } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            let Some(l) = w.lecture_mut(lecture) else {
                return Applied::NotFound;
            };
            l.title = title;
            Applied::Mutated
        }
        Action::DeleteLecture { week, lecture } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            let Some(index) = w.lectures.iter().position(|l| l.id == lecture) else {
                return Applied::NotFound;
            };
            w.lectures.remove(index);
            reconcile_completion(w);
            state.ui.prune(&state.program);
            Applied::Mutated
        }
        Action::ToggleWatched { week, lecture } => {
            toggle_core_flag(state, week, lecture, |l| l.watched = !l.watched)
        }
        Action::ToggleMemoryNote { week, lecture } => {
            toggle_core_flag(state, week, lecture, |l| l.memory_note = !l.memory_note)
        }
        Action::ToggleFinalNote { week, lecture } => {
            toggle_core_flag(state, week, lecture, |l| l.final_note = !l.final_note)
        }
        Action::SetActivityTotal { week, lecture, total } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            let Some(l) = w.lecture_mut(lecture) else {
                return Applied::NotFound;
            };
            l.activity_total = total;
            l.activity_done = l.activity_done.min(total);
            Applied::Mutated
        }
        Action::StepActivity { week, lecture, delta } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            let Some(l) = w.lecture_mut(lecture) else {
                return Applied::NotFound;
            };
            l.activity_done = step_counter(l.activity_done, delta, l.activity_total);
            Applied::Mutated
        }
        Action::LogRevision { week, lecture } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            let Some(l) = w.lecture_mut(lecture) else {
                return Applied::NotFound;
            };
            l.revision_count = l.revision_count.saturating_add(1);
            Applied::Mutated
        }
        Action::EditNotes { week, lecture, notes } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            let Some(l) = w.lecture_mut(lecture) else {
                return Applied::NotFound;
            };
            l.notes = notes;
            Applied::Mutated
        }
        Action::SetAssignmentTotal { week, kind, total } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            let assignment = w.assignment_mut(kind);
            assignment.total_questions = total;
            assignment.done_questions = assignment.done_questions.min(total);
            Applied::Mutated
        }
        Action::StepAssignment { week, kind, delta } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            let assignment = w.assignment_mut(kind);
            assignment.done_questions =
                step_counter(assignment.done_questions, delta, assignment.total_questions);
            Applied::Mutated
        }
        Action::ToggleWeeklyMemoryNote { week } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            w.weekly_memory_note = !w.weekly_memory_note;
            Applied::Mutated
        }
        Action::ToggleWeeklyFinalNote { week } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            w.weekly_final_note = !w.weekly_final_note;
            Applied::Mutated
        }
        Action::ToggleWeekCompleted { week } => {
            let Some(w) = state.program.week_mut(week) else {
                return Applied::NotFound;
            };
            if w.week_completed {
                // Un-completing is always allowed.
                w.week_completed = false;
                return Applied::Mutated;
            }
            if !w.core_complete() {
                return Applied::Rejected(
                    "every lecture needs watched, memory note and final note before the week can be completed"
                        .into(),
                );
            }
            w.week_completed = true;
            // Completing a week banks one streak freeze.
            state.program.streak_freezes = streak::earn_freeze(state.program.streak_freezes);
            Applied::Mutated
        }
        Action::ReplaceProgram { program } => {
            state.program = *program;
            // Imported documents are not trusted to be self-consistent.
            for week in &mut state.program.weeks {
                reconcile_completion(week);
            }
            state.ui.prune(&state.program);
            Applied::Replaced
        }
        Action::ToggleWeekExpanded { week } => {
            if state.program.week(week).is_none() {
                return Applied::NotFound;
            }
            state.ui.toggle_week(week);
            Applied::UiOnly
        }
        Action::ToggleLectureExpanded { lecture } => {
            let exists = state
                .program
                .weeks
                .iter()
                .any(|w| w.lecture(lecture).is_some());
            if !exists {
                return Applied::NotFound;
            }
            state.ui.toggle_lecture(lecture);
            Applied::UiOnly
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::MAX_STREAK_FREEZES;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn harness() -> (TempDir, ProgramStore, AppState, NaiveDate) {
        let dir = TempDir::new().unwrap();
        let store = ProgramStore::with_root(dir.path());
        let state = AppState::new(Program::new());
        (dir, store, state, date(2026, 1, 10))
    }

    fn committed_delta(outcome: &DispatchOutcome) -> u64 {
        match outcome {
            DispatchOutcome::Committed { xp_delta, persist_error } => {
                assert!(persist_error.is_none(), "unexpected persist error");
                *xp_delta
            }
            other => panic!("expected Committed, got {:?}", other),
        }
    }

    /// Build one week with a single fully-done lecture and return both ids.
    fn seed_week(state: &mut AppState, store: &ProgramStore, today: NaiveDate) -> (Uuid, Uuid) {
        dispatch(state, store, Action::AddWeek { title: "W1".into() }, today);
        let week = state.program.weeks[0].id;
        dispatch(
            state,
            store,
            Action::AddLecture { week, title: "L1".into() },
            today,
        );
        let lecture = state.program.weeks[0].lectures[0].id;
        for action in [
            Action::ToggleWatched { week, lecture },
            Action::ToggleMemoryNote { week, lecture },
            Action::ToggleFinalNote { week, lecture },
        ] {
            dispatch(state, store, action, today);
        }
        (week, lecture)
    }

    #[test]
    fn add_week_commits_with_zero_delta() {
        let (_dir, store, mut state, today) = harness();
        let outcome = dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, today);
        assert_eq!(committed_delta(&outcome), 0);
        assert_eq!(state.program.weeks.len(), 1);
        assert!(store.path().exists());
    }

    #[test]
    fn toggle_watched_awards_and_records() {
        let (_dir, store, mut state, today) = harness();
        dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, today);
        let week = state.program.weeks[0].id;
        dispatch(&mut state, &store, Action::AddLecture { week, title: "L1".into() }, today);
        let lecture = state.program.weeks[0].lectures[0].id;

        let outcome = dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, today);
        assert_eq!(committed_delta(&outcome), 5);
        assert_eq!(state.program.total_xp, 5);
        assert_eq!(state.program.xp_history.get(&today), Some(&5));
    }

    #[test]
    fn untoggle_removes_xp_but_keeps_history() {
        let (_dir, store, mut state, today) = harness();
        dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, today);
        let week = state.program.weeks[0].id;
        dispatch(&mut state, &store, Action::AddLecture { week, title: "L1".into() }, today);
        let lecture = state.program.weeks[0].lectures[0].id;

        dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, today);
        let outcome = dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, today);
        assert_eq!(committed_delta(&outcome), 0);
        assert_eq!(state.program.total_xp, 0);
        // The earned day stays earned.
        assert_eq!(state.program.xp_history.get(&today), Some(&5));
    }

    #[test]
    fn toggling_back_and_forth_never_double_counts() {
        let (_dir, store, mut state, today) = harness();
        dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, today);
        let week = state.program.weeks[0].id;
        dispatch(&mut state, &store, Action::AddLecture { week, title: "L1".into() }, today);
        let lecture = state.program.weeks[0].lectures[0].id;

        for _ in 0..5 {
            dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, today);
            dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, today);
        }
        dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, today);
        assert_eq!(state.program.total_xp, 5);
    }

    #[test]
    fn steppers_clamp_at_both_ends() {
        let (_dir, store, mut state, today) = harness();
        dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, today);
        let week = state.program.weeks[0].id;
        dispatch(&mut state, &store, Action::AddLecture { week, title: "L1".into() }, today);
        let lecture = state.program.weeks[0].lectures[0].id;

        dispatch(&mut state, &store, Action::SetActivityTotal { week, lecture, total: 3 }, today);
        dispatch(&mut state, &store, Action::StepActivity { week, lecture, delta: 10 }, today);
        assert_eq!(state.program.weeks[0].lectures[0].activity_done, 3);
        dispatch(&mut state, &store, Action::StepActivity { week, lecture, delta: -10 }, today);
        assert_eq!(state.program.weeks[0].lectures[0].activity_done, 0);
    }

    #[test]
    fn shrinking_a_total_clamps_done() {
        let (_dir, store, mut state, today) = harness();
        dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, today);
        let week = state.program.weeks[0].id;
        dispatch(
            &mut state,
            &store,
            Action::SetAssignmentTotal { week, kind: AssignmentKind::Practice, total: 10 },
            today,
        );
        dispatch(
            &mut state,
            &store,
            Action::StepAssignment { week, kind: AssignmentKind::Practice, delta: 8 },
            today,
        );
        dispatch(
            &mut state,
            &store,
            Action::SetAssignmentTotal { week, kind: AssignmentKind::Practice, total: 4 },
            today,
        );
        assert_eq!(state.program.weeks[0].practice.done_questions, 4);
    }

    #[test]
    fn completion_is_gated_until_core_done() {
        let (_dir, store, mut state, today) = harness();
        dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, today);
        let week = state.program.weeks[0].id;
        dispatch(&mut state, &store, Action::AddLecture { week, title: "L1".into() }, today);

        let outcome = dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today);
        assert!(matches!(outcome, DispatchOutcome::Rejected { .. }));
        assert!(!state.program.weeks[0].week_completed);
        assert_eq!(state.program.streak_freezes, 0);
    }

    #[test]
    fn completing_a_week_awards_bonus_and_freeze() {
        let (_dir, store, mut state, today) = harness();
        let (week, _) = seed_week(&mut state, &store, today);

        let outcome = dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today);
        assert_eq!(committed_delta(&outcome), 15);
        assert!(state.program.weeks[0].week_completed);
        assert_eq!(state.program.streak_freezes, 1);
    }

    #[test]
    fn freeze_pool_caps_across_repeated_completions() {
        let (_dir, store, mut state, today) = harness();
        let (week, _) = seed_week(&mut state, &store, today);

        for _ in 0..5 {
            dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today);
            dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today);
        }
        assert_eq!(state.program.streak_freezes, MAX_STREAK_FREEZES);
    }

    #[test]
    fn deleting_the_last_core_lecture_clears_completion() {
        let (_dir, store, mut state, today) = harness();
        let (week, lecture) = seed_week(&mut state, &store, today);
        dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today);
        assert!(state.program.weeks[0].week_completed);
        let total_before = state.program.total_xp;

        let outcome = dispatch(&mut state, &store, Action::DeleteLecture { week, lecture }, today);
        assert_eq!(committed_delta(&outcome), 0);
        assert!(!state.program.weeks[0].week_completed);
        // Lecture XP and the completion bonus are both gone.
        assert_eq!(state.program.total_xp, total_before - 17 - 15);
    }

    #[test]
    fn unchecking_core_clears_completion_flag() {
        let (_dir, store, mut state, today) = harness();
        let (week, lecture) = seed_week(&mut state, &store, today);
        dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today);

        dispatch(&mut state, &store, Action::ToggleMemoryNote { week, lecture }, today);
        assert!(!state.program.weeks[0].week_completed);
    }

    #[test]
    fn adding_a_lecture_breaks_completion() {
        let (_dir, store, mut state, today) = harness();
        let (week, _) = seed_week(&mut state, &store, today);
        dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today);

        dispatch(&mut state, &store, Action::AddLecture { week, title: "L2".into() }, today);
        assert!(!state.program.weeks[0].week_completed);
    }

    #[test]
    fn revisions_stack_without_cap() {
        let (_dir, store, mut state, today) = harness();
        let (week, lecture) = seed_week(&mut state, &store, today);
        for _ in 0..4 {
            let outcome = dispatch(&mut state, &store, Action::LogRevision { week, lecture }, today);
            assert_eq!(committed_delta(&outcome), 10);
        }
        assert_eq!(state.program.weeks[0].lectures[0].revision_count, 4);
    }

    #[test]
    fn stale_targets_are_dropped() {
        let (_dir, store, mut state, today) = harness();
        let (week, lecture) = seed_week(&mut state, &store, today);
        dispatch(&mut state, &store, Action::DeleteWeek { week }, today);

        let outcome = dispatch(
            &mut state,
            &store,
            Action::RenameLecture { week, lecture, title: "gone".into() },
            today,
        );
        assert_eq!(outcome, DispatchOutcome::NotFound);
    }

    #[test]
    fn ui_toggles_do_not_touch_disk() {
        let (_dir, store, mut state, today) = harness();
        // Build state without the store ever seeing it.
        state.program.add_week("W1");
        let week = state.program.weeks[0].id;

        let outcome = dispatch(&mut state, &store, Action::ToggleWeekExpanded { week }, today);
        assert_eq!(outcome, DispatchOutcome::UiOnly);
        assert!(state.ui.week_expanded(week));
        assert!(!store.path().exists());

        dispatch(&mut state, &store, Action::ToggleWeekExpanded { week }, today);
        assert!(!state.ui.week_expanded(week));
    }

    #[test]
    fn deleting_a_week_prunes_its_expansions() {
        let (_dir, store, mut state, today) = harness();
        let (week, lecture) = seed_week(&mut state, &store, today);
        dispatch(&mut state, &store, Action::ToggleWeekExpanded { week }, today);
        dispatch(&mut state, &store, Action::ToggleLectureExpanded { lecture }, today);

        dispatch(&mut state, &store, Action::DeleteWeek { week }, today);
        assert!(state.ui.expanded_weeks.is_empty());
        assert!(state.ui.expanded_lectures.is_empty());
    }

    #[test]
    fn replace_program_reconciles_and_skips_history() {
        let (_dir, store, mut state, today) = harness();

        // An inconsistent import: completed flag without a complete core.
        let mut imported = Program::new();
        let week_id = imported.add_week("W1");
        {
            let week = imported.week_mut(week_id).unwrap();
            week.lectures.push(Lecture::new("L1"));
            week.week_completed = true;
        }
        imported.total_xp = 0;

        let outcome = dispatch(
            &mut state,
            &store,
            Action::ReplaceProgram { program: Box::new(imported) },
            today,
        );
        assert!(matches!(outcome, DispatchOutcome::Committed { .. }));
        assert!(!state.program.weeks[0].week_completed);
        assert!(state.program.xp_history.is_empty());
    }

    #[test]
    fn first_session_activates_the_streak() {
        let (_dir, store, mut state, today) = harness();
        let summary = begin_session(&mut state, &store, today);
        assert_eq!(summary.streak, 1);
        assert_eq!(summary.previous_streak, 0);
        assert!(!summary.freeze_used);
        assert!(summary.persist_error.is_none());
        assert_eq!(state.program.last_active_date, Some(today));
        assert!(store.path().exists());
    }

    #[test]
    fn second_session_same_day_is_a_noop() {
        let (_dir, store, mut state, today) = harness();
        begin_session(&mut state, &store, today);
        let summary = begin_session(&mut state, &store, today);
        assert_eq!(summary.streak, 1);
        assert_eq!(summary.previous_streak, 1);
    }

    #[test]
    fn session_resyncs_tampered_totals() {
        let (_dir, store, mut state, today) = harness();
        seed_week(&mut state, &store, today);
        state.program.total_xp = 999_999;

        begin_session(&mut state, &store, today);
        assert_eq!(state.program.total_xp, 17);
    }

    #[test]
    fn session_with_freeze_bridges_one_missed_day() {
        let (_dir, store, mut state, _) = harness();
        state.program.streak = 7;
        state.program.best_streak = 7;
        state.program.streak_freezes = 2;
        state.program.last_active_date = Some(date(2026, 1, 10));

        let summary = begin_session(&mut state, &store, date(2026, 1, 12));
        assert_eq!(summary.streak, 8);
        assert_eq!(summary.freezes, 1);
        assert!(summary.freeze_used);
    }
}
