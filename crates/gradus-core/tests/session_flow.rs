//! End-to-end session flows against a real on-disk store.
//!
//! Each test drives the engine the way the application does: begin a
//! session, dispatch actions, then reload from disk and check what
//! survived.

use chrono::NaiveDate;
use gradus_core::program::AssignmentKind;
use gradus_core::store::{export_document, import_document};
use gradus_core::{begin_session, dispatch, Action, AppState, DispatchOutcome, ProgramStore};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn delta(outcome: &DispatchOutcome) -> u64 {
    match outcome {
        DispatchOutcome::Committed { xp_delta, .. } => *xp_delta,
        other => panic!("expected Committed, got {:?}", other),
    }
}

#[test]
fn one_study_day_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = ProgramStore::with_root(dir.path());
    let today = date(2026, 1, 10);

    let mut state = AppState::new(store.load());
    let summary = begin_session(&mut state, &store, today);
    assert_eq!(summary.streak, 1);

    // Build the course skeleton.
    dispatch(&mut state, &store, Action::AddWeek { title: "Foundations".into() }, today);
    let week = state.program.weeks[0].id;
    dispatch(&mut state, &store, Action::AddLecture { week, title: "Welcome".into() }, today);
    let lecture = state.program.weeks[0].lectures[0].id;

    // Work through the lecture core.
    assert_eq!(delta(&dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, today)), 5);
    assert_eq!(delta(&dispatch(&mut state, &store, Action::ToggleMemoryNote { week, lecture }, today)), 7);
    assert_eq!(delta(&dispatch(&mut state, &store, Action::ToggleFinalNote { week, lecture }, today)), 5);

    // Activity questions, one over the cap.
    dispatch(&mut state, &store, Action::SetActivityTotal { week, lecture, total: 3 }, today);
    assert_eq!(delta(&dispatch(&mut state, &store, Action::StepActivity { week, lecture, delta: 4 }, today)), 3);

    // Assignments and weekly notes.
    dispatch(&mut state, &store, Action::SetAssignmentTotal { week, kind: AssignmentKind::Graded, total: 2 }, today);
    assert_eq!(
        delta(&dispatch(&mut state, &store, Action::StepAssignment { week, kind: AssignmentKind::Graded, delta: 2 }, today)),
        4
    );
    assert_eq!(delta(&dispatch(&mut state, &store, Action::ToggleWeeklyMemoryNote { week }, today)), 10);
    assert_eq!(delta(&dispatch(&mut state, &store, Action::ToggleWeeklyFinalNote { week }, today)), 10);

    // Completion gate is satisfied, bonus and freeze land.
    assert_eq!(delta(&dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today)), 15);
    assert_eq!(state.program.streak_freezes, 1);

    let expected_total = 5 + 7 + 5 + 3 + 4 + 10 + 10 + 15;
    assert_eq!(state.program.total_xp, expected_total);
    assert_eq!(state.program.xp_history.get(&today), Some(&expected_total));

    // Everything survives a cold reload.
    let reloaded = store.load();
    assert_eq!(reloaded, state.program);
}

#[test]
fn streak_grows_across_daily_sessions() {
    let dir = TempDir::new().unwrap();
    let store = ProgramStore::with_root(dir.path());

    let mut day = date(2026, 2, 1);
    for expected in 1..=5u32 {
        let mut state = AppState::new(store.load());
        let summary = begin_session(&mut state, &store, day);
        assert_eq!(summary.streak, expected);
        day = day.succ_opt().unwrap();
    }

    // Two-day absence with no freezes: back to one.
    let late = day.checked_add_days(chrono::Days::new(3)).unwrap();
    let mut state = AppState::new(store.load());
    let summary = begin_session(&mut state, &store, late);
    assert_eq!(summary.streak, 1);
    assert_eq!(summary.best_streak, 5);
}

#[test]
fn a_banked_freeze_survives_a_missed_day() {
    let dir = TempDir::new().unwrap();
    let store = ProgramStore::with_root(dir.path());
    let day1 = date(2026, 3, 1);

    // Day one: complete a one-lecture week to bank a freeze.
    let mut state = AppState::new(store.load());
    begin_session(&mut state, &store, day1);
    dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, day1);
    let week = state.program.weeks[0].id;
    dispatch(&mut state, &store, Action::AddLecture { week, title: "L1".into() }, day1);
    let lecture = state.program.weeks[0].lectures[0].id;
    dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, day1);
    dispatch(&mut state, &store, Action::ToggleMemoryNote { week, lecture }, day1);
    dispatch(&mut state, &store, Action::ToggleFinalNote { week, lecture }, day1);
    dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, day1);
    assert_eq!(state.program.streak_freezes, 1);
    drop(state);

    // Day three: the freeze bridges the missed day two.
    let mut state = AppState::new(store.load());
    let summary = begin_session(&mut state, &store, date(2026, 3, 3));
    assert_eq!(summary.streak, 2);
    assert!(summary.freeze_used);
    assert_eq!(summary.freezes, 0);

    // And the consumed freeze is gone on disk too.
    let reloaded = store.load();
    assert_eq!(reloaded.streak_freezes, 0);
    assert_eq!(reloaded.streak, 2);
}

#[test]
fn export_import_round_trip_through_dispatch() {
    let dir = TempDir::new().unwrap();
    let store = ProgramStore::with_root(dir.path());
    let today = date(2026, 4, 1);

    let mut state = AppState::new(store.load());
    begin_session(&mut state, &store, today);
    dispatch(&mut state, &store, Action::AddWeek { title: "Only Week".into() }, today);
    let week = state.program.weeks[0].id;
    dispatch(&mut state, &store, Action::AddLecture { week, title: "Only Lecture".into() }, today);
    let lecture = state.program.weeks[0].lectures[0].id;
    dispatch(&mut state, &store, Action::ToggleWatched { week, lecture }, today);
    let exported_state = state.program.clone();

    let (json, _filename) = export_document(&state.program, today).unwrap();

    // Fresh environment, same export.
    let dir2 = TempDir::new().unwrap();
    let store2 = ProgramStore::with_root(dir2.path());
    let mut state2 = AppState::new(store2.load());
    begin_session(&mut state2, &store2, today);

    let imported = import_document(&json).unwrap();
    let outcome = dispatch(
        &mut state2,
        &store2,
        Action::ReplaceProgram { program: Box::new(imported) },
        today,
    );
    assert!(matches!(outcome, DispatchOutcome::Committed { .. }));

    assert_eq!(state2.program.weeks, exported_state.weeks);
    assert_eq!(state2.program.total_xp, exported_state.total_xp);
    assert_eq!(state2.program.xp_history, exported_state.xp_history);

    // The replacement is on disk.
    assert_eq!(store2.load(), state2.program);
}

#[test]
fn rejected_and_dropped_actions_leave_disk_untouched() {
    let dir = TempDir::new().unwrap();
    let store = ProgramStore::with_root(dir.path());
    let today = date(2026, 5, 1);

    let mut state = AppState::new(store.load());
    begin_session(&mut state, &store, today);
    dispatch(&mut state, &store, Action::AddWeek { title: "W1".into() }, today);
    let week = state.program.weeks[0].id;
    dispatch(&mut state, &store, Action::AddLecture { week, title: "L1".into() }, today);
    let on_disk = store.load();

    // Gated completion: rejected, nothing changed anywhere.
    let outcome = dispatch(&mut state, &store, Action::ToggleWeekCompleted { week }, today);
    assert!(matches!(outcome, DispatchOutcome::Rejected { .. }));
    assert_eq!(store.load(), on_disk);
    assert_eq!(state.program, on_disk);

    // Stale id: dropped, nothing changed anywhere.
    let ghost = uuid::Uuid::new_v4();
    let outcome = dispatch(&mut state, &store, Action::DeleteWeek { week: ghost }, today);
    assert_eq!(outcome, DispatchOutcome::NotFound);
    assert_eq!(store.load(), on_disk);
}
