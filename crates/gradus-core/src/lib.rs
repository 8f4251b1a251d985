//! Gradus progression engine.
//! v0.2.0: XP aggregation, levels, streak machine, versioned store.
//! v0.3.0: revision logging, free-text notes, schema v3.
//! v0.4.0: streak freezes, best streak, badges, schema v4.
//!
//! Pure data in, pure data out: the engine owns the program state, the XP
//! economy and persistence, and hands callers snapshots to render. The
//! clock, all prompting and all presentation live with the caller.

pub mod aggregate;
pub mod badges;
pub mod dispatch;
pub mod error;
pub mod levels;
pub mod program;
pub mod rules;
pub mod stats;
pub mod store;
pub mod streak;

pub use dispatch::{
    begin_session, dispatch, Action, AppState, DispatchOutcome, SessionSummary, UiState,
};
pub use error::GradusError;
pub use levels::Progression;
pub use program::{Assignment, AssignmentKind, Lecture, Program, Week, SCHEMA_VERSION};
pub use stats::LifetimeStats;
pub use store::ProgramStore;
pub use streak::{StreakOutcome, StreakState};

/// Crate version, stamped into exports and the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
