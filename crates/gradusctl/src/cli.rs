//! Command-line argument definitions.
//!
//! Shapes only; execution lives in `commands`. Weeks and lectures are
//! addressed by their 1-based position in the course, the way the status
//! listing numbers them.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gradusctl")]
#[command(about = "Gradus - study progress tracker with XP, levels and streaks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory override (wins over GRADUS_DATA_DIR and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the program overview
    Status {
        /// Expand one week to show its lectures
        #[arg(long, value_name = "N")]
        week: Option<usize>,

        /// Print the raw program document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage study weeks
    Week {
        #[command(subcommand)]
        action: WeekCommands,
    },

    /// Manage lectures within a week
    Lecture {
        #[command(subcommand)]
        action: LectureCommands,
    },

    /// Manage a week's practice and graded assignments
    Assignment {
        #[command(subcommand)]
        action: AssignmentCommands,
    },

    /// Lifetime statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Achievement badges
    Badges,

    /// XP earned per day
    History {
        /// Days to show (default from config, 14 out of the box)
        #[arg(long, value_name = "N")]
        days: Option<u32>,
    },

    /// Write a dated export of the whole program
    Export {
        /// Target directory (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Import an exported program, replacing the current one
    Import {
        /// Exported JSON file
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show configuration and storage paths
    Config,
}

#[derive(Subcommand)]
pub enum WeekCommands {
    /// Add a new week at the end of the course
    Add { title: String },

    /// Rename week N
    Rename { week: usize, title: String },

    /// Delete week N and everything in it
    Rm { week: usize },

    /// Toggle week N's completion bonus
    Done { week: usize },

    /// Toggle the weekly memory or final note
    Note {
        week: usize,
        #[arg(value_enum)]
        kind: NoteKind,
    },
}

#[derive(Subcommand)]
pub enum LectureCommands {
    /// Add a lecture to week N
    Add { week: usize, title: String },

    /// Rename lecture M of week N
    Rename {
        week: usize,
        lecture: usize,
        title: String,
    },

    /// Delete lecture M of week N
    Rm { week: usize, lecture: usize },

    /// Toggle watched
    Watch { week: usize, lecture: usize },

    /// Toggle the memory or final note
    Note {
        week: usize,
        lecture: usize,
        #[arg(value_enum)]
        kind: NoteKind,
    },

    /// Set the activity-question total
    ActivityTotal {
        week: usize,
        lecture: usize,
        total: u32,
    },

    /// Step activity questions done, up or down
    Activity {
        week: usize,
        lecture: usize,
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },

    /// Log one revision pass
    Revise { week: usize, lecture: usize },

    /// Replace the lecture's free-text notes
    Notes {
        week: usize,
        lecture: usize,
        text: String,
    },
}

#[derive(Subcommand)]
pub enum AssignmentCommands {
    /// Set the question total
    Set {
        week: usize,
        #[arg(value_enum)]
        kind: TrackKind,
        total: u32,
    },

    /// Step questions done, up or down
    Step {
        week: usize,
        #[arg(value_enum)]
        kind: TrackKind,
        #[arg(allow_hyphen_values = true)]
        delta: i32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NoteKind {
    Memory,
    Final,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TrackKind {
    Practice,
    Graded,
}
