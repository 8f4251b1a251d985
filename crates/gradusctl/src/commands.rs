//! Command handlers for gradusctl.
//!
//! Every handler follows the same shape: resolve 1-based positions to ids
//! against the loaded program, funnel the mutation through the engine's
//! dispatcher, then render the outcome. Handlers never mutate the program
//! directly.

use anyhow::{anyhow, Context, Result};
use chrono::{Days, NaiveDate};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use uuid::Uuid;

use gradus_core::program::Week;
use gradus_core::rules::MAX_STREAK_FREEZES;
use gradus_core::{
    badges, begin_session, dispatch, stats, store, Action, AppState, AssignmentKind,
    DispatchOutcome, Progression, ProgramStore, SessionSummary,
};

use crate::cli::{AssignmentCommands, LectureCommands, NoteKind, TrackKind, WeekCommands};
use crate::config::{self, CtlConfig};
use crate::ui::{self, colors};

/// Key column width for aligned output.
const KW: usize = 12;

/// Everything a handler needs for one invocation.
pub struct Ctx {
    pub store: ProgramStore,
    pub state: AppState,
    pub today: NaiveDate,
}

impl Ctx {
    /// Load the stored program and run the once-per-session streak
    /// transition before any command executes.
    pub fn open(store: ProgramStore, today: NaiveDate) -> Self {
        let mut state = AppState::new(store.load());
        let summary = begin_session(&mut state, &store, today);
        announce_session(&summary);
        Self { store, state, today }
    }
}

/// Session-start messages go to stderr so JSON output stays clean.
fn announce_session(summary: &SessionSummary) {
    if let Some(err) = &summary.persist_error {
        ui::print_warn(&format!("progress could not be saved: {}", err));
    }
    if summary.freeze_used {
        ui::print_warn(&format!(
            "streak freeze covered a missed day ({} left)",
            summary.freezes
        ));
    }
    if summary.streak > summary.previous_streak && summary.streak > 1 {
        ui::print_note(&format!("day {} of your streak", summary.streak));
    } else if summary.streak < summary.previous_streak {
        ui::print_note(&format!(
            "streak reset to 1 (best so far: {})",
            summary.best_streak
        ));
    }
}

// ===== POSITION RESOLUTION =====

fn resolve_week(ctx: &Ctx, pos: usize) -> Result<&Week> {
    let index = pos
        .checked_sub(1)
        .ok_or_else(|| anyhow!("week numbers start at 1"))?;
    ctx.state.program.week_at(index).ok_or_else(|| {
        anyhow!(
            "no week {} (the program has {})",
            pos,
            ctx.state.program.weeks.len()
        )
    })
}

fn week_id(ctx: &Ctx, pos: usize) -> Result<Uuid> {
    Ok(resolve_week(ctx, pos)?.id)
}

fn lecture_ids(ctx: &Ctx, week_pos: usize, lecture_pos: usize) -> Result<(Uuid, Uuid)> {
    let week = resolve_week(ctx, week_pos)?;
    let index = lecture_pos
        .checked_sub(1)
        .ok_or_else(|| anyhow!("lecture numbers start at 1"))?;
    let lecture = week.lectures.get(index).ok_or_else(|| {
        anyhow!(
            "no lecture {} in week {} (it has {})",
            lecture_pos,
            week_pos,
            week.lectures.len()
        )
    })?;
    Ok((week.id, lecture.id))
}

// ===== DISPATCH FUNNEL =====

/// Send one action through the engine and render what happened, including
/// any badges the mutation unlocked.
fn dispatch_and_report(ctx: &mut Ctx, action: Action) -> Result<()> {
    let stats_before = stats::collect(&ctx.state.program, ctx.today);
    let badges_before = badges::check_badges(&ctx.state.program, &stats_before);

    match dispatch(&mut ctx.state, &ctx.store, action, ctx.today) {
        DispatchOutcome::Committed {
            xp_delta,
            persist_error,
        } => {
            if xp_delta > 0 {
                ui::print_ok(&format!(
                    "+{} XP  (total {}, level {})",
                    xp_delta, ctx.state.program.total_xp, ctx.state.program.level
                ));
            } else {
                ui::print_ok("done");
            }
            if let Some(err) = persist_error {
                ui::print_warn(&format!("kept in memory but not saved: {}", err));
            }
            let stats_after = stats::collect(&ctx.state.program, ctx.today);
            let badges_after = badges::check_badges(&ctx.state.program, &stats_after);
            for badge in badges::newly_unlocked(&badges_before, &badges_after) {
                ui::print_ok(&badges::format_badge_unlock(&badge));
            }
            Ok(())
        }
        DispatchOutcome::UiOnly => Ok(()),
        DispatchOutcome::NotFound => {
            ui::print_err("that week or lecture no longer exists");
            Ok(())
        }
        DispatchOutcome::Rejected { reason } => {
            ui::print_warn(&reason);
            Ok(())
        }
    }
}

// ===== STATUS =====

pub fn status(ctx: &mut Ctx, week_filter: Option<usize>, json: bool) -> Result<()> {
    if let Some(pos) = week_filter {
        let week = week_id(ctx, pos)?;
        dispatch(
            &mut ctx.state,
            &ctx.store,
            Action::ToggleWeekExpanded { week },
            ctx.today,
        );
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&ctx.state.program)?);
        return Ok(());
    }
    render_status(&ctx.state, ctx.today);
    Ok(())
}

fn render_status(state: &AppState, today: NaiveDate) {
    let program = &state.program;
    ui::print_header("gradus", gradus_core::VERSION);

    let progression = Progression::from_xp(program.total_xp);
    let bar = ui::progress_bar(progression.progress as f32, 24);
    ui::print_kv(
        "level",
        &format!("{}  {} {:.0}%", progression.level, bar, progression.progress * 100.0),
        KW,
    );
    ui::print_kv(
        "xp",
        &format!(
            "{} total, {} to next level",
            progression.total_xp, progression.xp_to_next
        ),
        KW,
    );
    ui::print_kv(
        "streak",
        &format!("{} days (best {})", program.streak, program.best_streak),
        KW,
    );
    ui::print_kv(
        "freezes",
        &format!("{}/{}", program.streak_freezes, MAX_STREAK_FREEZES),
        KW,
    );
    let unlocked = badges::check_badges(program, &stats::collect(program, today));
    let strip = badges::format_badges(&unlocked, 6);
    if !strip.is_empty() {
        ui::print_kv("badges", &strip, KW);
    }
    println!();

    if program.weeks.is_empty() {
        println!("  no weeks yet. start with: gradusctl week add \"Week 1\"");
    }
    for (index, week) in program.weeks.iter().enumerate() {
        let progress = stats::week_progress(week);
        let bar = ui::progress_bar(progress as f32, 16);
        let done = if week.week_completed {
            format!("  {}", ui::mark(true))
        } else {
            String::new()
        };
        println!(
            "  {:>2}. {:<28} {} {:>3.0}%  {:>5} XP{}",
            index + 1,
            week.title,
            bar,
            progress * 100.0,
            week.xp_earned,
            done
        );
        if state.ui.week_expanded(week.id) {
            render_week_detail(week);
        }
    }
    ui::print_footer();
}

fn render_week_detail(week: &Week) {
    for (index, lecture) in week.lectures.iter().enumerate() {
        println!(
            "        {:>2}. {:<24} w:{} m:{} f:{}  activity {}/{}  rev {}  {:>4} XP",
            index + 1,
            lecture.title,
            ui::mark(lecture.watched),
            ui::mark(lecture.memory_note),
            ui::mark(lecture.final_note),
            lecture.activity_done_clamped(),
            lecture.activity_total,
            lecture.revision_count,
            lecture.xp_earned,
        );
        if !lecture.notes.is_empty() {
            println!("            {}note: {}{}", colors::DIM, lecture.notes, colors::RESET);
        }
    }
    println!(
        "        practice {}/{}  graded {}/{}  weekly notes m:{} f:{}",
        week.practice.done_clamped(),
        week.practice.total_questions,
        week.graded.done_clamped(),
        week.graded.total_questions,
        ui::mark(week.weekly_memory_note),
        ui::mark(week.weekly_final_note),
    );
}

// ===== WEEK / LECTURE / ASSIGNMENT =====

pub fn week(ctx: &mut Ctx, action: WeekCommands) -> Result<()> {
    match action {
        WeekCommands::Add { title } => dispatch_and_report(ctx, Action::AddWeek { title }),
        WeekCommands::Rename { week, title } => {
            let week = week_id(ctx, week)?;
            dispatch_and_report(ctx, Action::RenameWeek { week, title })
        }
        WeekCommands::Rm { week } => {
            let week = week_id(ctx, week)?;
            dispatch_and_report(ctx, Action::DeleteWeek { week })
        }
        WeekCommands::Done { week } => {
            let week = week_id(ctx, week)?;
            dispatch_and_report(ctx, Action::ToggleWeekCompleted { week })
        }
        WeekCommands::Note { week, kind } => {
            let week = week_id(ctx, week)?;
            let action = match kind {
                NoteKind::Memory => Action::ToggleWeeklyMemoryNote { week },
                NoteKind::Final => Action::ToggleWeeklyFinalNote { week },
            };
            dispatch_and_report(ctx, action)
        }
    }
}

pub fn lecture(ctx: &mut Ctx, action: LectureCommands) -> Result<()> {
    match action {
        LectureCommands::Add { week, title } => {
            let week = week_id(ctx, week)?;
            dispatch_and_report(ctx, Action::AddLecture { week, title })
        }
        LectureCommands::Rename { week, lecture, title } => {
            let (week, lecture) = lecture_ids(ctx, week, lecture)?;
            dispatch_and_report(ctx, Action::RenameLecture { week, lecture, title })
        }
        LectureCommands::Rm { week, lecture } => {
            let (week, lecture) = lecture_ids(ctx, week, lecture)?;
            dispatch_and_report(ctx, Action::DeleteLecture { week, lecture })
        }
        LectureCommands::Watch { week, lecture } => {
            let (week, lecture) = lecture_ids(ctx, week, lecture)?;
            dispatch_and_report(ctx, Action::ToggleWatched { week, lecture })
        }
        LectureCommands::Note { week, lecture, kind } => {
            let (week, lecture) = lecture_ids(ctx, week, lecture)?;
            let action = match kind {
                NoteKind::Memory => Action::ToggleMemoryNote { week, lecture },
                NoteKind::Final => Action::ToggleFinalNote { week, lecture },
            };
            dispatch_and_report(ctx, action)
        }
        LectureCommands::ActivityTotal { week, lecture, total } => {
            let (week, lecture) = lecture_ids(ctx, week, lecture)?;
            dispatch_and_report(ctx, Action::SetActivityTotal { week, lecture, total })
        }
        LectureCommands::Activity { week, lecture, delta } => {
            let (week, lecture) = lecture_ids(ctx, week, lecture)?;
            dispatch_and_report(ctx, Action::StepActivity { week, lecture, delta })
        }
        LectureCommands::Revise { week, lecture } => {
            let (week, lecture) = lecture_ids(ctx, week, lecture)?;
            dispatch_and_report(ctx, Action::LogRevision { week, lecture })
        }
        LectureCommands::Notes { week, lecture, text } => {
            let (week, lecture) = lecture_ids(ctx, week, lecture)?;
            dispatch_and_report(ctx, Action::EditNotes { week, lecture, notes: text })
        }
    }
}

pub fn assignment(ctx: &mut Ctx, action: AssignmentCommands) -> Result<()> {
    match action {
        AssignmentCommands::Set { week, kind, total } => {
            let week = week_id(ctx, week)?;
            let kind = assignment_kind(kind);
            dispatch_and_report(ctx, Action::SetAssignmentTotal { week, kind, total })
        }
        AssignmentCommands::Step { week, kind, delta } => {
            let week = week_id(ctx, week)?;
            let kind = assignment_kind(kind);
            dispatch_and_report(ctx, Action::StepAssignment { week, kind, delta })
        }
    }
}

fn assignment_kind(kind: TrackKind) -> AssignmentKind {
    match kind {
        TrackKind::Practice => AssignmentKind::Practice,
        TrackKind::Graded => AssignmentKind::Graded,
    }
}

// ===== STATS / BADGES / HISTORY =====

pub fn stats_panel(ctx: &Ctx, json: bool) -> Result<()> {
    let stats = stats::collect(&ctx.state.program, ctx.today);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    let kw = 14;
    ui::print_header("gradus stats", gradus_core::VERSION);
    ui::print_kv(
        "weeks",
        &format!("{} ({} completed)", stats.total_weeks, stats.weeks_completed),
        kw,
    );
    ui::print_kv(
        "lectures",
        &format!("{} ({} core done)", stats.total_lectures, stats.completed_lectures),
        kw,
    );
    ui::print_kv("revisions", &stats.total_revisions.to_string(), kw);
    ui::print_kv(
        "activity",
        &format!("{}/{}", stats.activity_done, stats.activity_total),
        kw,
    );
    ui::print_kv(
        "practice",
        &format!("{}/{}", stats.practice_done, stats.practice_total),
        kw,
    );
    ui::print_kv(
        "graded",
        &format!("{}/{}", stats.graded_done, stats.graded_total),
        kw,
    );
    println!();
    ui::print_kv("xp this month", &stats.month_xp.to_string(), kw);
    ui::print_kv("active days", &stats.active_days.to_string(), kw);
    ui::print_kv(
        "streak",
        &format!(
            "{} days (best {}, {} freezes banked)",
            ctx.state.program.streak, ctx.state.program.best_streak, ctx.state.program.streak_freezes
        ),
        kw,
    );
    ui::print_footer();
    Ok(())
}

pub fn badges_panel(ctx: &Ctx) -> Result<()> {
    let stats = stats::collect(&ctx.state.program, ctx.today);
    let badges = badges::check_badges(&ctx.state.program, &stats);
    let unlocked = badges.iter().filter(|b| b.unlocked).count();

    ui::print_header("gradus badges", gradus_core::VERSION);
    println!("  {} of {} unlocked", unlocked, badges.len());
    println!();
    for badge in &badges {
        if badge.unlocked {
            println!(
                "  {}{:<6}{} {:<20} {}",
                colors::OK,
                badge.symbol,
                colors::RESET,
                badge.name,
                badge.description
            );
        } else {
            println!(
                "  {}{:<6} {:<20} {}{}",
                colors::DIM,
                badge.symbol,
                badge.name,
                badge.description,
                colors::RESET
            );
        }
    }
    ui::print_footer();
    Ok(())
}

pub fn history(ctx: &Ctx, days: u32) -> Result<()> {
    let days = days.max(1);
    let start = ctx
        .today
        .checked_sub_days(Days::new(u64::from(days) - 1))
        .ok_or_else(|| anyhow!("history window underflows the calendar"))?;

    let window: Vec<(NaiveDate, u64)> = start
        .iter_days()
        .take(days as usize)
        .map(|day| (day, ctx.state.program.xp_history.get(&day).copied().unwrap_or(0)))
        .collect();
    let peak = window.iter().map(|(_, xp)| *xp).max().unwrap_or(0);

    ui::print_header("gradus history", gradus_core::VERSION);
    if peak == 0 {
        println!("  no XP earned in the last {} days", days);
    } else {
        for (day, xp) in &window {
            let ratio = *xp as f32 / peak as f32;
            println!("  {}  {} {:>5}", day, ui::progress_bar(ratio, 20), xp);
        }
    }
    ui::print_footer();
    Ok(())
}

// ===== EXPORT / IMPORT / CONFIG =====

pub fn export(ctx: &Ctx, out: Option<PathBuf>) -> Result<()> {
    let (json, filename) = store::export_document(&ctx.state.program, ctx.today)?;
    let dir = out.unwrap_or_else(|| PathBuf::from("."));
    let path = dir.join(filename);
    fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
    ui::print_ok(&format!("exported to {}", path.display()));
    Ok(())
}

pub fn import(ctx: &mut Ctx, file: PathBuf, yes: bool) -> Result<()> {
    let raw = fs::read_to_string(&file).with_context(|| format!("cannot read {}", file.display()))?;
    let imported = store::import_document(&raw)?;

    println!(
        "  current:  {} weeks, {} XP",
        ctx.state.program.weeks.len(),
        ctx.state.program.total_xp
    );
    println!(
        "  imported: {} weeks, {} XP",
        imported.weeks.len(),
        imported.total_xp
    );
    if !yes && !ask_confirm("Replace the current program?")? {
        println!("  import cancelled");
        return Ok(());
    }
    dispatch_and_report(ctx, Action::ReplaceProgram { program: Box::new(imported) })?;
    ui::print_ok(&format!("imported {}", file.display()));
    Ok(())
}

fn ask_confirm(prompt: &str) -> Result<bool> {
    print!("  {} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

pub fn config_show(config: &CtlConfig, store: &ProgramStore) -> Result<()> {
    ui::print_header("gradus config", gradus_core::VERSION);
    ui::print_kv("config file", &config::config_path().display().to_string(), KW);
    ui::print_kv("data file", &store.path().display().to_string(), KW);
    ui::print_kv("history days", &config.display.history_days.to_string(), KW);
    ui::print_footer();
    Ok(())
}
