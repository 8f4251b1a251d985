//! gradusctl entry point.
//!
//! Wires the clap command tree to the progression engine: resolve the
//! store, open a session (which runs the daily streak transition), then
//! hand off to the matching handler.

mod cli;
mod commands;
mod config;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::Ctx;
use crate::config::CtlConfig;

/// Logging goes to stderr so stdout stays parseable for --json output.
fn init_logging() {
    let filter = EnvFilter::try_from_env("GRADUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let cfg = CtlConfig::load();
    let store = config::resolve_store(cli.data_dir.as_deref(), &cfg);

    // Paths must be inspectable even when the data file cannot be read,
    // so `config` short-circuits before the session opens.
    if matches!(cli.command, Commands::Config) {
        return commands::config_show(&cfg, &store);
    }

    let today = chrono::Local::now().date_naive();
    let mut ctx = Ctx::open(store, today);

    match cli.command {
        Commands::Status { week, json } => commands::status(&mut ctx, week, json),
        Commands::Week { action } => commands::week(&mut ctx, action),
        Commands::Lecture { action } => commands::lecture(&mut ctx, action),
        Commands::Assignment { action } => commands::assignment(&mut ctx, action),
        Commands::Stats { json } => commands::stats_panel(&ctx, json),
        Commands::Badges => commands::badges_panel(&ctx),
        Commands::History { days } => {
            commands::history(&ctx, days.unwrap_or(cfg.display.history_days))
        }
        Commands::Export { out } => commands::export(&ctx, out),
        Commands::Import { file, yes } => commands::import(&mut ctx, file, yes),
        Commands::Config => unreachable!("handled before the session opens"),
    }
}
