//! Onboard CLI Application
//!
//! Command-line driver for the onboarding progression engine.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use onboard_core::{ProgressionStateMachine, SqliteStore};
use renderer::TerminalRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        principal,
        no_color,
        command,
    } = Args::parse();

    let store = SqliteStore::builder()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize progress store")?;

    info!("Onboarding store at {}", store.db_path().display());

    let machine = ProgressionStateMachine::new(principal, store);
    let renderer = TerminalRenderer::new(!no_color);

    Cli::new(machine, renderer)
        .await?
        .handle(command.unwrap_or(Commands::Status))
        .await
}
