//! Binary crate for the `weatherly` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting
//! - The animated full-screen `watch` view

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;

mod cli;
mod draw;
mod render;
mod tui;

const LOG_FILE: &str = "weatherly.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = cli::Cli::parse();

    if cmd.is_watch() {
        let dir = weatherly_core::Preferences::data_dir()?;
        init_file_logging(&dir)?;
    } else {
        init_stderr_logging();
    }

    cmd.run().await
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The watch view owns the terminal, so logs go to a file instead.
fn init_file_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
