mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use daybook::config::Settings;
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let mut settings = Settings::load(&config_path)
        .with_context(|| format!("loading settings from {}", config_path.display()))?;
    if let Some(data) = args.data {
        settings.data_file = Some(data);
    }
    init_logging(&settings);

    let mut session = commands::Session::open(&settings)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.command {
        cli::Command::Shell => session.shell(io::stdin().lock(), &mut out),
        command => session.run(command, &mut out),
    }
}

/// `DAYBOOK_LOG` takes precedence over the configured level.
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_env("DAYBOOK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
