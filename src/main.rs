//! Sound Archive CLI
//!
//! Command-line interface for the personal audio archive.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sound_archive::cli::{commands, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Sound Archive v{}", env!("CARGO_PKG_VERSION"));

    let commander = commands::open_commander(&cli.archive)
        .with_context(|| format!("failed to open archive at {}", cli.archive.display()))?;

    if let Err(err) = commands::run(&commander, cli.command) {
        if let Some(hint) = err.recovery_suggestion() {
            eprintln!("hint: {}", hint);
        }
        let code = err.error_code();
        return Err(err).context(code);
    }

    Ok(())
}
