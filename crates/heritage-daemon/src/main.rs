//! Artifact heritage command-line tool
//!
//! # Usage
//!
//! ```bash
//! heritage record --text "a paper tide" --tag ocean
//! heritage index [--model nomic-embed-text]
//! heritage search "ocean" [--top-k 3] [--models a,b --weight b=2]
//! heritage staging process [--force-fallback]
//! heritage run [--interval-ms 60000]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/artifact-heritage/config.toml)
//! 3. Environment variables (HERITAGE__*, then MEMORY_DIR, OLLAMA_BASE_URL, ...)
//! 4. CLI flags

use anyhow::{Context, Result};
use clap::Parser;

use heritage_daemon::{init_logging, load_settings, App, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    init_logging(&settings)?;

    // Only `run` hosts the daemon; one-shot commands exit before a first tick.
    let app = App::new(settings)?;

    let output = app.execute(cli.command).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render output")?
    );

    Ok(())
}
