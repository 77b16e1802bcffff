//! # local-notify
//!
//! Command-line companion for the `local_notification` client. It runs the
//! client against a recording bridge to show what reaches the native side.
//!
//! ## Quick Start
//!
//! ```bash
//! # Normalize options and print the resulting bridge calls
//! local-notify normalize options.json
//!
//! # Same, as seen by an iOS client
//! local-notify --platform ios normalize options.json
//!
//! # Replay recorded native events through the event router
//! local-notify --log-level debug replay events.ndjson
//! ```
//!
//! ## Configuration
//!
//! Settings are read from a TOML file (default: `notify.toml`). A missing
//! file means built-in defaults:
//!
//! ```toml
//! [notification]
//! platform = "android"
//!
//! [notification.defaults]
//! sound = "res://bell"
//!
//! [logging]
//! level = "info"
//! json_format = false
//! ```

mod app;
mod cli;
mod config;
mod logging;

use anyhow::anyhow;

pub use app::Application;
pub use cli::{CliArgs, CliCommand};
pub use config::{AppConfig, LoggingSettings};

/// Entry point for the `local-notify` binary.
///
/// Parses arguments, loads configuration, sets up logging and runs the
/// selected command, printing its JSON report to stdout.
pub async fn init() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut config = AppConfig::load_from_file(&args.config_path).await?;
    config.apply_cli_overrides(&args)?;

    logging::setup_logging(&config.logging, args.json_logs)
        .map_err(|e| anyhow!("Failed to setup logging: {e}"))?;

    let report = Application::new(config)?.run(&args.command).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
