//! Command-line interface handling for `local-notify`.
//!
//! Parsing uses the `clap` builder API. Global flags override settings from
//! the configuration file; the subcommand selects what to run.

use clap::{Arg, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// What the tool should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Normalize options from a JSON file and print the resulting bridge calls
    Normalize { input: PathBuf },
    /// Replay newline-delimited native events through the event router
    Replay { input: PathBuf },
}

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the target platform
    pub platform: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    pub command: CliCommand,
}

impl CliArgs {
    /// Parses the process arguments.
    ///
    /// # Returns
    ///
    /// The parsed arguments. On invalid input clap prints usage and exits the process.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let command = match matches.subcommand() {
            Some(("replay", sub)) => CliCommand::Replay {
                input: input_path(sub),
            },
            _ => CliCommand::Normalize {
                input: matches
                    .subcommand_matches("normalize")
                    .map(input_path)
                    .unwrap_or_default(),
            },
        };

        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("notify.toml")),
            platform: matches.get_one::<String>("platform").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            command,
        }
    }
}

fn input_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .unwrap_or_default()
}

fn input_arg(help: &'static str) -> Arg {
    Arg::new("input").value_name("FILE").help(help).required(true)
}

fn command() -> Command {
    Command::new("local-notify")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect how local notification options and native events are processed")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("notify.toml")
                .global(true),
        )
        .arg(
            Arg::new("platform")
                .short('p')
                .long("platform")
                .value_name("PLATFORM")
                .help("Target platform (android, ios, windows, other)")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .global(true),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("normalize")
                .about("Schedule options from a JSON file and print the bridge calls")
                .arg(input_arg("JSON object or array of notification options")),
        )
        .subcommand(
            Command::new("replay")
                .about("Replay native events from a newline-delimited JSON file")
                .arg(input_arg("One {\"event\": ..., \"args\": [...]} object per line")),
        )
}
