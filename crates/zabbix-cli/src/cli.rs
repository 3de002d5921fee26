//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Zabbix-CLI - command-line interface for the Zabbix API.
///
/// Runs a single command given on the command line, a single command string
/// with `--command`, or every command in a file with `--input-file`.
#[derive(Parser, Debug, Clone)]
#[command(name = "zabbix-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Alternative configuration file.
    #[arg(short, long, env = "ZABBIX_CLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format. Overrides the configuration file.
    #[arg(short, long, value_enum)]
    pub output_format: Option<Format>,

    /// File with commands to execute in bulk mode.
    #[arg(short = 'f', long, conflicts_with_all = ["command", "args"])]
    pub input_file: Option<PathBuf>,

    /// Command to execute, as a single string.
    #[arg(short = 'C', long, conflicts_with = "args")]
    pub command: Option<String>,

    /// Command to execute, followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub args: Vec<String>,
}

impl Cli {
    /// The execution mode selected by the arguments.
    #[must_use]
    pub fn mode(&self) -> Mode<'_> {
        if let Some(path) = &self.input_file {
            Mode::Bulk(path)
        } else if let Some(line) = &self.command {
            Mode::Line(line)
        } else if !self.args.is_empty() {
            Mode::Args(&self.args)
        } else {
            Mode::None
        }
    }

    /// Returns true if the command to run is `init`, which may create the
    /// configuration file instead of reading it.
    #[must_use]
    pub fn is_init(&self) -> bool {
        let command = match self.mode() {
            Mode::Line(line) => line.split_whitespace().next(),
            Mode::Args(args) => args.first().map(String::as_str),
            Mode::Bulk(_) | Mode::None => None,
        };
        command == Some("init")
    }
}

/// How the CLI was asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    /// Run every command in a file.
    Bulk(&'a PathBuf),
    /// Parse and run one command string.
    Line(&'a str),
    /// Run one command from argv tokens.
    Args(&'a [String]),
    /// Nothing to run.
    None,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}
