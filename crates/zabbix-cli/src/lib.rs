//! # zabbix-cli
//!
//! Command-line interface for the Zabbix JSON-RPC API.
//!
//! Commands can be run one at a time from the command line, or in bulk from
//! a command file with `--input-file`. Both paths dispatch through the same
//! [`zabbix_bulk::Registry`] built by [`commands::build_registry`].
//!
//! ```text
//! ┌────────────┐  Invocation  ┌──────────┐  JSON-RPC  ┌───────────────┐
//! │ zabbix-cli │─────────────►│ Registry │───────────►│ api_jsonrpc   │
//! └────────────┘              └──────────┘  (HTTPS)   └───────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Format, Mode};
pub use client::{JsonRpcClient, ZabbixApi};
pub use commands::{CommandContext, build_registry};
pub use config::Config;
pub use error::CliError;
pub use output::{Console, OutputFormat};
