//! # zabbix-bulk
//!
//! Bulk command files for `zabbix-cli`.
//!
//! A command file holds one CLI command per line, written like a shell
//! command. Blank lines and `#` comments are ignored:
//!
//! ```text
//! # legacy positional arguments
//! create_host web01.example.net Linux-servers 0
//!
//! # keyword arguments
//! create_host web02.example.net --hostgroup Linux-servers --status 0
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  Vec<Invocation>  ┌────────────┐  lookup   ┌──────────┐
//! │ CommandFile │──────────────────►│ BulkRunner │──────────►│ Registry │
//! └─────────────┘                   └────────────┘           └──────────┘
//! ```
//!
//! The whole file is parsed before anything runs, so a syntax error on any
//! line means no command executes. The runner then executes commands one at
//! a time and stops at the first failure.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod lexer;
pub mod loader;
pub mod registry;
pub mod runner;

pub use command::{Invocation, KwargValue, Kwargs, parse_line};
pub use error::{CommandFileError, InvokeError, LineParseError};
pub use loader::{CommandFile, load_command_file};
pub use registry::{CommandHandler, CommandRegistry, FnHandler, Registry, handler_fn};
pub use runner::{BulkRunner, CommandExecution, CommandResult, RunState, RunSummary, run_bulk};
