//! Sequential, fail-fast execution of parsed commands.
//!
//! Commands run strictly in file order. A later line may depend on the side
//! effects of an earlier one, so the first failure aborts the run and no
//! further lines execute. An intentional exit with code zero (for example a
//! command printing its usage) is not a failure and the run continues.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::command::Invocation;
use crate::error::CommandFileError;
use crate::loader::CommandFile;
use crate::registry::CommandRegistry;

/// Lifecycle of a bulk run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing has run yet.
    NotStarted,
    /// Commands are executing.
    Running,
    /// Every command succeeded or exited cleanly.
    Completed,
    /// A command failed; the run stopped.
    Aborted,
}

impl RunState {
    /// Returns true once the run has finished, successfully or not.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// Outcome of one executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandResult {
    /// The command completed, or exited with code zero.
    Success,
    /// The command was not found or returned an error.
    Failure,
}

/// Record of one executed command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandExecution {
    /// The command as parsed.
    pub command: Invocation,
    /// Outcome.
    pub result: CommandResult,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Commands executed.
    pub total: usize,
    /// Commands that succeeded.
    pub succeeded: usize,
    /// Commands that failed.
    pub failed: usize,
    /// Blank and comment lines skipped while loading.
    pub skipped: usize,
}

/// Runs parsed commands against a registry.
pub struct BulkRunner<'r, R: CommandRegistry + ?Sized> {
    registry: &'r R,
    state: RunState,
    executions: Vec<CommandExecution>,
    skipped: usize,
}

impl<'r, R: CommandRegistry + ?Sized> BulkRunner<'r, R> {
    /// Create a runner over a registry.
    pub fn new(registry: &'r R) -> Self {
        Self {
            registry,
            state: RunState::NotStarted,
            executions: Vec::new(),
            skipped: 0,
        }
    }

    /// Current state of the run.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Commands executed so far, in order.
    #[must_use]
    pub fn executions(&self) -> &[CommandExecution] {
        &self.executions
    }

    /// Summary of the executions recorded so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let succeeded = self
            .executions
            .iter()
            .filter(|e| e.result == CommandResult::Success)
            .count();
        RunSummary {
            total: self.executions.len(),
            succeeded,
            failed: self.executions.len() - succeeded,
            skipped: self.skipped,
        }
    }

    /// Load a command file and run it.
    ///
    /// Nothing executes if the file cannot be loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CommandFileError::RunFinished`] if this runner already ran,
    /// the load error, or the first command error.
    pub async fn run_file(&mut self, path: impl AsRef<Path>) -> Result<RunSummary, CommandFileError> {
        self.ensure_not_finished()?;
        let file = CommandFile::load(path)?;
        self.skipped += file.skipped().len();
        self.run(file.into_commands()).await
    }

    /// Run commands in order, stopping at the first failure.
    ///
    /// `Completed` and `Aborted` are terminal: a runner runs once.
    ///
    /// # Errors
    ///
    /// Returns [`CommandFileError::RunFinished`] if this runner already ran,
    /// [`CommandFileError::CommandNotFound`] for an unknown command and
    /// [`CommandFileError::CommandFailed`] when a command returns an error
    /// other than a clean exit.
    pub async fn run(&mut self, commands: Vec<Invocation>) -> Result<RunSummary, CommandFileError> {
        self.ensure_not_finished()?;
        self.state = RunState::Running;

        for command in commands {
            if let Err(e) = self.execute(command).await {
                self.state = RunState::Aborted;
                error!(error = %e, "bulk execution aborted");
                return Err(e);
            }
        }

        self.state = RunState::Completed;
        let summary = self.summary();
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "bulk execution complete"
        );
        Ok(summary)
    }

    fn ensure_not_finished(&self) -> Result<(), CommandFileError> {
        if self.state.is_finished() {
            debug!(state = ?self.state, "refusing to reuse a finished runner");
            return Err(CommandFileError::RunFinished { state: self.state });
        }
        Ok(())
    }

    async fn execute(&mut self, command: Invocation) -> Result<(), CommandFileError> {
        let line_number = command.line_number;

        let registry = self.registry;
        let Some(handler) = registry.lookup(&command.command) else {
            let err = CommandFileError::CommandNotFound {
                command: command.command.clone(),
                line_number,
            };
            self.record(command, CommandResult::Failure, Some(err.to_string()));
            return Err(err);
        };

        debug!(line_number, command = %command, "running command");
        let outcome = handler.invoke(&command.args, &command.kwargs).await;
        match outcome {
            Ok(()) => {
                info!(line_number, command = %command, "command succeeded");
                self.record(command, CommandResult::Success, None);
                Ok(())
            }
            Err(e) if e.is_clean_exit() => {
                info!(line_number, command = %command, "command exited cleanly");
                self.record(command, CommandResult::Success, None);
                Ok(())
            }
            Err(source) => {
                let message = source.to_string();
                let err = CommandFileError::CommandFailed {
                    command: command.to_string(),
                    line_number,
                    source,
                };
                self.record(command, CommandResult::Failure, Some(message));
                Err(err)
            }
        }
    }

    fn record(&mut self, command: Invocation, result: CommandResult, error: Option<String>) {
        self.executions.push(CommandExecution {
            command,
            result,
            error,
        });
    }
}

/// Load a command file and run it against a registry.
///
/// # Errors
///
/// See [`BulkRunner::run_file`].
pub async fn run_bulk<R>(registry: &R, path: impl AsRef<Path>) -> Result<RunSummary, CommandFileError>
where
    R: CommandRegistry + ?Sized,
{
    BulkRunner::new(registry).run_file(path).await
}
