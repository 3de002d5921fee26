//! Error types for bulk command files.

use std::path::PathBuf;

use thiserror::Error;

use crate::runner::RunState;

/// Errors raised while parsing a single line of a command file.
///
/// [`EmptyLine`](Self::EmptyLine) and [`CommentLine`](Self::CommentLine) are
/// control flow only: callers skip those lines without reporting them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineParseError {
    /// Line is empty or whitespace only.
    #[error("cannot parse empty line")]
    EmptyLine,

    /// Line is a whole-line comment.
    #[error("cannot parse comment line")]
    CommentLine,

    /// Line is malformed.
    #[error("{message}")]
    Syntax {
        /// Description of what is wrong with the line.
        message: String,
    },
}

impl LineParseError {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Returns true if the line should be skipped silently.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(self, Self::EmptyLine | Self::CommentLine)
    }
}

/// Error returned by a command handler.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The command terminated itself on purpose, e.g. after printing usage.
    #[error("command exited with code {code}")]
    Exit {
        /// Exit code. Zero means the exit was not a failure.
        code: i32,
    },

    /// The command failed.
    #[error("{0}")]
    Failed(String),

    /// The command failed with an underlying error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl InvokeError {
    /// Create a failure from a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Returns true for an intentional exit with code zero.
    #[must_use]
    pub const fn is_clean_exit(&self) -> bool {
        matches!(self, Self::Exit { code: 0 })
    }
}

/// Errors surfaced by loading or running a bulk command file.
#[derive(Debug, Error)]
pub enum CommandFileError {
    /// The command file does not exist.
    #[error("command file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The path exists but is not a regular file.
    #[error("command file is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// The command file could not be read.
    #[error("could not read command file {}: {source}", path.display())]
    Read {
        /// Path of the command file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed.
    #[error("unable to parse line {line_number} '{line}': {source}")]
    Line {
        /// 1-based line number.
        line_number: usize,
        /// Literal content of the line.
        line: String,
        /// Parser error.
        #[source]
        source: LineParseError,
    },

    /// No command with this name is registered.
    #[error("command not found: {command} (line {line_number})")]
    CommandNotFound {
        /// Command name from the file.
        command: String,
        /// 1-based line number.
        line_number: usize,
    },

    /// A command returned an error.
    #[error("command failed on line {line_number}: {command}: {source}")]
    CommandFailed {
        /// The command as written in the file.
        command: String,
        /// 1-based line number.
        line_number: usize,
        /// Error returned by the command.
        #[source]
        source: InvokeError,
    },

    /// The runner already finished a run. A runner executes one file.
    #[error("bulk run already finished ({state:?})")]
    RunFinished {
        /// Final state of the earlier run.
        state: RunState,
    },
}

impl CommandFileError {
    /// Line number the error is attributed to, if any.
    #[must_use]
    pub const fn line_number(&self) -> Option<usize> {
        match self {
            Self::Line { line_number, .. }
            | Self::CommandNotFound { line_number, .. }
            | Self::CommandFailed { line_number, .. } => Some(*line_number),
            Self::FileNotFound(_) | Self::NotAFile(_) | Self::Read { .. } | Self::RunFinished { .. } => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skippable_kinds() {
        assert!(LineParseError::EmptyLine.is_skippable());
        assert!(LineParseError::CommentLine.is_skippable());
        assert!(!LineParseError::syntax("bad").is_skippable());
    }

    #[test]
    fn clean_exit_only_for_code_zero() {
        assert!(InvokeError::Exit { code: 0 }.is_clean_exit());
        assert!(!InvokeError::Exit { code: 1 }.is_clean_exit());
        assert!(!InvokeError::failed("boom").is_clean_exit());
    }

    #[test]
    fn line_error_display_includes_number_and_content() {
        let err = CommandFileError::Line {
            line_number: 5,
            line: "cmd -x".into(),
            source: LineParseError::syntax("short options are not supported: -x"),
        };
        let msg = err.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains("cmd -x"));
        assert!(msg.contains("short options are not supported"));
        assert_eq!(err.line_number(), Some(5));
    }

    #[test]
    fn file_errors_have_no_line_number() {
        let err = CommandFileError::FileNotFound(PathBuf::from("/tmp/missing.txt"));
        assert_eq!(err.to_string(), "command file not found: /tmp/missing.txt");
        assert_eq!(err.line_number(), None);
    }

    #[test]
    fn command_failed_display() {
        let err = CommandFileError::CommandFailed {
            command: "exits_error".into(),
            line_number: 4,
            source: InvokeError::Exit { code: 1 },
        };
        assert_eq!(
            err.to_string(),
            "command failed on line 4: exits_error: command exited with code 1"
        );
    }
}
