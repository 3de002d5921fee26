//! Loading command files from disk.

use std::path::Path;

use tracing::debug;

use crate::command::Invocation;
use crate::error::CommandFileError;

/// Commands parsed from a command file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandFile {
    commands: Vec<Invocation>,
    skipped: Vec<usize>,
}

impl CommandFile {
    /// Read and parse a command file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is missing, is not a regular file, cannot
    /// be read, or contains a malformed line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommandFileError> {
        let path = path.as_ref();
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CommandFileError::FileNotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(CommandFileError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        if !metadata.is_file() {
            return Err(CommandFileError::NotAFile(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| CommandFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), bytes = contents.len(), "read command file");
        Self::parse(&contents)
    }

    /// Parse the contents of a command file.
    ///
    /// Blank lines and comment lines are skipped. The first malformed line
    /// aborts parsing.
    ///
    /// # Errors
    ///
    /// Returns [`CommandFileError::Line`] for the first malformed line.
    pub fn parse(contents: &str) -> Result<Self, CommandFileError> {
        let mut file = Self::default();

        for (index, line) in contents.lines().enumerate() {
            let line_number = index + 1;
            match Invocation::from_line(line, line_number) {
                Ok(command) => file.commands.push(command),
                Err(e) if e.is_skippable() => {
                    debug!(line_number, line, "skipping line");
                    file.skipped.push(line_number);
                }
                Err(source) => {
                    return Err(CommandFileError::Line {
                        line_number,
                        line: line.to_string(),
                        source,
                    });
                }
            }
        }

        Ok(file)
    }

    /// Parsed commands.
    #[must_use]
    pub fn commands(&self) -> &[Invocation] {
        &self.commands
    }

    /// Line numbers of blank and comment lines.
    #[must_use]
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    /// Number of parsed commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if the file holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Consume the file, returning its commands.
    #[must_use]
    pub fn into_commands(self) -> Vec<Invocation> {
        self.commands
    }
}

/// Read a command file and return its commands in file order.
///
/// # Errors
///
/// See [`CommandFile::load`].
pub fn load_command_file(path: impl AsRef<Path>) -> Result<Vec<Invocation>, CommandFileError> {
    CommandFile::load(path).map(CommandFile::into_commands)
}
