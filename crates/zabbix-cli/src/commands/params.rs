//! Binding of positional and keyword arguments to named parameters.
//!
//! Commands accept both the legacy positional form and keyword options:
//!
//! ```text
//! create_host web01 Linux-servers .+ 0
//! create_host web01 --hostgroup Linux-servers --status 0
//! ```
//!
//! Parameters are requested in their legacy positional order. Each one is
//! taken from its keyword option when present, otherwise from the next unused
//! positional argument.

use zabbix_bulk::{KwargValue, Kwargs};

use crate::error::CliError;

/// Keyword that asks a command for its usage.
pub const HELP: &str = "help";

/// Arguments of one command invocation.
#[derive(Debug)]
pub struct Params<'a> {
    command: &'static str,
    args: &'a [String],
    next: usize,
    kwargs: &'a Kwargs,
    used: Vec<String>,
}

impl<'a> Params<'a> {
    /// Wrap the arguments of an invocation.
    #[must_use]
    pub fn new(command: &'static str, args: &'a [String], kwargs: &'a Kwargs) -> Self {
        Self {
            command,
            args,
            next: 0,
            kwargs,
            used: Vec::new(),
        }
    }

    /// Returns true if `--help` was given.
    #[must_use]
    pub fn wants_help(&self) -> bool {
        self.kwargs.contains_key(HELP)
    }

    /// Take a parameter that must be present.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is missing or given as a flag.
    pub fn required(&mut self, name: &str) -> Result<String, CliError> {
        self.optional(name)?.ok_or_else(|| {
            CliError::InvalidArgument(format!("{}: missing argument '{name}'", self.command))
        })
    }

    /// Take an optional parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyword is given without a value.
    pub fn optional(&mut self, name: &str) -> Result<Option<String>, CliError> {
        if let Some(value) = self.keyword(name) {
            return match value {
                KwargValue::Str(s) => Ok(Some(s.clone())),
                KwargValue::Null => Ok(None),
                KwargValue::Bool(_) => Err(CliError::InvalidArgument(format!(
                    "{}: option --{name} requires a value",
                    self.command
                ))),
            };
        }
        Ok(self.positional().map(str::to_string))
    }

    /// Take a boolean parameter, given as `--name`, `--no-name`, an explicit
    /// value, or a positional value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a recognised boolean.
    pub fn flag(&mut self, name: &str) -> Result<Option<bool>, CliError> {
        if let Some(value) = self.keyword(name) {
            return match value {
                KwargValue::Bool(b) => Ok(Some(*b)),
                KwargValue::Str(s) => parse_bool(self.command, name, s).map(Some),
                KwargValue::Null => Ok(None),
            };
        }
        let negated = format!("no-{name}");
        if let Some(value) = self.keyword(&negated) {
            return match value {
                // `--no-name` alone is stored as false, meaning "name is off".
                KwargValue::Bool(b) => Ok(Some(*b)),
                KwargValue::Str(s) => parse_bool(self.command, &negated, s).map(|b| Some(!b)),
                KwargValue::Null => Ok(None),
            };
        }
        match self.positional() {
            Some(value) => parse_bool(self.command, name, value).map(Some),
            None => Ok(None),
        }
    }

    /// Check that every argument was consumed.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unexpected option or argument.
    pub fn finish(self) -> Result<(), CliError> {
        if let Some(key) = self.kwargs.keys().find(|k| !self.used.iter().any(|u| u == k)) {
            return Err(CliError::InvalidArgument(format!(
                "{}: no such option: --{key}",
                self.command
            )));
        }
        if let Some(extra) = self.args.get(self.next) {
            return Err(CliError::InvalidArgument(format!(
                "{}: unexpected extra argument '{extra}'",
                self.command
            )));
        }
        Ok(())
    }

    fn keyword(&mut self, name: &str) -> Option<&'a KwargValue> {
        let kwargs = self.kwargs;
        let value = kwargs.get(name)?;
        self.used.push(name.to_string());
        Some(value)
    }

    fn positional(&mut self) -> Option<&'a str> {
        let args = self.args;
        let value = args.get(self.next)?;
        self.next += 1;
        Some(value.as_str())
    }
}

/// Parse a boolean option value.
fn parse_bool(command: &str, name: &str, value: &str) -> Result<bool, CliError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CliError::InvalidArgument(format!(
            "{command}: invalid boolean value for {name}: '{value}'"
        ))),
    }
}

/// Split a comma-separated list, dropping empty items.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
