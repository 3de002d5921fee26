//! Parsed command invocations.
//!
//! One line of a command file becomes one [`Invocation`]:
//!
//! ```text
//! create_host web01 --hostgroup Linux --status 0
//! └────┬────┘ └─┬─┘ └──────────────┬────────────┘
//!   command    args              kwargs
//! ```
//!
//! Keyword options must be written in long form (`--name`). A keyword takes
//! the token right after it as its value; with no value it is a boolean flag,
//! `true` by default or `false` when the name starts with `no-`.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::LineParseError;
use crate::lexer::split_words;

/// Prefix that marks a negated boolean flag.
const NEGATED_PREFIX: &str = "no-";

/// Value of a keyword argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum KwargValue {
    /// Explicit value following the option.
    Str(String),
    /// Flag without a value.
    Bool(bool),
    /// No value.
    Null,
}

impl KwargValue {
    /// Borrow the string value, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) | Self::Null => None,
        }
    }

    /// Get the boolean value, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(_) | Self::Null => None,
        }
    }
}

impl From<&str> for KwargValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for KwargValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for KwargValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for KwargValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
        }
    }
}

/// Keyword arguments with unique keys, kept in insertion order.
///
/// Re-inserting a key replaces its value and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Kwargs(IndexMap<String, KwargValue>);

impl Kwargs {
    /// Create an empty set of keyword arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<KwargValue>) -> Option<KwargValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KwargValue> {
        self.0.get(key)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KwargValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Kwargs
where
    K: Into<String>,
    V: Into<KwargValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A single command parsed from one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Name of the command to run.
    pub command: String,
    /// Positional arguments, in order.
    pub args: Vec<String>,
    /// Keyword arguments.
    pub kwargs: Kwargs,
    /// Source line, stripped. Empty when not parsed from text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub line: String,
    /// 1-based line number in the command file. Zero when not from a file.
    pub line_number: usize,
}

/// Parser state between tokens.
#[derive(Debug)]
enum Pending {
    /// Next plain token is positional.
    Positional,
    /// Next plain token is the value of this keyword.
    Value(String),
}

impl Invocation {
    /// Parse a line of text.
    ///
    /// # Errors
    ///
    /// Returns [`LineParseError::EmptyLine`] or [`LineParseError::CommentLine`]
    /// for lines that carry no command, and [`LineParseError::Syntax`] for
    /// malformed lines.
    pub fn from_line(line: &str, line_number: usize) -> Result<Self, LineParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(LineParseError::EmptyLine);
        }
        if line.starts_with('#') {
            return Err(LineParseError::CommentLine);
        }

        let tokens = split_words(line)?;
        let mut invocation = Self::from_tokens(tokens)?;
        invocation.line = line.to_string();
        invocation.line_number = line_number;
        Ok(invocation)
    }

    /// Build an invocation from already split tokens. The first token is the
    /// command name.
    ///
    /// # Errors
    ///
    /// Returns [`LineParseError::Syntax`] if there are no tokens, the command
    /// name is empty, or an option token is malformed.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, LineParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::into);
        let command = tokens
            .next()
            .ok_or_else(|| LineParseError::syntax("no command specified"))?;
        if command.is_empty() || command.starts_with('#') {
            return Err(LineParseError::syntax(format!(
                "invalid command name: '{command}'"
            )));
        }

        let mut args = Vec::new();
        let mut kwargs = Kwargs::new();
        let mut pending = Pending::Positional;

        for token in tokens {
            if let Some(name) = option_name(&token)? {
                let default = !name.starts_with(NEGATED_PREFIX);
                kwargs.insert(name, default);
                pending = Pending::Value(name.to_string());
                continue;
            }
            match std::mem::replace(&mut pending, Pending::Positional) {
                Pending::Value(key) => {
                    kwargs.insert(key, token);
                }
                Pending::Positional => args.push(token),
            }
        }

        Ok(Self {
            command,
            args,
            kwargs,
            line: String::new(),
            line_number: 0,
        })
    }
}

/// Classify a token as a keyword option.
///
/// Returns the option name with its dashes stripped, or `None` for a plain
/// token. Anything starting with `-` is an option, which includes negative
/// numbers: `-1` is rejected as a short option.
fn option_name(token: &str) -> Result<Option<&str>, LineParseError> {
    if !token.starts_with('-') {
        return Ok(None);
    }
    let name = token.trim_start_matches('-');
    match name.chars().count() {
        0 => Err(LineParseError::syntax(format!("invalid option: '{token}'"))),
        1 => Err(LineParseError::syntax(format!(
            "short options are not supported: '{token}'"
        ))),
        _ => Ok(Some(name)),
    }
}

/// Parse one line into an [`Invocation`] with no line number attached.
///
/// # Errors
///
/// See [`Invocation::from_line`].
pub fn parse_line(line: &str) -> Result<Invocation, LineParseError> {
    Invocation::from_line(line, 0)
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.line.is_empty() {
            return f.write_str(&self.line);
        }
        f.write_str(&self.command)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        for (key, value) in self.kwargs.iter() {
            match value {
                KwargValue::Bool(_) | KwargValue::Null => write!(f, " --{key}")?,
                KwargValue::Str(s) => write!(f, " --{key} {s}")?,
            }
        }
        Ok(())
    }
}
