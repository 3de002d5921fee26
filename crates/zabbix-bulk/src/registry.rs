//! Command registry consumed by the bulk runner.

use std::collections::HashMap;
use std::fmt;

use futures::future::{self, BoxFuture};

use crate::command::Kwargs;
use crate::error::InvokeError;

/// A command that can be invoked from a command file.
pub trait CommandHandler: Send + Sync {
    /// Run the command with positional and keyword arguments.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Exit`] for intentional early exits and any other
    /// variant on failure.
    fn invoke<'a>(&'a self, args: &'a [String], kwargs: &'a Kwargs) -> BoxFuture<'a, Result<(), InvokeError>>;
}

/// Lookup of command handlers by name.
pub trait CommandRegistry {
    /// Find the handler registered under `name`.
    fn lookup(&self, name: &str) -> Option<&dyn CommandHandler>;
}

/// Handler backed by a synchronous closure.
pub struct FnHandler<F> {
    f: F,
}

impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&[String], &Kwargs) -> Result<(), InvokeError> + Send + Sync,
{
    fn invoke<'a>(&'a self, args: &'a [String], kwargs: &'a Kwargs) -> BoxFuture<'a, Result<(), InvokeError>> {
        Box::pin(future::ready((self.f)(args, kwargs)))
    }
}

/// Wrap a synchronous closure as a [`CommandHandler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&[String], &Kwargs) -> Result<(), InvokeError> + Send + Sync,
{
    FnHandler { f }
}

/// Registry backed by a map from command name to handler.
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<String, Box<dyn CommandHandler>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any handler with the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) -> &mut Self {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns true if a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl CommandRegistry for Registry {
    fn lookup(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers.get(name).map(|handler| &**handler)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.names())
            .finish()
    }
}
