//! CLI command implementations.
//!
//! Every command is registered in a [`zabbix_bulk::Registry`], so the same
//! handlers serve single commands from the command line and bulk files:
//! - [`cli_config`] - `show_zabbixcli_config` and `init`
//! - [`host`] - `show_host` and `create_host`
//! - [`hostgroup`] - `show_hostgroup` and `create_hostgroup`
//! - [`user`] - `create_user`
//! - [`event`] - `acknowledge_event`

pub mod cli_config;
pub mod event;
pub mod host;
pub mod hostgroup;
pub mod params;
pub mod user;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Value, json};
use tracing::debug;
use zabbix_bulk::{CommandHandler, CommandRegistry, InvokeError, Invocation, Kwargs, Registry};

use crate::client::ZabbixApi;
use crate::config::Config;
use crate::error::CliError;
use crate::output::Console;

pub use cli_config::{Init, ShowConfig};
pub use event::AcknowledgeEvent;
pub use host::{CreateHost, ShowHost};
pub use hostgroup::{CreateHostGroup, ShowHostGroup};
pub use params::Params;
pub use user::CreateUser;

/// State shared by all commands of one process.
pub struct CommandContext {
    api: Option<Arc<dyn ZabbixApi>>,
    config: Config,
    config_path: Option<PathBuf>,
    console: Console,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("has_api", &self.api.is_some())
            .field("config_path", &self.config_path)
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}

impl CommandContext {
    /// Create a context without an API client. Commands that need the API
    /// fail until one is attached with [`CommandContext::with_api`].
    #[must_use]
    pub fn new(config: Config, config_path: Option<PathBuf>, console: Console) -> Self {
        Self {
            api: None,
            config,
            config_path,
            console,
        }
    }

    /// Attach an API client.
    #[must_use]
    pub fn with_api(mut self, api: Arc<dyn ZabbixApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// The API client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no client is available.
    pub fn api(&self) -> Result<&dyn ZabbixApi, CliError> {
        match &self.api {
            Some(api) => Ok(api.as_ref()),
            None => {
                self.config.validate()?;
                Err(CliError::Config("API client is not configured".into()))
            }
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path the configuration was loaded from, if one was given.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// The output sink.
    #[must_use]
    pub fn console(&self) -> &Console {
        &self.console
    }
}

/// A built-in CLI command.
pub trait Builtin: Send + Sync {
    /// Name used on the command line and in bulk files.
    const NAME: &'static str;

    /// One-line usage shown for `--help`.
    const USAGE: &'static str;

    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns an error if arguments are invalid or the API call fails.
    fn run<'a>(&'a self, ctx: &'a CommandContext, params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>>;
}

/// Adapts a [`Builtin`] to the bulk registry.
struct Handler<C> {
    command: C,
    ctx: Arc<CommandContext>,
}

impl<C: Builtin> CommandHandler for Handler<C> {
    fn invoke<'a>(&'a self, args: &'a [String], kwargs: &'a Kwargs) -> BoxFuture<'a, Result<(), InvokeError>> {
        async move {
            let params = Params::new(C::NAME, args, kwargs);
            if params.wants_help() {
                let usage = format!("Usage: {} {}", C::NAME, C::USAGE);
                self.ctx.console.message(usage.trim_end())?;
                return Err(InvokeError::Exit { code: 0 });
            }
            self.command.run(&self.ctx, params).await?;
            Ok(())
        }
        .boxed()
    }
}

fn register<C: Builtin + 'static>(registry: &mut Registry, command: C, ctx: &Arc<CommandContext>) {
    registry.register(
        C::NAME,
        Handler {
            command,
            ctx: Arc::clone(ctx),
        },
    );
}

/// Build the registry of all built-in commands.
#[must_use]
pub fn build_registry(ctx: Arc<CommandContext>) -> Registry {
    let mut registry = Registry::new();
    register(&mut registry, ShowConfig, &ctx);
    register(&mut registry, Init, &ctx);
    register(&mut registry, ShowHost, &ctx);
    register(&mut registry, CreateHost, &ctx);
    register(&mut registry, ShowHostGroup, &ctx);
    register(&mut registry, CreateHostGroup, &ctx);
    register(&mut registry, CreateUser, &ctx);
    register(&mut registry, AcknowledgeEvent, &ctx);
    registry
}

/// Run a single command given on the command line.
///
/// A clean exit, such as after `--help`, counts as success.
///
/// # Errors
///
/// Returns an error if the command is unknown or fails.
pub async fn run_one<R>(registry: &R, invocation: &Invocation) -> Result<(), CliError>
where
    R: CommandRegistry + ?Sized,
{
    let handler = registry
        .lookup(&invocation.command)
        .ok_or_else(|| CliError::InvalidArgument(format!("unknown command: {}", invocation.command)))?;

    debug!(command = %invocation, "running command");
    match handler.invoke(&invocation.args, &invocation.kwargs).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_clean_exit() => Ok(()),
        Err(e) => Err(CliError::Command(e)),
    }
}

/// Returns true if `value` is a numeric object ID.
fn is_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Resolve names or IDs to object IDs.
///
/// Numeric values are used as they are. Names are looked up with
/// `<object>.get` filtered on `name_field`.
async fn resolve_ids(
    api: &dyn ZabbixApi,
    object: &str,
    id_field: &str,
    name_field: &str,
    values: &[String],
) -> Result<Vec<String>, CliError> {
    let mut ids = Vec::with_capacity(values.len());
    for value in values {
        if is_id(value) {
            ids.push(value.clone());
            continue;
        }
        let method = format!("{object}.get");
        let result = api
            .call(
                &method,
                json!({
                    "output": [id_field],
                    "filter": { name_field: value },
                }),
            )
            .await?;
        let id = first_id(&result, id_field).ok_or_else(|| CliError::NotFound(format!("{object} '{value}'")))?;
        ids.push(id);
    }
    Ok(ids)
}

/// ID field of the first object in a `.get` result.
fn first_id(result: &Value, id_field: &str) -> Option<String> {
    result
        .as_array()?
        .first()?
        .get(id_field)?
        .as_str()
        .map(str::to_string)
}

/// IDs listed under `key` in a `.create` result.
fn created_ids(result: &Value, key: &str) -> Result<Vec<String>, CliError> {
    let ids = result
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| CliError::Protocol(format!("response is missing '{key}'")))?;
    Ok(ids
        .iter()
        .map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}

/// String field of an API object, empty if absent.
fn field(object: &Value, name: &str) -> String {
    match object.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Fake API client for testing.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use parking_lot::Mutex;
    use serde_json::Value;

    use crate::client::ZabbixApi;
    use crate::error::CliError;

    /// Records calls and answers each method with a canned result.
    #[derive(Default)]
    pub struct FakeApi {
        responses: HashMap<String, Value>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn with_response(mut self, method: &str, result: Value) -> Self {
            self.responses.insert(method.to_string(), result);
            self
        }

        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().clone()
        }

        pub fn methods(&self) -> Vec<String> {
            self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    impl ZabbixApi for FakeApi {
        fn call<'a>(&'a self, method: &'a str, params: Value) -> BoxFuture<'a, Result<Value, CliError>> {
            async move {
                self.calls.lock().push((method.to_string(), params));
                self.responses.get(method).cloned().ok_or_else(|| CliError::Api {
                    code: -32602,
                    message: "Invalid params.".into(),
                    data: Some(format!("no response for {method}")),
                })
            }
            .boxed()
        }
    }
}
