//! Commands that work on the CLI configuration itself.
//!
//! Neither command talks to the API.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::info;

use super::{Builtin, CommandContext, Params};
use crate::config::{Config, default_config_path};
use crate::error::CliError;
use crate::output::ConfigView;

/// `show_zabbixcli_config`: print the active configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowConfig;

impl Builtin for ShowConfig {
    const NAME: &'static str = "show_zabbixcli_config";
    const USAGE: &'static str = "";

    fn run<'a>(&'a self, ctx: &'a CommandContext, params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>> {
        async move {
            params.finish()?;
            ctx.console().render(&ConfigView {
                path: ctx.config_path().map(std::path::Path::to_path_buf),
                config: ctx.config().redacted(),
            })
        }
        .boxed()
    }
}

/// `init`: write a new configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Init;

impl Builtin for Init {
    const NAME: &'static str = "init";
    const USAGE: &'static str = "[--url URL] [--username USERNAME] [--overwrite]";

    fn run<'a>(&'a self, ctx: &'a CommandContext, mut params: Params<'a>) -> BoxFuture<'a, Result<(), CliError>> {
        async move {
            let url = params.optional("url")?;
            let username = params.optional("username")?;
            let overwrite = params.flag("overwrite")?.unwrap_or(false);
            params.finish()?;

            let path = match ctx.config_path() {
                Some(path) => path.to_path_buf(),
                None => default_config_path()
                    .ok_or_else(|| CliError::Config("no config directory available".into()))?,
            };

            let mut config = Config::default();
            if let Some(url) = url {
                config.api.url = url;
            }
            if let Some(username) = username {
                config.api.username = username;
            }
            config.write_to(&path, overwrite)?;

            info!(path = %path.display(), "configuration file created");
            ctx.console()
                .message(format!("Configuration file created: {}", path.display()))
        }
        .boxed()
    }
}
