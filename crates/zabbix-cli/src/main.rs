//! Zabbix-CLI binary entrypoint.
//!
//! This is the main entry point for the `zabbix-cli` command-line tool.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::{CommandFactory, Parser};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use zabbix_bulk::{BulkRunner, Invocation, Registry};

use zabbix_cli::cli::{Cli, Mode};
use zabbix_cli::commands::{CommandContext, build_registry, run_one};
use zabbix_cli::config::{Config, LoggingConfig};
use zabbix_cli::output::{BulkReport, Console, OutputFormat};
use zabbix_cli::{CliError, JsonRpcClient};

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    let (config, config_path) = match Config::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        // init creates the file --config points to
        Err(_) if cli.is_init() && cli.config.as_ref().is_some_and(|p| !p.exists()) => {
            (Config::default(), cli.config.clone())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    match &config_path {
        Some(path) => debug!(path = %path.display(), "using config file"),
        None => warn!("config file not found, using defaults"),
    }

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, config, config_path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing. `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), CliError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.log_level).map_err(|e| {
            CliError::Config(format!("invalid log level '{}': {e}", logging.log_level))
        })?,
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match logging.log_file.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

async fn run(cli: Cli, config: Config, config_path: Option<PathBuf>) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.output_format.unwrap_or(config.app.output_format));
    let console = Console::stdout(format);

    // Commands that do not talk to the API must work without a usable URL.
    let client = match JsonRpcClient::new(&config.api) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            debug!(error = %e, "API client not available");
            None
        }
    };

    let mut ctx = CommandContext::new(config, config_path, console.clone());
    if let Some(client) = &client {
        ctx = ctx.with_api(Arc::clone(client) as Arc<dyn zabbix_cli::ZabbixApi>);
    }
    let registry = build_registry(Arc::new(ctx));

    let result = dispatch(&cli, &registry, &console).await;

    if let Some(client) = client {
        if let Err(e) = client.logout().await {
            warn!(error = %e, "logout failed");
        }
    }
    result
}

async fn dispatch(cli: &Cli, registry: &Registry, console: &Console) -> Result<(), CliError> {
    match cli.mode() {
        Mode::Bulk(path) => {
            let mut runner = BulkRunner::new(registry);
            let summary = runner.run_file(path).await?;
            console.render(&BulkReport {
                file: path.clone(),
                summary,
            })
        }
        Mode::Line(line) => {
            warn!("--command is deprecated, pass the command and its arguments directly");
            let invocation =
                Invocation::from_line(line, 0).map_err(|e| CliError::InvalidArgument(e.to_string()))?;
            run_one(registry, &invocation).await
        }
        Mode::Args(args) => {
            let invocation = Invocation::from_tokens(args.iter().map(String::as_str))
                .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
            run_one(registry, &invocation).await
        }
        Mode::None => {
            Cli::command().print_help()?;
            Err(CliError::InvalidArgument("no command given".into()))
        }
    }
}
