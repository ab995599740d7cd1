use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use crate::discovery::{DiscoveryResult, ModuleDescriptor};
use crate::host::{HttpConfiguration, WebApi};
use crate::manifest::{load_manifest, Manifest};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for the web API pack
///
/// Runs controller discovery and API configuration against a module manifest
/// instead of a live script host.
#[derive(Parser)]
#[command(name = "webapi-pack")]
#[command(about = "Web API script pack tools", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command reports
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List the controllers discovery finds in a manifest
    Discover {
        /// Path to the module manifest (YAML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Also scan this module (name or identifier), bypassing module filtering
        #[arg(long = "module", value_name = "MODULE")]
        modules: Vec<String>,

        /// Capability tag that marks controllers
        #[arg(long)]
        capability: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the route table and formatters the API would start with
    Routes {
        /// Path to the module manifest (YAML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Also scan this module (name or identifier), bypassing module filtering
        #[arg(long = "module", value_name = "MODULE")]
        modules: Vec<String>,

        /// Keep only the JSON formatter
        #[arg(long, default_value_t = false)]
        json_only: bool,
    },
}

/// Run a parsed command, writing its report to stdout.
///
/// # Errors
///
/// Fails when the manifest cannot be loaded, a named module is unknown, or
/// the API cannot be configured.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_output(cli, RuntimeConfig::from_env(), &mut out)
}

/// Run a parsed command against `config`, writing its report to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn run_with_output(cli: Cli, mut config: RuntimeConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    match cli.command {
        Commands::Discover {
            manifest,
            modules,
            capability,
            format,
        } => {
            if let Some(capability) = capability {
                config.handler_capability = capability;
            }
            let (manifest, api) = load(&manifest, &config)?;
            let explicit = named_modules(&manifest, &modules)?;
            let result = if explicit.is_empty() {
                api.discovery().discover_all()
            } else {
                api.discovery().discover_from(&explicit)
            };
            write_discovery(out, &result, format)
        }
        Commands::Routes {
            manifest,
            modules,
            json_only,
        } => {
            let (manifest, mut api) = load(&manifest, &config)?;
            let explicit = named_modules(&manifest, &modules)?;
            if json_only || config.json_only {
                api.use_json_only();
            }
            if explicit.is_empty() {
                api.configure(&[])?;
            } else {
                api.configure_modules(&explicit)?;
            }
            let configuration = api
                .configuration()
                .context("API was not configured")?;
            write_routes(out, &config.base_address, configuration)
        }
    }
}

fn load(path: &Path, config: &RuntimeConfig) -> anyhow::Result<(Manifest, WebApi)> {
    let manifest = load_manifest(path)?;
    let lister = manifest.to_lister()?;
    let api = WebApi::new(config.discovery(Arc::new(lister)));
    Ok((manifest, api))
}

fn named_modules(manifest: &Manifest, names: &[String]) -> anyhow::Result<Vec<ModuleDescriptor>> {
    names
        .iter()
        .map(|name| {
            manifest
                .module(name)
                .with_context(|| format!("module '{name}' is not in the manifest"))
        })
        .collect()
}

fn write_discovery(out: &mut dyn Write, result: &DiscoveryResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let report = json!({
                "handlers": result.handler_names(),
                "failures": result
                    .failures
                    .iter()
                    .map(|f| json!({ "module": f.module.full_identifier, "reason": f.reason }))
                    .collect::<Vec<_>>(),
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Text => {
            writeln!(out, "controllers: {}", result.handlers.len())?;
            for handler in &result.handlers {
                let origin = if handler.owning_module.is_dynamic { " (dynamic)" } else { "" };
                writeln!(out, "  {}{}", handler.full_name, origin)?;
            }
            if !result.failures.is_empty() {
                writeln!(out, "failures: {}", result.failures.len())?;
                for failure in &result.failures {
                    writeln!(out, "  {}: {}", failure.module, failure.reason)?;
                }
            }
        }
    }
    Ok(())
}

fn write_routes(out: &mut dyn Write, base_address: &str, configuration: &HttpConfiguration) -> anyhow::Result<()> {
    writeln!(out, "base address: {base_address}")?;
    writeln!(out, "routes:")?;
    for route in configuration.routes.iter() {
        writeln!(out, "  {} -> {}", route.name(), route.template())?;
    }

    writeln!(out, "controllers:")?;
    if let Some(resolver) = &configuration.controller_resolver {
        for controller in resolver.controller_types() {
            writeln!(out, "  {}", controller.full_name)?;
        }
    }

    writeln!(out, "formatters:")?;
    for formatter in configuration.formatters.iter() {
        let media_types: Vec<String> = formatter
            .supported_media_types()
            .iter()
            .map(ToString::to_string)
            .collect();
        writeln!(out, "  {}", media_types.join(", "))?;
    }
    Ok(())
}
