use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use http::Method;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::Catalog;
use crate::config::{parse_word_separator, Config};
use crate::creator::{Creator, DEFAULT_TEMPLATE};
use crate::dumper::{render_text, Dumper};
use crate::generator::Generator;
use crate::registry::Registry;
use crate::router::{Route, Router};
use crate::tree::FsTree;
use crate::types::Value;

/// Command-line interface for autoroute
#[derive(Parser, Debug)]
#[command(name = "autoroute", version)]
#[command(about = "Convention-driven routing for handler registries", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Registry root and naming conventions, shared by every command
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Root namespace of the handler registry (e.g. App::Http)
    pub namespace: String,

    /// Directory holding the handler tree
    pub directory: PathBuf,

    /// Extension of handler files
    #[arg(long, default_value = "rs")]
    pub extension: String,

    /// Class-name suffix of every handler (e.g. Action)
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Name of the handler method
    #[arg(long, default_value = "__invoke")]
    pub method: String,

    /// Separator between the words of a URL segment
    #[arg(long, default_value = "-")]
    pub word_separator: String,
}

/// Settings that only matter when paths are routed or generated
#[derive(Args, Debug, Clone)]
pub struct RoutingArgs {
    /// URL prefix of every route
    #[arg(long, default_value = "/")]
    pub base_url: String,

    /// Number of leading handler parameters that are not routed
    #[arg(long, default_value_t = 0)]
    pub ignore_params: usize,

    /// Catalog manifest (YAML or JSON) describing handler signatures
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

/// Output format of `dump` and `route`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every route of the registry
    Dump {
        #[command(flatten)]
        registry: RegistryArgs,

        #[command(flatten)]
        routing: RoutingArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Scaffold a handler file for a verb and a path
    Create {
        #[command(flatten)]
        registry: RegistryArgs,

        /// HTTP verb handled by the new handler
        #[arg(value_parser = parse_verb)]
        verb: Method,

        /// URL path; `{name}` segments become parameters
        path: String,

        /// Template file (placeholders {NAMESPACE}, {CLASS}, {METHOD}, {PARAMETERS}, {PARAMETER_NAMES})
        #[arg(long)]
        template: Option<PathBuf>,
    },
    /// Resolve one request to a handler and its arguments
    Route {
        #[command(flatten)]
        registry: RegistryArgs,

        #[command(flatten)]
        routing: RoutingArgs,

        #[arg(value_parser = parse_verb)]
        verb: Method,

        /// Request path, base URL included
        path: String,

        /// Show every routing step
        #[arg(long, default_value_t = false)]
        trace: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Build the path of a handler for argument values
    Generate {
        #[command(flatten)]
        registry: RegistryArgs,

        #[command(flatten)]
        routing: RoutingArgs,

        /// Fully qualified handler id
        handler_id: String,

        /// Argument values, in parameter order
        values: Vec<String>,
    },
}

fn parse_verb(text: &str) -> Result<Method, String> {
    Method::from_bytes(text.trim().to_uppercase().as_bytes())
        .map_err(|_| format!("invalid HTTP verb '{text}'"))
}

impl RegistryArgs {
    fn config(&self) -> anyhow::Result<Config> {
        let separator = parse_word_separator(&self.word_separator)?;
        Ok(Config::new(&self.namespace, &self.directory)
            .with_suffix(&self.suffix)
            .with_method(&self.method)
            .with_word_separator(separator))
    }

    fn require_directory(&self) -> anyhow::Result<()> {
        if !self.directory.is_dir() {
            bail!("Directory {} not found.", self.directory.display());
        }
        Ok(())
    }
}

fn build_registry(registry: &RegistryArgs, routing: &RoutingArgs) -> anyhow::Result<Arc<Registry>> {
    registry.require_directory()?;
    let config = registry
        .config()?
        .with_base_url(&routing.base_url)
        .with_ignore_params(routing.ignore_params);

    let tree = Arc::new(FsTree::new(&registry.directory, &registry.extension));
    let catalog = match &routing.manifest {
        Some(path) => Catalog::from_manifest_file(path)?,
        None => {
            debug!(directory = %registry.directory.display(), "No manifest given; handlers take no routed parameters");
            Catalog::from_tree(&registry.namespace, tree.as_ref())
        }
    };
    Ok(Arc::new(Registry::new(config, Arc::new(catalog), tree)))
}

/// Execute a parsed command, writing its output to `out`
///
/// Returns `Ok(false)` when the command ran but did not succeed (a failed
/// route, a refused overwrite); the message is already written.
///
/// # Errors
///
/// Returns an error when the registry cannot be loaded, a path cannot be
/// generated, or output cannot be written.
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Dump {
            registry,
            routing,
            format,
        } => {
            let table = Dumper::new(build_registry(registry, routing)?).dump()?;
            match format {
                OutputFormat::Text => write!(out, "{}", render_text(&table))?,
                OutputFormat::Json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&table)?)?;
                }
            }
            Ok(true)
        }
        Commands::Create {
            registry,
            verb,
            path,
            template,
        } => {
            registry.require_directory()?;
            let template = match template {
                Some(file) => {
                    if !file.is_file() {
                        bail!("Template file {} does not exist.", file.display());
                    }
                    std::fs::read_to_string(file)
                        .with_context(|| format!("Failed to read template {}", file.display()))?
                }
                None => DEFAULT_TEMPLATE.to_string(),
            };

            let scaffold = Creator::new(registry.config()?, template)
                .with_extension(&registry.extension)
                .create(verb.as_str(), path)?;

            writeln!(out, "{}", scaffold.file.display())?;
            if scaffold.file.exists() {
                writeln!(out, "Already exists; not overwriting.")?;
                return Ok(false);
            }
            scaffold.write()?;
            Ok(true)
        }
        Commands::Route {
            registry,
            routing,
            verb,
            path,
            trace,
            format,
        } => {
            let route = Router::new(build_registry(registry, routing)?).route(verb, path);
            match format {
                OutputFormat::Text => write_route_text(&route, *trace, out)?,
                OutputFormat::Json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&route_json(&route))?)?;
                }
            }
            Ok(route.is_ok())
        }
        Commands::Generate {
            registry,
            routing,
            handler_id,
            values,
        } => {
            let generator = Generator::new(build_registry(registry, routing)?);
            let path = generator.generate(handler_id, values.iter().map(|v| Value::from(v.as_str())))?;
            writeln!(out, "{path}")?;
            Ok(true)
        }
    }
}

fn write_route_text(route: &Route, trace: bool, out: &mut dyn Write) -> std::io::Result<()> {
    if trace {
        for step in &route.trace {
            writeln!(out, "> {step}")?;
        }
    }
    if let Some(error) = &route.error {
        return writeln!(out, "{error}");
    }

    writeln!(out, "{}::{}()", route.handler_id, route.method)?;
    for (i, argument) in route.arguments.iter().enumerate() {
        writeln!(out, "    {i}: {}", Value::export(Some(argument)))?;
    }
    Ok(())
}

fn route_json(route: &Route) -> serde_json::Value {
    serde_json::json!({
        "handler_id": route.handler_id,
        "method": route.method,
        "arguments": route.arguments.as_slice(),
        "error": route.error.as_ref().map(ToString::to_string),
        "error_kind": route.error_kind().map(|kind| kind.to_string()),
        "headers": route.headers,
        "trace": route.trace,
    })
}
