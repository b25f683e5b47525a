//! Structured logging setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a JSON or
//! pretty-printed fmt layer. Settings come from the environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `AUTOROUTE_LOG_LEVEL` | `warn` | trace/debug/info/warn/error |
//! | `AUTOROUTE_LOG_FORMAT` | `pretty` | json/pretty |
//! | `AUTOROUTE_LOG_TARGET_FILTER` | unset | extra comma-separated directives, e.g. `autoroute::router=debug` |
//! | `AUTOROUTE_LOG_INCLUDE_LOCATION` | `false` | include file:line |
//!
//! `RUST_LOG`, when set, replaces the level. Events are written to stderr so
//! command output on stdout stays clean.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for machines, pretty-print for people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("AUTOROUTE_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("AUTOROUTE_LOG_FORMAT")
                .map_or(defaults.format, |s| LogFormat::parse(&s)),
            target_filter: lookup("AUTOROUTE_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
            include_location: lookup("AUTOROUTE_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }
}

/// Build the event filter for `config`
///
/// Invalid directives in `target_filter` are skipped and returned so the
/// caller can report them once logging is up.
#[must_use]
pub fn build_env_filter(config: &LogConfig) -> (EnvFilter, Vec<String>) {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    let mut rejected = Vec::new();

    if let Some(target_filter) = &config.target_filter {
        for directive in target_filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.parse() {
                Ok(parsed) => env_filter = env_filter.add_directive(parsed),
                Err(_) => rejected.push(directive.to_string()),
            }
        }
    }
    (env_filter, rejected)
}

/// Initialize logging with `config`
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let (env_filter, rejected) = build_env_filter(config);

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    for directive in rejected {
        tracing::warn!(directive = %directive, "Ignoring invalid log filter directive");
    }
    Ok(())
}
