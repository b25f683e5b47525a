//! # Configuration Module
//!
//! Immutable routing settings shared by every component.
//!
//! ## Overview
//!
//! A [`Config`] names the registry root (the namespace prefix every handler
//! id starts with, and the directory holding the handler tree) and the
//! conventions used to translate between URL segments and handler ids:
//!
//! - `base_url` - prefix stripped from incoming paths and prepended to generated ones
//! - `ignore_params` - number of leading handler parameters that are not routed
//! - `method` - name of the handler method the router reports
//! - `suffix` - class-name suffix (e.g. `Action` in `GetFooItemAction`)
//! - `word_separator` - separator between words in a URL segment (`foo-item`)
//!
//! Values are normalized once at construction (slashes and namespace
//! separators trimmed, lengths precomputed) and never change afterwards.
//!
//! ## Usage
//!
//! ```rust
//! use autoroute::config::Config;
//!
//! let config = Config::new("App::Http", "src/http")
//!     .with_base_url("/api/")
//!     .with_suffix("Action");
//! assert_eq!(config.base_url(), "api");
//! assert_eq!(config.namespace(), "App::Http::");
//! ```
//!
//! ## Loading from YAML
//!
//! ```yaml
//! namespace: App::Http
//! directory: src/http
//! base_url: /api
//! ignore_params: 1
//! method: exec
//! suffix: Action
//! word_separator: "_"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Separator between namespace parts of a handler id
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Routing conventions, normalized at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    namespace: String,
    directory: PathBuf,
    base_url: String,
    ignore_params: usize,
    method: String,
    suffix: String,
    word_separator: char,
}

impl Config {
    /// Create a configuration with default conventions
    ///
    /// Defaults: no base URL, no ignored parameters, method `__invoke`,
    /// no suffix, word separator `-`.
    pub fn new(namespace: &str, directory: impl AsRef<Path>) -> Self {
        Self {
            namespace: normalize_namespace(namespace),
            directory: normalize_directory(directory.as_ref()),
            base_url: String::new(),
            ignore_params: 0,
            method: "__invoke".to_string(),
            suffix: String::new(),
            word_separator: '-',
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_ignore_params(mut self, ignore_params: usize) -> Self {
        self.ignore_params = ignore_params;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    #[must_use]
    pub fn with_word_separator(mut self, word_separator: char) -> Self {
        self.word_separator = word_separator;
        self
    }

    /// Load a configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Parse a configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML, missing keys, or a word separator
    /// that is not exactly one character.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let settings: ConfigSettings = serde_yaml::from_str(content)?;
        settings.try_into()
    }

    /// Root namespace, always terminated by `::`
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Root namespace without the trailing `::`
    #[must_use]
    pub fn namespace_root(&self) -> &str {
        self.namespace
            .strip_suffix(NAMESPACE_SEPARATOR)
            .unwrap_or(&self.namespace)
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Base URL without leading or trailing slashes
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn ignore_params(&self) -> usize {
        self.ignore_params
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    #[must_use]
    pub fn word_separator(&self) -> char {
        self.word_separator
    }
}

fn normalize_namespace(namespace: &str) -> String {
    let trimmed = namespace.trim().trim_matches(':');
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{trimmed}{NAMESPACE_SEPARATOR}")
}

fn normalize_directory(directory: &Path) -> PathBuf {
    let text = directory.to_string_lossy();
    let trimmed = text.trim_end_matches(std::path::MAIN_SEPARATOR);
    if trimmed.is_empty() {
        // the filesystem root itself
        return directory.to_path_buf();
    }
    PathBuf::from(trimmed)
}

/// On-disk shape of a [`Config`]
#[derive(Debug, Deserialize)]
struct ConfigSettings {
    namespace: String,
    directory: PathBuf,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    ignore_params: Option<usize>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    suffix: Option<String>,
    #[serde(default)]
    word_separator: Option<String>,
}

impl TryFrom<ConfigSettings> for Config {
    type Error = anyhow::Error;

    fn try_from(settings: ConfigSettings) -> Result<Self, Self::Error> {
        let mut config = Config::new(&settings.namespace, &settings.directory);
        if let Some(base_url) = settings.base_url {
            config = config.with_base_url(&base_url);
        }
        if let Some(ignore) = settings.ignore_params {
            config = config.with_ignore_params(ignore);
        }
        if let Some(method) = settings.method {
            config = config.with_method(&method);
        }
        if let Some(suffix) = settings.suffix {
            config = config.with_suffix(&suffix);
        }
        if let Some(separator) = settings.word_separator {
            config = config.with_word_separator(parse_word_separator(&separator)?);
        }
        Ok(config)
    }
}

/// Parse a word separator given as text; it must be exactly one character
///
/// # Errors
///
/// Returns an error when the text is empty or longer than one character.
pub fn parse_word_separator(text: &str) -> anyhow::Result<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => anyhow::bail!("Word separator must be a single character, got '{text}'"),
    }
}
