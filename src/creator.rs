//! # Creator Module
//!
//! Scaffolds a new handler from an HTTP verb and a URL path.
//!
//! ## Overview
//!
//! Literal path segments become namespace tokens; `{name}` segments become
//! method parameters. The handler is placed where the router will look for
//! it:
//!
//! ```text
//! GET /company/{companyId}/employee/{employeeNum}   (suffix "Action")
//!   namespace  App::Http::Company::Employee
//!   class      GetCompanyEmployeeAction
//!   file       <directory>/Company/Employee/GetCompanyEmployeeAction.rs
//! ```
//!
//! ## Templates
//!
//! The rendered text comes from a template with these placeholders:
//!
//! | Placeholder | Replaced with |
//! |-------------|---------------|
//! | `{NAMESPACE}` | Namespace of the handler |
//! | `{CLASS}` | Handler class name |
//! | `{METHOD}` | Configured handler method |
//! | `{PARAMETERS}` | `companyId: String, employeeNum: String` |
//! | `{PARAMETER_NAMES}` | `companyId, employeeNum` |
//!
//! Placeholders are replaced in one pass; replacement text is never
//! expanded again.

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::PathBuf;
use tracing::info;

use crate::config::{Config, NAMESPACE_SEPARATOR};
use crate::error::RouteError;
use crate::registry::{verb_class, words_to_token};

/// Template used when none is given
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/handler.tpl");

/// Default extension of scaffolded files
pub const DEFAULT_EXTENSION: &str = "rs";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(NAMESPACE|CLASS|METHOD|PARAMETERS|PARAMETER_NAMES)\}")
        .expect("template placeholder pattern is valid")
});

/// A rendered handler, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaffold {
    /// Target file
    pub file: PathBuf,
    /// Namespace of the handler (`App::Http::Company::Employee`)
    pub namespace: String,
    /// Handler class name (`GetCompanyEmployeeAction`)
    pub class: String,
    /// Rendered template
    pub code: String,
}

impl Scaffold {
    /// Fully qualified id of the scaffolded handler
    #[must_use]
    pub fn handler_id(&self) -> String {
        format!("{}{NAMESPACE_SEPARATOR}{}", self.namespace, self.class)
    }

    /// Write the file, creating parent directories
    ///
    /// # Errors
    ///
    /// Fails when the file already exists or cannot be written.
    pub fn write(&self) -> anyhow::Result<()> {
        if self.file.exists() {
            anyhow::bail!("Already exists; not overwriting.");
        }
        if let Some(dir) = self.file.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        std::fs::write(&self.file, &self.code)
            .with_context(|| format!("Failed to write {}", self.file.display()))?;
        info!(file = %self.file.display(), handler_id = %self.handler_id(), "Handler scaffolded");
        Ok(())
    }
}

/// Handler scaffolder.
#[derive(Debug, Clone)]
pub struct Creator {
    config: Config,
    template: String,
    extension: String,
}

impl Creator {
    /// Create a scaffolder rendering `template`
    #[must_use]
    pub fn new(config: Config, template: impl Into<String>) -> Self {
        Self {
            config,
            template: template.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Extension of scaffolded files (a leading dot is ignored)
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Render the handler for `verb` at `path`
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` when a segment is `.` or `..`.
    pub fn create(&self, verb: &str, path: &str) -> Result<Scaffold, RouteError> {
        let mut tokens = Vec::new();
        let mut parameters = Vec::new();

        for segment in path.trim_matches('/').split('/') {
            if matches!(segment.trim(), "." | "..") {
                return Err(RouteError::invalid_path("Directory dots not allowed in segments"));
            }
            if segment.starts_with('{') {
                parameters.push(segment.trim_matches(|c| c == '{' || c == '}' || c == ' ').to_string());
                continue;
            }
            let token = words_to_token(segment.trim(), self.config.word_separator());
            if !token.is_empty() {
                tokens.push(token);
            }
        }

        let mut namespace = self.config.namespace_root().to_string();
        for token in &tokens {
            if !namespace.is_empty() {
                namespace.push_str(NAMESPACE_SEPARATOR);
            }
            namespace.push_str(token);
        }

        let class = format!("{}{}{}", verb_class(verb), tokens.concat(), self.config.suffix());

        let mut file = self.config.directory().to_path_buf();
        file.extend(&tokens);
        if self.extension.is_empty() {
            file.push(&class);
        } else {
            file.push(format!("{class}.{}", self.extension));
        }

        let typed: Vec<String> = parameters.iter().map(|name| format!("{name}: String")).collect();
        let typed = typed.join(", ");
        let names = parameters.join(", ");
        let code = PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| match &caps[1] {
                "NAMESPACE" => namespace.clone(),
                "CLASS" => class.clone(),
                "METHOD" => self.config.method().to_string(),
                "PARAMETERS" => typed.clone(),
                _ => names.clone(),
            })
            .into_owned();

        Ok(Scaffold {
            file,
            namespace,
            class,
            code,
        })
    }
}
