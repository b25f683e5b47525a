use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::sync::Arc;
use tracing::debug;

use super::action::{Action, Reverse};
use crate::catalog::Catalog;
use crate::config::{Config, NAMESPACE_SEPARATOR};
use crate::error::RouteError;
use crate::introspect::Introspector;
use crate::reverser;
use crate::tree::NamespaceTree;

static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("word boundary pattern is valid"));

/// Capitalize an HTTP verb the way handler class names spell it (`GET` -> `Get`)
#[must_use]
pub fn verb_class(verb: &str) -> String {
    let lower = verb.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Join separator-delimited words into one upper camel case token
/// (`foo-item` -> `FooItem`); the rest of each word is left as is
#[must_use]
pub fn words_to_token(segment: &str, separator: char) -> String {
    let mut token = String::with_capacity(segment.len());
    let mut word_start = true;
    for c in segment.chars() {
        if c == separator {
            word_start = true;
        } else if word_start {
            token.extend(c.to_uppercase());
            word_start = false;
        } else {
            token.push(c);
        }
    }
    token
}

/// Single source of truth for translating between URL conventions and
/// handler ids.
///
/// Owns the [`Config`], the introspection and tree capabilities, and the
/// Action/Reverse caches. One registry is shared (through `Arc`) by every
/// router, generator and dumper; all methods take `&self`.
pub struct Registry {
    config: Arc<Config>,
    introspector: Arc<dyn Introspector>,
    tree: Arc<dyn NamespaceTree>,
    actions: DashMap<String, Arc<Action>>,
    reverses: DashMap<String, Arc<Reverse>>,
}

impl Registry {
    pub fn new(
        config: Config,
        introspector: Arc<dyn Introspector>,
        tree: Arc<dyn NamespaceTree>,
    ) -> Self {
        debug!(
            namespace = %config.namespace(),
            directory = %config.directory().display(),
            base_url = %config.base_url(),
            suffix = %config.suffix(),
            "Registry created"
        );
        Self {
            config: Arc::new(config),
            introspector,
            tree,
            actions: DashMap::new(),
            reverses: DashMap::new(),
        }
    }

    /// Registry whose handlers and nodes both come from one catalog
    pub fn from_catalog(config: Config, catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let introspector: Arc<dyn Introspector> = Arc::clone(&catalog) as Arc<dyn Introspector>;
        Self::new(config, introspector, catalog)
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn introspector(&self) -> Arc<dyn Introspector> {
        Arc::clone(&self.introspector)
    }

    #[must_use]
    pub fn tree(&self) -> &dyn NamespaceTree {
        self.tree.as_ref()
    }

    #[must_use]
    pub fn class_exists(&self, handler_id: &str) -> bool {
        self.introspector.exists(handler_id)
    }

    /// Does the registry node at `sub_path` exist?
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` when a token is a directory dot (`.` or `..`).
    pub fn sub_path_exists(&self, sub_path: &[String]) -> Result<bool, RouteError> {
        if sub_path.iter().any(|token| token == ".." || token == ".") {
            return Err(RouteError::invalid_path("Directory dots not allowed in segments"));
        }
        Ok(self.tree.contains(sub_path))
    }

    /// The id that `verb` at `sub_path` (plus an optional tail token) maps to
    ///
    /// `("Get", ["FooItem"], Some("Edit"))` gives
    /// `App::Http::FooItem::Edit::GetFooItemEdit`.
    #[must_use]
    pub fn handler_name(&self, verb: &str, sub_path: &[String], tail: Option<&str>) -> String {
        let mut id = self.config.namespace_root().to_string();
        let tokens = sub_path.iter().map(String::as_str).chain(tail);

        for token in tokens.clone() {
            push_part(&mut id, token);
        }

        let mut class = verb.to_string();
        class.extend(tokens);
        class.push_str(self.config.suffix());
        push_part(&mut id, &class);
        id
    }

    /// Synthesize the handler id for `verb` and return it when it exists
    ///
    /// A missing `Head` handler falls back to the `Get` handler at the same
    /// place.
    #[must_use]
    pub fn handler_for(&self, verb: &str, sub_path: &[String], tail: Option<&str>) -> Option<String> {
        let id = self.handler_name(verb, sub_path, tail);
        if self.class_exists(&id) {
            return Some(id);
        }
        if verb == "Head" {
            return self.handler_for("Get", sub_path, tail);
        }
        None
    }

    /// The memoized [`Action`] of a handler
    ///
    /// # Errors
    ///
    /// Returns `InvalidNamespace` for ids outside the root namespace and
    /// `NotFound` for ids the introspector does not know.
    pub fn action(&self, handler_id: &str) -> Result<Arc<Action>, RouteError> {
        if let Some(action) = self.actions.get(handler_id) {
            return Ok(Arc::clone(action.value()));
        }

        let action = Arc::new(self.new_action(handler_id)?);
        let cached = self
            .actions
            .entry(handler_id.to_string())
            .or_insert(action);
        Ok(Arc::clone(cached.value()))
    }

    fn new_action(&self, handler_id: &str) -> Result<Action, RouteError> {
        let namespace = self.config.namespace();
        if !handler_id.starts_with(namespace) {
            return Err(RouteError::InvalidNamespace(format!(
                "Expected namespace {namespace}, actually {handler_id}"
            )));
        }

        let Some(parameters) = self.introspector.parameters(handler_id) else {
            return Err(RouteError::not_found(format!(
                "Expected class {handler_id}, actually not found"
            )));
        };

        let action = Action::new(handler_id, parameters, self.config.ignore_params());
        debug!(
            handler_id = %handler_id,
            required = action.required_count(),
            optional = action.optional_parameters().len(),
            "Action cached"
        );
        Ok(action)
    }

    /// The memoized [`Reverse`] of a handler
    ///
    /// # Errors
    ///
    /// Same as [`Registry::action`], plus `NotFound` when the class name does
    /// not follow the `<Verb><Tokens><Suffix>` convention.
    pub fn reverse(&self, handler_id: &str) -> Result<Arc<Reverse>, RouteError> {
        if let Some(reverse) = self.reverses.get(handler_id) {
            return Ok(Arc::clone(reverse.value()));
        }

        let reverse = Arc::new(reverser::build(self, handler_id)?);
        let cached = self
            .reverses
            .entry(handler_id.to_string())
            .or_insert(reverse);
        Ok(Arc::clone(cached.value()))
    }

    /// Uppercase verbs with a handler directly at `sub_path`, sorted
    ///
    /// `HEAD` is included whenever `GET` is, since HEAD falls back to GET.
    #[must_use]
    pub fn allowed_verbs(&self, sub_path: &[String]) -> Vec<String> {
        let mut main = sub_path.concat();
        main.push_str(self.config.suffix());

        let mut verbs: Vec<String> = self
            .tree
            .entries(sub_path)
            .iter()
            .filter_map(|stem| stem.strip_suffix(main.as_str()))
            .filter(|verb| !verb.is_empty())
            .map(str::to_uppercase)
            .collect();

        if verbs.iter().any(|v| v == "GET") && !verbs.iter().any(|v| v == "HEAD") {
            verbs.push("HEAD".to_string());
        }
        verbs.sort();
        verbs.dedup();
        verbs
    }

    /// URL segment to registry token: `foo-item` -> `FooItem`
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for an empty (or whitespace-only) segment.
    pub fn segment_to_token(&self, segment: &str) -> Result<String, RouteError> {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(RouteError::invalid_path(
                "Cannot convert empty segment to namespace part",
            ));
        }

        Ok(words_to_token(segment, self.config.word_separator()))
    }

    /// Registry token to URL segment: `FooItem` -> `foo-item`
    #[must_use]
    pub fn token_to_segment(&self, token: &str) -> String {
        let separator = self.config.word_separator();
        WORD_BOUNDARY
            .replace_all(token.trim(), |caps: &Captures| {
                format!("{}{}{}", &caps[1], separator, &caps[2])
            })
            .to_lowercase()
    }

    /// Convert a discovered entry (node tokens plus stem) into a handler id
    ///
    /// Returns `None` when the stem carries no verb prefix or when no handler
    /// answers for the derived verb.
    #[must_use]
    pub fn handler_for_file(&self, parts: &[String], stem: &str) -> Option<String> {
        let mut core = parts.concat();
        core.push_str(self.config.suffix());
        let verb = stem.strip_suffix(core.as_str())?;
        if verb.is_empty() {
            return None;
        }
        self.handler_for(verb, parts, None)
    }

    /// Full namespace of a node, for messages: `App::Http::FooItem`
    #[must_use]
    pub fn namespace_of(&self, sub_path: &[String]) -> String {
        let mut namespace = self.config.namespace_root().to_string();
        for token in sub_path {
            push_part(&mut namespace, token);
        }
        namespace
    }
}

fn push_part(id: &mut String, part: &str) {
    if !id.is_empty() {
        id.push_str(NAMESPACE_SEPARATOR);
    }
    id.push_str(part);
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("cached_actions", &self.actions.len())
            .field("cached_reverses", &self.reverses.len())
            .finish_non_exhaustive()
    }
}
