//! # Catalog Module
//!
//! In-memory handler registry: the crate's [`Introspector`] and an
//! in-memory [`NamespaceTree`].
//!
//! ## Overview
//!
//! A `Catalog` records, for one root namespace:
//!
//! - every handler id with its ordered method parameters
//! - every composite value type with its constructor parameters
//! - the node tree implied by the handler ids, plus nodes declared explicitly
//!   (a node may exist without holding any handler)
//!
//! Catalogs are built in code through the builder methods or loaded from a
//! YAML/JSON manifest (see [`manifest`]).
//!
//! ## Usage
//!
//! ```rust
//! use autoroute::catalog::Catalog;
//! use autoroute::types::{ParameterDescriptor, TypeTag};
//!
//! let catalog = Catalog::new("App::Http")
//!     .handler("App::Http::Get", [])
//!     .handler(
//!         "App::Http::FooItem::GetFooItem",
//!         [ParameterDescriptor::required("id", TypeTag::Int)],
//!     )
//!     .namespace("App::Http::Admin::Empty");
//! assert_eq!(catalog.len(), 2);
//! ```

pub mod manifest;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::config::NAMESPACE_SEPARATOR;
use crate::introspect::Introspector;
use crate::tree::NamespaceTree;
use crate::types::{ParameterDescriptor, TypeTag};

/// Registered handlers, value types and registry nodes under one namespace.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    namespace: String,
    handlers: BTreeMap<String, Vec<ParameterDescriptor>>,
    value_types: HashMap<String, Vec<ParameterDescriptor>>,
    /// node tokens -> handler stems held at that node
    nodes: BTreeMap<Vec<String>, BTreeSet<String>>,
}

impl Catalog {
    /// Create an empty catalog rooted at `namespace`
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.trim().trim_matches(':').to_string(),
            ..Self::default()
        }
    }

    /// Register a handler (builder form)
    #[must_use]
    pub fn handler(
        mut self,
        handler_id: &str,
        parameters: impl IntoIterator<Item = ParameterDescriptor>,
    ) -> Self {
        self.add_handler(handler_id, parameters);
        self
    }

    /// Declare a node that exists even when it holds no handler (builder form)
    #[must_use]
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.add_namespace(namespace);
        self
    }

    /// Register a composite value type (builder form)
    #[must_use]
    pub fn value_type(
        mut self,
        type_name: &str,
        parameters: impl IntoIterator<Item = ParameterDescriptor>,
    ) -> Self {
        self.add_value_type(type_name, parameters);
        self
    }

    /// Register a handler
    ///
    /// Parameter positions are assigned from declaration order; a variadic
    /// parameter is always optional. Ids outside the root namespace are
    /// recorded but do not create registry nodes.
    pub fn add_handler(
        &mut self,
        handler_id: &str,
        parameters: impl IntoIterator<Item = ParameterDescriptor>,
    ) {
        let (namespace, stem) = split_id(handler_id);
        if let Some(tokens) = self.relative_tokens(namespace) {
            self.insert_node(&tokens);
            self.nodes.entry(tokens).or_default().insert(stem.to_string());
        }
        self.handlers
            .insert(handler_id.to_string(), number(parameters));
    }

    pub fn add_namespace(&mut self, namespace: &str) {
        let namespace = namespace.trim().trim_matches(':');
        if let Some(tokens) = self.relative_tokens(namespace) {
            self.insert_node(&tokens);
        } else {
            debug!(namespace = %namespace, root = %self.namespace, "Ignoring namespace outside catalog root");
        }
    }

    pub fn add_value_type(
        &mut self,
        type_name: &str,
        parameters: impl IntoIterator<Item = ParameterDescriptor>,
    ) {
        self.value_types
            .insert(type_name.to_string(), number(parameters));
    }

    /// Root namespace, without a trailing separator
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        &self.namespace
    }

    /// Registered handler ids, sorted
    pub fn handler_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Catalog holding every entry `tree` discovers, as a handler without
    /// routed parameters
    ///
    /// Used when no manifest describes the handler signatures: every handler
    /// still routes, dumps and generates, with its bare path.
    pub fn from_tree(namespace: &str, tree: &dyn NamespaceTree) -> Self {
        let mut catalog = Self::new(namespace);
        for (parts, stem) in tree.discover() {
            let mut id = catalog.namespace.clone();
            for part in parts.iter().chain(std::iter::once(&stem)) {
                if !id.is_empty() {
                    id.push_str(NAMESPACE_SEPARATOR);
                }
                id.push_str(part);
            }
            catalog.add_handler(&id, []);
        }
        debug!(namespace = %catalog.namespace, handlers = catalog.len(), "Catalog built from tree");
        catalog
    }

    /// Check the catalog for declarations that can never route
    ///
    /// # Errors
    ///
    /// Returns an error when a variadic parameter is not last, when a
    /// parameter names a composite type that was never registered, or when a
    /// value type contains itself through its constructor parameters.
    pub fn validate(&self) -> anyhow::Result<()> {
        let declared = self
            .handlers
            .iter()
            .chain(self.value_types.iter());

        for (owner, params) in declared {
            if let Some(pos) = params.iter().position(|p| p.variadic) {
                if pos + 1 != params.len() {
                    anyhow::bail!(
                        "Variadic parameter ${} of {} must be the last parameter",
                        params[pos].name,
                        owner
                    );
                }
            }
            for param in params {
                if let TypeTag::Composite(type_name) = &param.type_tag {
                    if !self.value_types.contains_key(type_name) {
                        anyhow::bail!(
                            "Parameter ${} of {} uses unknown value type {}",
                            param.name,
                            owner,
                            type_name
                        );
                    }
                }
            }
        }

        let mut type_names: Vec<&str> = self.value_types.keys().map(String::as_str).collect();
        type_names.sort_unstable();
        let mut done = HashSet::new();
        for type_name in type_names {
            if let Some(cycle) = self.value_type_cycle(type_name, &mut Vec::new(), &mut done) {
                anyhow::bail!("Value type {} contains itself: {}", type_name, cycle);
            }
        }
        Ok(())
    }

    /// Depth-first search for a constructor chain leading back into `path`
    fn value_type_cycle<'a>(
        &'a self,
        type_name: &'a str,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Option<String> {
        if let Some(start) = path.iter().position(|outer| *outer == type_name) {
            let mut cycle = path[start..].to_vec();
            cycle.push(type_name);
            return Some(cycle.join(" -> "));
        }
        if done.contains(type_name) {
            return None;
        }

        path.push(type_name);
        for param in self.value_types.get(type_name).into_iter().flatten() {
            if let TypeTag::Composite(inner) = &param.type_tag {
                if let Some(cycle) = self.value_type_cycle(inner, path, done) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        done.insert(type_name);
        None
    }

    fn relative_tokens(&self, namespace: &str) -> Option<Vec<String>> {
        let rest = if self.namespace.is_empty() {
            namespace
        } else if namespace == self.namespace {
            ""
        } else {
            namespace
                .strip_prefix(self.namespace.as_str())?
                .strip_prefix(NAMESPACE_SEPARATOR)?
        };
        Some(
            rest.split(NAMESPACE_SEPARATOR)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    fn insert_node(&mut self, tokens: &[String]) {
        for depth in 0..=tokens.len() {
            self.nodes.entry(tokens[..depth].to_vec()).or_default();
        }
    }
}

/// Split a handler id into its namespace and its last part
fn split_id(handler_id: &str) -> (&str, &str) {
    handler_id
        .rsplit_once(NAMESPACE_SEPARATOR)
        .unwrap_or(("", handler_id))
}

fn number(parameters: impl IntoIterator<Item = ParameterDescriptor>) -> Vec<ParameterDescriptor> {
    parameters
        .into_iter()
        .enumerate()
        .map(|(position, mut param)| {
            param.position = position;
            if param.variadic {
                param.optional = true;
            }
            param
        })
        .collect()
}

impl Introspector for Catalog {
    fn exists(&self, handler_id: &str) -> bool {
        self.handlers.contains_key(handler_id)
    }

    fn parameters(&self, handler_id: &str) -> Option<&[ParameterDescriptor]> {
        self.handlers.get(handler_id).map(Vec::as_slice)
    }

    fn constructor_parameters(&self, type_name: &str) -> Option<&[ParameterDescriptor]> {
        self.value_types.get(type_name).map(Vec::as_slice)
    }
}

impl NamespaceTree for Catalog {
    fn contains(&self, tokens: &[String]) -> bool {
        tokens.is_empty() || self.nodes.contains_key(tokens)
    }

    fn entries(&self, tokens: &[String]) -> Vec<String> {
        self.nodes
            .get(tokens)
            .map(|stems| stems.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn discover(&self) -> Vec<(Vec<String>, String)> {
        self.nodes
            .iter()
            .flat_map(|(tokens, stems)| stems.iter().map(move |stem| (tokens.clone(), stem.clone())))
            .collect()
    }
}
