//! # Dumper Module
//!
//! Lists every routable handler as a table of named path templates.
//!
//! ## Overview
//!
//! The dumper asks the [`crate::NamespaceTree`] for every handler entry,
//! keeps those that follow the `<Verb><Tokens><Suffix>` convention, and
//! renders each handler's [`Reverse`] path with typed parameter names:
//!
//! ```text
//! /api/foo-item/{int:id}/extras/{float:foo}/{string:bar}/{mixed:baz}/{bool:dib}[/{array:gir}]
//! /api/foo-item/{int:id}/variadic[/{...string:more}]
//! ```
//!
//! Optional parameters are bracketed; composite parameters expand into the
//! tokens of their constructor parameters. A `Head` row is synthesized from
//! the `Get` handler wherever no explicit `Head` handler exists.
//!
//! The table is ordered by path (byte order), then by verb.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::RouteError;
use crate::registry::{Registry, Reverse};
use crate::types::{ParameterDescriptor, TypeTag};

/// Named path -> verb (`Get`, `Post`, ...) -> handler id
pub type RouteTable = BTreeMap<String, BTreeMap<String, String>>;

/// Width the verb column is padded to in text listings
pub const VERB_COLUMN_WIDTH: usize = 7;

/// Route table builder over a shared registry.
#[derive(Debug, Clone)]
pub struct Dumper {
    registry: Arc<Registry>,
}

impl Dumper {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Sorted ids of every discovered handler that follows the naming
    /// convention
    #[must_use]
    pub fn handler_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .registry
            .tree()
            .discover()
            .iter()
            .filter_map(|(parts, stem)| {
                let id = self.registry.handler_for_file(parts, stem);
                if id.is_none() {
                    debug!(stem = %stem, parts = ?parts, "Skipping entry outside the naming convention");
                }
                id
            })
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Build the route table
    ///
    /// # Errors
    ///
    /// Returns the first error raised while reversing a discovered handler.
    pub fn dump(&self) -> Result<RouteTable, RouteError> {
        let ids = self.handler_ids();
        let mut table = RouteTable::new();
        let mut get_rows = Vec::new();

        for id in &ids {
            let reverse = self.registry.reverse(id)?;
            let path = self.named_path(&reverse);
            if reverse.verb == "Get" {
                get_rows.push((path.clone(), id.clone()));
            }
            table.entry(path).or_default().insert(reverse.verb.clone(), id.clone());
        }

        for (path, id) in get_rows {
            table
                .entry(path)
                .or_default()
                .entry("Head".to_string())
                .or_insert(id);
        }

        info!(handlers = ids.len(), paths = table.len(), "Route table dumped");
        Ok(table)
    }

    /// Render the placeholder path of `reverse` with typed parameter names
    ///
    /// `/foo-item/{0}/edit` becomes `/foo-item/{int:id}/edit`.
    #[must_use]
    pub fn named_path(&self, reverse: &Reverse) -> String {
        let mut path = reverse.path.clone();
        let mut pairs = Vec::new();

        for (pos, param) in reverse.parameters.iter().enumerate() {
            if pos < reverse.required_count {
                pairs.push((format!("/{{{pos}}}"), self.tokens(param, &mut Vec::new())));
            } else {
                path.push_str(&self.tokens(param, &mut Vec::new()));
            }
        }

        for (placeholder, tokens) in &pairs {
            path = path.replacen(placeholder.as_str(), tokens, 1);
        }
        path
    }

    /// A value type nested inside itself is left unexpanded
    fn tokens(&self, param: &ParameterDescriptor, expanding: &mut Vec<String>) -> String {
        if let TypeTag::Composite(type_name) = &param.type_tag {
            let introspector = self.registry.introspector();
            if let Some(fields) = introspector.constructor_parameters(type_name) {
                if !expanding.contains(type_name) {
                    expanding.push(type_name.clone());
                    let tokens = fields.iter().map(|field| self.tokens(field, expanding)).collect();
                    expanding.pop();
                    return tokens;
                }
            }
        }

        let variadic = if param.variadic { "..." } else { "" };
        let token = format!("/{{{variadic}{}:{}}}", param.type_tag, param.name);
        if param.is_required() {
            token
        } else {
            format!("[{token}]")
        }
    }
}

/// Text listing of a route table, two lines per row:
///
/// ```text
/// GET     /api/foo-item/{int:id}
///         App::Http::FooItem::GetFooItem
/// ```
#[must_use]
pub fn render_text(table: &RouteTable) -> String {
    let mut out = String::new();
    for (path, verbs) in table {
        for (verb, handler_id) in verbs {
            out.push_str(&format!(
                "{:<width$} {path}\n",
                verb.to_uppercase(),
                width = VERB_COLUMN_WIDTH
            ));
            out.push_str(&format!("{:width$} {handler_id}\n", "", width = VERB_COLUMN_WIDTH));
        }
    }
    out
}
