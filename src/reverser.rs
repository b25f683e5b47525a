//! # Reverser Module
//!
//! Derives the [`Reverse`] template of a handler: its verb, its placeholder
//! path and its parameters in routing order.
//!
//! ## Algorithm
//!
//! The walk mirrors the router. Starting from the base URL, each namespace
//! token of the handler id is appended as a URL segment. Whenever the walk
//! reaches a node where a handler for the verb exists, placeholders (`{0}`,
//! `{1}`, ...) are appended for the required parameters that handler adds
//! beyond those already placed.
//!
//! When exactly one token remains and it names the target handler as a tail
//! of the current node, the required counts of the previously adopted
//! handler and the target are compared: equal counts mean the router would
//! consume the final segment as a literal, so it is emitted as one without
//! adopting the intermediate handler.
//!
//! ```text
//! App::Http::Repo::Issue::Comment::Add::GetRepoIssueCommentAdd
//!   -> /repo/{0}/{1}/issue/{2}/comment/add
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::NAMESPACE_SEPARATOR;
use crate::error::RouteError;
use crate::registry::{Action, Registry, Reverse};

/// Reverse-routing front end over a shared registry.
#[derive(Debug, Clone)]
pub struct Reverser {
    registry: Arc<Registry>,
}

impl Reverser {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The cached [`Reverse`] of `handler_id`
    ///
    /// # Errors
    ///
    /// Returns `InvalidNamespace` or `NotFound` for ids that cannot be reversed.
    pub fn reverse(&self, handler_id: &str) -> Result<Arc<Reverse>, RouteError> {
        self.registry.reverse(handler_id)
    }
}

/// Per-call walk state
struct Walk<'a> {
    registry: &'a Registry,
    verb: String,
    parts: VecDeque<String>,
    path: String,
    sub_path: Vec<String>,
    required_total: usize,
    prev_handler: Option<String>,
    curr_handler: Option<String>,
}

/// Compute (without caching) the [`Reverse`] of `handler_id`
pub(crate) fn build(registry: &Registry, handler_id: &str) -> Result<Reverse, RouteError> {
    let action = registry.action(handler_id)?;
    let config = registry.config();

    let relative = handler_id
        .strip_prefix(config.namespace())
        .unwrap_or(handler_id);
    let mut parts: VecDeque<String> = relative
        .split(NAMESPACE_SEPARATOR)
        .map(str::to_string)
        .collect();
    let class = parts.pop_back().unwrap_or_default();
    let core: String = parts.iter().map(String::as_str).collect();

    let verb = class
        .strip_suffix(config.suffix())
        .and_then(|rest| rest.strip_suffix(core.as_str()))
        .filter(|verb| !verb.is_empty())
        .ok_or_else(|| {
            RouteError::not_found(format!(
                "Expected class name <Verb>{core}{}, actually {class}",
                config.suffix()
            ))
        })?
        .to_string();

    let mut walk = Walk {
        registry,
        verb,
        parts,
        path: config.base_url().to_string(),
        sub_path: Vec::new(),
        required_total: 0,
        prev_handler: None,
        curr_handler: None,
    };

    if walk.parts.is_empty() {
        // root handler: its own required parameters follow the base URL
        walk.required_segments(&action);
    }
    while !walk.parts.is_empty() {
        walk.step()?;
    }

    Ok(Reverse {
        handler_id: handler_id.to_string(),
        verb: walk.verb,
        path: format!("/{}", walk.path.trim_start_matches('/')),
        parameters: action.parameters().cloned().collect(),
        required_count: walk.required_total,
    })
}

impl Walk<'_> {
    fn step(&mut self) -> Result<(), RouteError> {
        self.prev_handler = self.curr_handler.clone();
        let Some(part) = self.parts.pop_front() else {
            return Ok(());
        };
        self.push_segment(&part);
        self.sub_path.push(part);

        let Some(handler_id) = self.registry.handler_for(&self.verb, &self.sub_path, None) else {
            return Ok(());
        };

        if self.static_tail()? {
            return Ok(());
        }

        let action = self.registry.action(&handler_id)?;
        self.curr_handler = Some(handler_id);
        self.required_segments(&action);
        Ok(())
    }

    /// Emit the final token as a literal when the router would treat it so
    fn static_tail(&mut self) -> Result<bool, RouteError> {
        if self.parts.len() != 1 {
            return Ok(false);
        }
        let Some(tail) = self.parts.front().cloned() else {
            return Ok(false);
        };

        let prev_required = match &self.prev_handler {
            Some(prev) => self.registry.action(prev)?.required_count(),
            None => 0,
        };

        let Some(next) = self.registry.handler_for(&self.verb, &self.sub_path, Some(tail.as_str())) else {
            return Ok(false);
        };
        let next_required = self.registry.action(&next)?.required_count();

        if prev_required != next_required {
            return Ok(false);
        }

        self.parts.pop_front();
        self.push_segment(&tail);
        Ok(true)
    }

    fn required_segments(&mut self, action: &Action) {
        while self.required_total < action.required_count() {
            self.path.push_str(&format!("/{{{}}}", self.required_total));
            self.required_total += 1;
        }
    }

    fn push_segment(&mut self, token: &str) {
        self.path.push('/');
        self.path.push_str(&self.registry.token_to_segment(token));
    }
}
