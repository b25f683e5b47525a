use smallvec::SmallVec;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, RouteError};
use crate::filter::Filter;
use crate::registry::{verb_class, Action, Registry};
use crate::types::{ParameterDescriptor, Value};

/// Target of the per-step routing events
pub const TRACE_TARGET: &str = "autoroute::router";

/// Most handlers take a handful of arguments; keep those inline.
pub const MAX_INLINE_ARGUMENTS: usize = 8;

/// Filtered arguments of a route, in handler parameter order
pub type ArgumentVec = SmallVec<[Value; MAX_INLINE_ARGUMENTS]>;

/// Outcome of one routing call.
///
/// Always returned, success or failure. On failure `handler_id` is the last
/// handler adopted before the error (possibly empty) and `arguments` holds
/// what was captured up to that point.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Resolved handler id
    pub handler_id: String,
    /// Handler method to invoke (from the config)
    pub method: String,
    pub arguments: ArgumentVec,
    pub error: Option<RouteError>,
    /// Response headers implied by the failure (`allowed` on method-not-allowed)
    pub headers: BTreeMap<String, String>,
    /// One line per routing decision
    pub trace: Vec<String>,
}

impl Route {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(RouteError::kind)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Convention-driven router: verb + path -> handler id + typed arguments.
///
/// Stateless between calls; every call keeps its scratch state in a local
/// [`Capture`], so one router can serve many threads at once.
#[derive(Clone)]
pub struct Router {
    registry: Arc<Registry>,
    filter: Filter,
}

impl Router {
    /// Create a router over a shared registry
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        let config = registry.config();
        info!(
            namespace = %config.namespace(),
            base_url = %config.base_url(),
            method = %config.method(),
            suffix = %config.suffix(),
            ignore_params = config.ignore_params(),
            "Router ready"
        );
        let filter = Filter::new(registry.introspector());
        Self { registry, filter }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Route a request
    ///
    /// # Arguments
    ///
    /// * `verb` - HTTP verb in any case (`"GET"`, `http::Method::POST`, ...)
    /// * `path` - Request path, base URL included
    ///
    /// # Returns
    ///
    /// A [`Route`]; inspect [`Route::error`] to tell success from failure.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let route = router.route("GET", "/api/foo-item/42/edit");
    /// assert_eq!(route.handler_id, "App::Http::FooItem::Edit::GetFooItemEdit");
    /// assert_eq!(route.arguments[0], Value::Int(42));
    /// ```
    #[must_use]
    pub fn route(&self, verb: impl AsRef<str>, path: &str) -> Route {
        let verb = verb.as_ref();
        let started = Instant::now();
        let mut capture = Capture::new(self, verb_class(verb));
        capture.log(format!("{} {}", verb.to_uppercase(), path));

        let outcome = capture.run(path);
        let duration_us = started.elapsed().as_micros();
        let method = self.registry.config().method().to_string();

        match outcome {
            Ok(()) => {
                let handler_id = capture
                    .action
                    .as_ref()
                    .map(|action| action.handler_id().to_string())
                    .unwrap_or(capture.handler_id);
                info!(
                    verb = %verb,
                    path = %path,
                    handler_id = %handler_id,
                    arguments = capture.arguments.len(),
                    duration_us,
                    "Route matched"
                );
                Route {
                    handler_id,
                    method,
                    arguments: capture.arguments,
                    error: None,
                    headers: BTreeMap::new(),
                    trace: capture.trace,
                }
            }
            Err(error) => {
                warn!(
                    verb = %verb,
                    path = %path,
                    handler_id = %capture.handler_id,
                    error_kind = %error.kind(),
                    error = %error,
                    duration_us,
                    "Route match failed"
                );
                Route {
                    handler_id: capture.handler_id,
                    method,
                    arguments: capture.arguments,
                    error: Some(error),
                    headers: capture.headers,
                    trace: capture.trace,
                }
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Scratch state of one routing call.
///
/// Capture steps per loop pass: sub-path, main handler, static tail,
/// required arguments, namespace lookahead, optional arguments.
struct Capture<'r> {
    registry: &'r Registry,
    filter: &'r Filter,
    verb: String,
    segments: VecDeque<Value>,
    sub_path: Vec<String>,
    handler_id: String,
    action: Option<Arc<Action>>,
    arguments: ArgumentVec,
    headers: BTreeMap<String, String>,
    trace: Vec<String>,
}

impl<'r> Capture<'r> {
    fn new(router: &'r Router, verb: String) -> Self {
        Self {
            registry: &router.registry,
            filter: &router.filter,
            verb,
            segments: VecDeque::new(),
            sub_path: Vec::new(),
            handler_id: String::new(),
            action: None,
            arguments: ArgumentVec::new(),
            headers: BTreeMap::new(),
            trace: Vec::new(),
        }
    }

    fn log(&mut self, step: String) {
        debug!(target: TRACE_TARGET, step = %step, "Routing step");
        self.trace.push(step);
    }

    fn run(&mut self, path: &str) -> Result<(), RouteError> {
        self.segments = self.split(path)?;

        loop {
            self.capture()?;
            if self.segments.is_empty() {
                break;
            }
        }
        self.log("segments empty".to_string());

        if let Some(action) = &self.action {
            let found = self.arguments.len();
            let needed = action.required_count();
            if found < needed {
                return Err(RouteError::not_found(format!(
                    "{} needs {} argument(s), {} found",
                    action.handler_id(),
                    needed,
                    found
                )));
            }
        }
        Ok(())
    }

    /// Strip the base URL and split the remainder on `/`
    fn split(&self, path: &str) -> Result<VecDeque<Value>, RouteError> {
        let path = path.trim_matches('/');
        let base = self.registry.config().base_url();

        let prefix_len = path
            .char_indices()
            .nth(base.chars().count())
            .map_or(path.len(), |(idx, _)| idx);
        let (prefix, rest) = path.split_at(prefix_len);
        if prefix != base {
            return Err(RouteError::not_found(format!(
                "Expected base URL /{base}, actually /{prefix}"
            )));
        }
        if !base.is_empty() && !rest.is_empty() && !rest.starts_with('/') {
            let actual = path.split('/').next().unwrap_or_default();
            return Err(RouteError::not_found(format!(
                "Expected base URL /{base}, actually /{actual}"
            )));
        }

        let rest = rest.trim_matches('/');
        if rest.is_empty() {
            return Ok(VecDeque::new());
        }
        Ok(rest.split('/').map(Value::from).collect())
    }

    fn capture(&mut self) -> Result<(), RouteError> {
        if !self.capture_sub_path()? {
            return Ok(());
        }
        if !self.capture_main_handler()? {
            return Ok(());
        }
        self.capture_tail_handler()?;
        self.capture_required()?;
        if self.next_segment_is_namespace()? {
            return Ok(());
        }
        self.capture_optional()
    }

    /// Consume the next segment into the sub-path; false when a catch-all
    /// root handler took over the remaining segments
    fn capture_sub_path(&mut self) -> Result<bool, RouteError> {
        let mut popped = None;
        if let Some(segment) = self.segments.pop_front() {
            let token = self
                .registry
                .segment_to_token(segment.as_str().unwrap_or_default())?;
            self.log(format!("candidate namespace segment: {token}"));
            self.sub_path.push(token);
            popped = Some(segment);
        }

        let namespace = self.registry.namespace_of(&self.sub_path);
        self.log(format!("find namespace: {namespace}"));

        if self.registry.sub_path_exists(&self.sub_path)? {
            self.log("namespace found".to_string());
            return Ok(true);
        }

        self.log("namespace not found".to_string());
        if let (Some(segment), true) = (popped, self.at_top_level()) {
            if self.capture_catch_all(segment)? {
                return Ok(false);
            }
        }
        Err(RouteError::not_found(format!("Not a known namespace: {namespace}")))
    }

    fn at_top_level(&self) -> bool {
        self.sub_path.len() == 1 && self.action.is_none()
    }

    /// Let a root handler with parameters absorb every segment
    fn capture_catch_all(&mut self, first: Value) -> Result<bool, RouteError> {
        let Some(handler_id) = self.registry.handler_for(&self.verb, &[], None) else {
            return Ok(false);
        };
        let action = self.registry.action(&handler_id)?;
        if !action.has_parameters() {
            return Ok(false);
        }

        self.log(format!("catch-all root class found: {handler_id}"));
        self.sub_path.clear();
        self.segments.push_front(first);
        self.handler_id = handler_id;
        self.action = Some(Arc::clone(&action));

        self.capture_arguments(action.required_parameters(0), 0)?;
        self.capture_arguments(action.optional_parameters(), 0)?;
        if !self.segments.is_empty() {
            self.log("leftover segments".to_string());
            return Err(RouteError::not_found(format!(
                "Too many router segments for {}",
                action.handler_id()
            )));
        }
        Ok(true)
    }

    /// Adopt the handler at the current sub-path; false when there is none
    /// but deeper segments remain
    fn capture_main_handler(&mut self) -> Result<bool, RouteError> {
        let expect = self.registry.handler_name(&self.verb, &self.sub_path, None);
        self.log(format!("find class: {expect}"));

        if let Some(handler_id) = self.registry.handler_for(&self.verb, &self.sub_path, None) {
            self.log("class found".to_string());
            self.adopt(handler_id)?;
            return Ok(true);
        }

        self.log("class not found".to_string());
        if !self.segments.is_empty() {
            return Ok(false);
        }

        self.log("segments empty".to_string());
        let namespace = self.registry.namespace_of(&self.sub_path);
        let allowed = self.registry.allowed_verbs(&self.sub_path);
        if allowed.is_empty() {
            return Err(RouteError::not_found(format!(
                "No actions found in namespace {namespace}"
            )));
        }

        let allowed = allowed.join(",");
        self.headers.insert("allowed".to_string(), allowed.clone());
        Err(RouteError::MethodNotAllowed {
            message: format!(
                "{} action not found in namespace {namespace}",
                self.verb.to_uppercase()
            ),
            allowed,
        })
    }

    /// A single remaining segment that names a more specific handler is
    /// consumed as part of the handler name, not as an argument
    fn capture_tail_handler(&mut self) -> Result<(), RouteError> {
        if self.segments.len() != 1 {
            return Ok(());
        }
        let Some(raw) = self.segments.front().and_then(Value::as_str) else {
            return Ok(());
        };

        let token = self.registry.segment_to_token(raw)?;
        self.log(format!("candidate static tail namespace segment: {token}"));

        let Some(handler_id) =
            self.registry.handler_for(&self.verb, &self.sub_path, Some(token.as_str()))
        else {
            self.log("static tail namespace not found".to_string());
            return Ok(());
        };

        self.segments.pop_front();
        self.sub_path.push(token);
        self.log(format!("static tail class found: {handler_id}"));
        self.adopt(handler_id)
    }

    fn capture_required(&mut self) -> Result<(), RouteError> {
        if self.segments.is_empty() {
            return Ok(());
        }
        let Some(action) = self.action.clone() else {
            return Ok(());
        };

        let offset = self.arguments.len();
        let required = action.required_parameters(offset);
        if required.is_empty() {
            self.log("no additional required arguments".to_string());
            return Ok(());
        }

        self.log("capture additional required arguments".to_string());
        self.capture_arguments(required, offset)
    }

    /// Would the next segment extend the sub-path? Namespaces win over
    /// optional arguments.
    fn next_segment_is_namespace(&self) -> Result<bool, RouteError> {
        let Some(raw) = self.segments.front().and_then(Value::as_str) else {
            return Ok(false);
        };
        let mut candidate = self.sub_path.clone();
        candidate.push(self.registry.segment_to_token(raw)?);
        self.registry.sub_path_exists(&candidate)
    }

    fn capture_optional(&mut self) -> Result<(), RouteError> {
        if self.segments.is_empty() {
            return Ok(());
        }
        let Some(action) = self.action.clone() else {
            return Ok(());
        };

        let optional = action.optional_parameters();
        if optional.is_empty() {
            self.log("no optional arguments".to_string());
            return Ok(());
        }

        self.log("capture optional arguments".to_string());
        self.capture_arguments(optional, 0)?;

        if self.segments.is_empty() {
            return Ok(());
        }
        self.log("leftover segments".to_string());
        Err(RouteError::not_found(format!(
            "Too many router segments for {}",
            action.handler_id()
        )))
    }

    fn capture_arguments(
        &mut self,
        params: &[ParameterDescriptor],
        first_index: usize,
    ) -> Result<(), RouteError> {
        for (i, param) in params.iter().enumerate() {
            if self.segments.is_empty() {
                return Ok(());
            }
            let index = first_index + i;

            if param.variadic {
                while !self.segments.is_empty() {
                    let value = self.filter_value(param)?;
                    self.arguments.push(value);
                    self.log(format!("captured variadic argument {index} (${})", param.name));
                }
                return Ok(());
            }

            let value = self.filter_value(param)?;
            self.arguments.push(value);
            self.log(format!("captured argument {index} (${})", param.name));
        }
        Ok(())
    }

    fn filter_value(&mut self, param: &ParameterDescriptor) -> Result<Value, RouteError> {
        self.filter.parameter(
            param,
            &self.handler_id,
            self.registry.config().method(),
            &mut self.segments,
        )
    }

    fn adopt(&mut self, handler_id: String) -> Result<(), RouteError> {
        self.handler_id = handler_id;
        self.action = Some(self.registry.action(&self.handler_id)?);
        Ok(())
    }
}
