//! # Generator Module
//!
//! Builds the URL path for a handler id and a list of argument values, the
//! inverse of [`crate::Router::route`].
//!
//! ## Overview
//!
//! Generation starts from the handler's [`crate::Reverse`] template
//! (`/api/foo-item/{0}/edit`). Each value is validated through the same
//! [`Filter`] the router uses, but the URL receives the caller's original
//! value rather than the cast one, so `"07"` stays `07`.
//!
//! - Required parameters fill the `{0}`, `{1}`, ... placeholders
//! - Optional parameters are appended after the template, in order
//! - A variadic parameter consumes every remaining value
//!
//! ```rust,ignore
//! let path = generator.generate(
//!     "App::Http::FooItem::Extras::GetFooItemExtras",
//!     [1.into(), 2.3.into(), "bar".into(), "baz".into(), true.into(), vec!["a", "b"].into()],
//! )?;
//! assert_eq!(path, "/api/foo-item/1/extras/2.3/bar/baz/1/a,b");
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ArgumentError, RouteError};
use crate::filter::Filter;
use crate::registry::Registry;
use crate::types::{ParameterDescriptor, Value};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"));

/// Reverse router: handler id plus values to URL path.
#[derive(Clone)]
pub struct Generator {
    registry: Arc<Registry>,
    filter: Filter,
}

impl Generator {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        let filter = Filter::new(registry.introspector());
        Self { registry, filter }
    }

    /// Generate the path of `handler_id` for `values`
    ///
    /// # Arguments
    ///
    /// * `handler_id` - Fully qualified handler id
    /// * `values` - Argument values in handler parameter order; a composite
    ///   parameter takes either one prebuilt [`Value::Composite`] or one raw
    ///   value per constructor field
    ///
    /// # Errors
    ///
    /// - `InvalidNamespace` / `NotFound` when the handler cannot be reversed
    /// - `InvalidArgument` when a value fails validation, a required value
    ///   is missing, or a value's text contains `/`
    /// - `NotFound` when values are left over after every parameter
    pub fn generate(
        &self,
        handler_id: &str,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<String, RouteError> {
        let reverse = self.registry.reverse(handler_id)?;
        let mut values: VecDeque<Value> = values.into_iter().collect();
        let mut path = reverse.path.clone();
        let mut pairs: Vec<String> = Vec::with_capacity(reverse.required_count);

        for param in &reverse.parameters {
            if param.variadic {
                while !values.is_empty() {
                    let segments = self.segments(param, handler_id, &mut values)?;
                    path.push_str(&segments);
                }
                break;
            }

            let segments = self.segments(param, handler_id, &mut values)?;
            if param.is_required() {
                pairs.push(segments.trim_start_matches('/').to_string());
            } else {
                path.push_str(&segments);
            }
        }

        if !values.is_empty() {
            return Err(RouteError::not_found(format!(
                "Too many arguments provided for {handler_id}"
            )));
        }

        let path = PLACEHOLDER.replace_all(&path, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| pairs.get(i))
                .map_or_else(|| caps[0].to_string(), Clone::clone)
        });
        let path = format!("/{}", path.trim_matches('/'));

        debug!(handler_id = %handler_id, path = %path, "Path generated");
        Ok(path)
    }

    /// Validate the values `param` consumes and render the originals as
    /// `/`-prefixed path text; empty for a missing optional value
    fn segments(
        &self,
        param: &ParameterDescriptor,
        handler_id: &str,
        values: &mut VecDeque<Value>,
    ) -> Result<String, RouteError> {
        if values.is_empty() && !param.is_required() {
            return Ok(String::new());
        }

        let method = self.registry.config().method();
        let original = values.clone();
        self.filter.parameter(param, handler_id, method, values)?;
        let consumed = original.len() - values.len();

        let mut segments = String::new();
        for value in original.iter().take(consumed) {
            let mut pieces = Vec::new();
            path_pieces(value, &mut pieces);
            if pieces.iter().any(|piece| piece.contains('/')) {
                return Err(ArgumentError {
                    expected: "slash-free",
                    declaring: handler_id.to_string(),
                    method: method.to_string(),
                    position: param.position,
                    name: param.name.clone(),
                    value: Some(value.clone()),
                }
                .into());
            }
            for piece in pieces {
                segments.push('/');
                segments.push_str(&piece);
            }
        }
        Ok(segments)
    }
}

/// Segment texts of a value; composite fields each take their own segment
fn path_pieces(value: &Value, pieces: &mut Vec<String>) {
    match value {
        Value::Composite { fields, .. } => {
            for field in fields {
                path_pieces(field, pieces);
            }
        }
        other => pieces.push(other.to_string()),
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::Config;
    use crate::types::TypeTag;

    fn generator() -> Generator {
        let catalog = Catalog::new("App::Http")
            .handler("App::Http::Get", [])
            .handler(
                "App::Http::FooItem::GetFooItem",
                [ParameterDescriptor::required("id", TypeTag::Int)],
            )
            .handler(
                "App::Http::Tags::GetTags",
                [
                    ParameterDescriptor::required("owner", TypeTag::String),
                    ParameterDescriptor::variadic("tags", TypeTag::String),
                ],
            )
            .handler(
                "App::Http::Price::GetPrice",
                [ParameterDescriptor::required("amount", TypeTag::Float)],
            )
            .value_type("Value::Id", [ParameterDescriptor::required("id", TypeTag::Int)])
            .handler(
                "App::Http::Item::GetItem",
                [ParameterDescriptor::required("id", TypeTag::Composite("Value::Id".into()))],
            );
        let config = Config::new("App::Http", "http").with_base_url("/api");
        Generator::new(Arc::new(Registry::from_catalog(config, catalog)))
    }

    #[test]
    fn test_placeholders_are_replaced_once() {
        let generator = generator();
        // a value that looks like a placeholder is not expanded again
        let path = generator
            .generate("App::Http::FooItem::GetFooItem", [Value::from("{0}")])
            .unwrap_err();
        assert_eq!(
            path.to_string(),
            "Expected numeric integer argument for App::Http::FooItem::GetFooItem::__invoke() parameter 0 ($id), actually '{0}'"
        );

        let path = generator
            .generate("App::Http::Tags::GetTags", [Value::from("{0}"), Value::from("b")])
            .unwrap();
        assert_eq!(path, "/api/tags/{0}/b");
    }

    #[test]
    fn test_original_value_text_is_kept() {
        let generator = generator();
        let path = generator
            .generate("App::Http::FooItem::GetFooItem", [Value::from("007")])
            .unwrap();
        assert_eq!(path, "/api/foo-item/007");
    }

    #[test]
    fn test_root_without_values() {
        assert_eq!(generator().generate("App::Http::Get", []).unwrap(), "/api");
    }

    #[test]
    fn test_prebuilt_composite_fields_are_validated() {
        let generator = generator();
        let id = |field: Value| Value::Composite {
            type_name: "Value::Id".into(),
            fields: vec![field],
        };

        let path = generator.generate("App::Http::Item::GetItem", [id(Value::Int(5))]).unwrap();
        assert_eq!(path, "/api/item/5");

        let err = generator
            .generate("App::Http::Item::GetItem", [id(Value::from("z"))])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected numeric integer argument for Value::Id::new() parameter 0 ($id), actually 'z'"
        );
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        let generator = generator();
        assert_eq!(
            generator.generate("App::Http::Price::GetPrice", [Value::Float(2.5)]).unwrap(),
            "/api/price/2.5"
        );
        for amount in [f64::INFINITY, f64::NAN] {
            let err = generator
                .generate("App::Http::Price::GetPrice", [Value::Float(amount)])
                .unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_slash_in_value_is_rejected() {
        let generator = generator();
        let err = generator
            .generate("App::Http::Tags::GetTags", [Value::from("a/b")])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected slash-free argument for App::Http::Tags::GetTags::__invoke() parameter 0 ($owner), actually 'a/b'"
        );

        let err = generator
            .generate("App::Http::Tags::GetTags", [Value::from("a"), Value::from("b/c")])
            .unwrap_err();
        assert!(err.to_string().contains("parameter 1 ($tags)"));
    }
}
