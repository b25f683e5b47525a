//! # Filter Module
//!
//! Casts raw argument values into the types declared by handler parameters.
//!
//! ## Overview
//!
//! The router hands the filter one path segment at a time (as
//! [`Value::String`]); the generator hands it whatever values the caller
//! supplied. In both cases the filter:
//!
//! 1. rejects blank input (missing value, whitespace-only string, empty array)
//! 2. casts according to the declared [`TypeTag`]
//! 3. for composite types, consumes one raw value per constructor parameter
//!    and builds a [`Value::Composite`]
//!
//! Failures are reported as [`ArgumentError`] carrying the declaring handler,
//! the method, the parameter position and name, and the rejected raw value.
//!
//! ## Casting Rules
//!
//! | Type | Accepts |
//! |------|---------|
//! | `int` | integers, numeric strings whose integer value equals the number (`"07"` but not `"1.5"`) |
//! | `float` | any finite numeric value |
//! | `bool` | `1 t true y yes` / `0 f false n no`, case-insensitive; native booleans |
//! | `string`, `mixed` | anything, stringified |
//! | `array` | native arrays; otherwise comma-separated text |

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{ArgumentError, RouteError};
use crate::introspect::Introspector;
use crate::types::{ParameterDescriptor, TypeTag, Value};

/// Method name reported for composite constructor parameters
pub const CONSTRUCTOR_METHOD: &str = "new";

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$")
        .expect("numeric pattern is valid")
});

const TRUTHY: [&str; 5] = ["1", "t", "true", "y", "yes"];
const FALSY: [&str; 5] = ["0", "f", "false", "n", "no"];

/// Typed-argument caster shared by the router and the generator.
#[derive(Clone)]
pub struct Filter {
    introspector: Arc<dyn Introspector>,
}

impl Filter {
    pub fn new(introspector: Arc<dyn Introspector>) -> Self {
        Self { introspector }
    }

    /// Consume raw value(s) from the front of `values` and cast them into the
    /// type declared by `param`.
    ///
    /// Scalars consume exactly one value. Composites consume one value per
    /// constructor parameter while values remain.
    ///
    /// # Arguments
    ///
    /// * `param` - The declared parameter
    /// * `declaring` - Handler id (or composite type name) that declares it
    /// * `method` - Method that declares it
    /// * `values` - Remaining raw values
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when a value is blank or cannot be cast, and
    /// `NotFound` when a composite type is unknown to the introspector.
    pub fn parameter(
        &self,
        param: &ParameterDescriptor,
        declaring: &str,
        method: &str,
        values: &mut VecDeque<Value>,
    ) -> Result<Value, RouteError> {
        self.cast(param, declaring, method, values, &mut Vec::new())
    }

    /// `building` holds the composite types under construction, outermost
    /// first
    fn cast(
        &self,
        param: &ParameterDescriptor,
        declaring: &str,
        method: &str,
        values: &mut VecDeque<Value>,
        building: &mut Vec<String>,
    ) -> Result<Value, RouteError> {
        if let TypeTag::Composite(type_name) = &param.type_tag {
            return self.to_composite(param, type_name, declaring, method, values, building);
        }

        let value = values.pop_front();
        let invalid = |expected: &'static str, value: Option<Value>| ArgumentError {
            expected,
            declaring: declaring.to_string(),
            method: method.to_string(),
            position: param.position,
            name: param.name.clone(),
            value,
        };

        let value = match value {
            Some(value) if !is_blank(&value) => value,
            other => return Err(invalid("non-blank", other).into()),
        };

        let cast = match &param.type_tag {
            TypeTag::Int => to_int(&value).ok_or("numeric integer"),
            TypeTag::Float => to_float(&value).ok_or("numeric float"),
            TypeTag::Bool => to_bool(&value).ok_or("boolean-equivalent"),
            TypeTag::Array => Ok(to_array(value.clone())),
            TypeTag::String | TypeTag::Untyped | TypeTag::Composite(_) => {
                Ok(to_string(value.clone()))
            }
        };

        cast.map_err(|expected| invalid(expected, Some(value)).into())
    }

    fn to_composite(
        &self,
        param: &ParameterDescriptor,
        type_name: &str,
        declaring: &str,
        method: &str,
        values: &mut VecDeque<Value>,
        building: &mut Vec<String>,
    ) -> Result<Value, RouteError> {
        if building.iter().any(|outer| outer == type_name) {
            return Err(RouteError::not_found(format!(
                "Value type {type_name} contains itself"
            )));
        }
        let ctor_params = self
            .introspector
            .constructor_parameters(type_name)
            .ok_or_else(|| RouteError::not_found(format!("Value type not found: {type_name}")))?;

        building.push(type_name.to_string());
        let built = self.composite(param, type_name, ctor_params, declaring, method, values, building);
        building.pop();
        built
    }

    #[allow(clippy::too_many_arguments)]
    fn composite(
        &self,
        param: &ParameterDescriptor,
        type_name: &str,
        ctor_params: &[ParameterDescriptor],
        declaring: &str,
        method: &str,
        values: &mut VecDeque<Value>,
        building: &mut Vec<String>,
    ) -> Result<Value, RouteError> {
        // an already-built value of the right type is re-checked field by field
        if matches!(values.front(), Some(Value::Composite { type_name: given, .. }) if given == type_name) {
            if let Some(Value::Composite { fields, .. }) = values.pop_front() {
                let mut fields = VecDeque::from(fields);
                let built = self.fields(type_name, ctor_params, &mut fields, building)?;
                if !fields.is_empty() {
                    return Err(RouteError::not_found(format!(
                        "Too many fields provided for {type_name}::{CONSTRUCTOR_METHOD}()"
                    )));
                }
                return Ok(built);
            }
        }

        if values.is_empty() && param.is_required() {
            return Err(ArgumentError {
                expected: "non-blank",
                declaring: declaring.to_string(),
                method: method.to_string(),
                position: param.position,
                name: param.name.clone(),
                value: None,
            }
            .into());
        }

        self.fields(type_name, ctor_params, values, building)
    }

    /// Cast one value per constructor parameter while values remain
    fn fields(
        &self,
        type_name: &str,
        ctor_params: &[ParameterDescriptor],
        values: &mut VecDeque<Value>,
        building: &mut Vec<String>,
    ) -> Result<Value, RouteError> {
        let mut fields = Vec::with_capacity(ctor_params.len());
        for ctor_param in ctor_params {
            if values.is_empty() {
                if ctor_param.is_required() {
                    return Err(ArgumentError {
                        expected: "non-blank",
                        declaring: type_name.to_string(),
                        method: CONSTRUCTOR_METHOD.to_string(),
                        position: ctor_param.position,
                        name: ctor_param.name.clone(),
                        value: None,
                    }
                    .into());
                }
                break;
            }
            fields.push(self.cast(ctor_param, type_name, CONSTRUCTOR_METHOD, values, building)?);
        }

        Ok(Value::Composite {
            type_name: type_name.to_string(),
            fields,
        })
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Does this text look like a number (sign, digits, fraction, exponent)?
#[must_use]
pub fn is_numeric(text: &str) -> bool {
    NUMERIC.is_match(text)
}

fn to_int(value: &Value) -> Option<Value> {
    match value {
        Value::Int(i) => Some(Value::Int(*i)),
        Value::Float(f) => float_to_int(*f),
        Value::String(s) if is_numeric(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(Value::Int(i));
            }
            trimmed.parse::<f64>().ok().and_then(float_to_int)
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_int(f: f64) -> Option<Value> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Some(Value::Int(f as i64));
    }
    None
}

#[allow(clippy::cast_precision_loss)]
fn to_float(value: &Value) -> Option<Value> {
    let float = match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::String(s) if is_numeric(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    float.filter(|f| f.is_finite()).map(Value::Float)
}

fn to_bool(value: &Value) -> Option<Value> {
    let text = match value {
        Value::Bool(b) => return Some(Value::Bool(*b)),
        Value::String(s) => s.to_lowercase(),
        Value::Int(_) | Value::Float(_) => value.to_string(),
        _ => return None,
    };
    if TRUTHY.contains(&text.as_str()) {
        Some(Value::Bool(true))
    } else if FALSY.contains(&text.as_str()) {
        Some(Value::Bool(false))
    } else {
        None
    }
}

fn to_array(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items),
        other => Value::Array(
            split_csv(&other.to_string())
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
    }
}

fn to_string(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s),
        other => Value::String(other.to_string()),
    }
}

/// Split one line of comma-separated text, honoring double quotes (`""`
/// inside a quoted field is a literal quote).
#[must_use]
pub fn split_csv(text: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
