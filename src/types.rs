use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of a handler or constructor parameter.
///
/// Scalars are cast directly by the [`crate::filter::Filter`]; `Composite`
/// names a value type whose constructor parameters are looked up through the
/// [`crate::Introspector`] and filled recursively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeTag {
    Int,
    Float,
    Bool,
    String,
    Array,
    Composite(String),
    Untyped,
}

impl TypeTag {
    /// Short name used in dumped route templates (`{int:id}`)
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::Composite(name) => name.as_str(),
            TypeTag::Untyped => "mixed",
        }
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.trim() {
            "int" | "integer" => TypeTag::Int,
            "float" | "double" => TypeTag::Float,
            "bool" | "boolean" => TypeTag::Bool,
            "string" | "str" => TypeTag::String,
            "array" => TypeTag::Array,
            "" | "mixed" | "untyped" => TypeTag::Untyped,
            other if other.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ':') => {
                TypeTag::Composite(other.to_string())
            }
            other => return Err(format!("invalid parameter type '{other}'")),
        };
        Ok(tag)
    }
}

impl TryFrom<String> for TypeTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One declared parameter of a handler method or a composite constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    /// 0-based position in the declaring signature (ignored leading
    /// parameters included)
    #[serde(default)]
    pub position: usize,
    #[serde(rename = "type", default = "untyped")]
    pub type_tag: TypeTag,
    #[serde(default)]
    pub optional: bool,
    /// Absorbs all remaining values; always last, always optional
    #[serde(default)]
    pub variadic: bool,
}

fn untyped() -> TypeTag {
    TypeTag::Untyped
}

impl ParameterDescriptor {
    /// A required parameter
    pub fn required(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            position: 0,
            type_tag,
            optional: false,
            variadic: false,
        }
    }

    /// An optional parameter
    pub fn optional(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            optional: true,
            ..Self::required(name, type_tag)
        }
    }

    /// A trailing variadic parameter
    pub fn variadic(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            optional: true,
            variadic: true,
            ..Self::required(name, type_tag)
        }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.optional && !self.variadic
    }
}

/// A raw or filtered argument value.
///
/// Router input is always `String` (one per path segment); Generator input
/// may be any variant. Filtered output carries the declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Array(Vec<Value>),
    Composite { type_name: String, fields: Vec<Value> },
}

impl Value {
    /// Build an array value from anything convertible into values
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render a value for diagnostics: strings quoted, a missing value as
    /// `NULL`, arrays bracketed.
    #[must_use]
    pub fn export(value: Option<&Value>) -> String {
        let Some(value) = value else {
            return "NULL".to_string();
        };
        match value {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
            Value::Array(items) => {
                let inner: Vec<String> = items.iter().map(|v| Value::export(Some(v))).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Composite { type_name, fields } => {
                let inner: Vec<String> = fields.iter().map(|v| Value::export(Some(v))).collect();
                format!("{}({})", type_name, inner.join(", "))
            }
        }
    }
}

/// Path form of a value: the text placed into a generated URL segment.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", if *b { "1" } else { "0" }),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Composite { fields, .. } => {
                let parts: Vec<String> = fields.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join("/"))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(v: Vec<V>) -> Self {
        Value::array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_parse() {
        assert_eq!("int".parse::<TypeTag>().unwrap(), TypeTag::Int);
        assert_eq!("mixed".parse::<TypeTag>().unwrap(), TypeTag::Untyped);
        assert_eq!(
            "Value::Id".parse::<TypeTag>().unwrap(),
            TypeTag::Composite("Value::Id".to_string())
        );
        assert!("not a type".parse::<TypeTag>().is_err());
    }

    #[test]
    fn test_value_path_form() {
        assert_eq!(Value::from(2.3).to_string(), "2.3");
        assert_eq!(Value::from(2.0).to_string(), "2");
        assert_eq!(Value::from(true).to_string(), "1");
        assert_eq!(Value::from(vec!["a", "b", "c"]).to_string(), "a,b,c");
    }

    #[test]
    fn test_value_export() {
        assert_eq!(Value::export(None), "NULL");
        assert_eq!(Value::export(Some(&Value::from(" "))), "' '");
        assert_eq!(Value::export(Some(&Value::from(7))), "7");
    }
}
