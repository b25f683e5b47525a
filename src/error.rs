use std::fmt;

use crate::types::Value;

/// Classification of a routing or generation failure.
///
/// Mirrors the variants of [`RouteError`] without their payloads so callers
/// can branch on the kind cheaply (e.g. map `NotFound` to a 404).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed path input (parent traversal, empty segment)
    InvalidPath,
    /// Handler id outside the configured registry namespace
    InvalidNamespace,
    /// No matching node, handler or route; wrong argument count
    NotFound,
    /// Node has handlers, but not for the requested verb
    MethodNotAllowed,
    /// A value failed type casting
    InvalidArgument,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidPath => "InvalidPath",
            ErrorKind::InvalidNamespace => "InvalidNamespace",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::InvalidArgument => "InvalidArgument",
        };
        write!(f, "{}", s)
    }
}

/// Details of a value that failed casting into its declared parameter type.
///
/// Carries everything needed to reproduce the diagnostic exactly:
/// `Expected numeric integer argument for App::Http::FooItem::GetFooItem::__invoke() parameter 0 ($id), actually 'z'`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentError {
    /// What the value was expected to be (`non-blank`, `numeric integer`, ...)
    pub expected: &'static str,
    /// Handler id (or composite type name) declaring the parameter
    pub declaring: String,
    /// Method declaring the parameter (handler method or composite constructor)
    pub method: String,
    /// 0-based position of the parameter in its declaring signature
    pub position: usize,
    /// Parameter name
    pub name: String,
    /// The rejected raw value; `None` when no value was supplied
    pub value: Option<Value>,
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected {} argument for {}::{}() parameter {} (${}), actually {}",
            self.expected,
            self.declaring,
            self.method,
            self.position,
            self.name,
            Value::export(self.value.as_ref())
        )
    }
}

/// Error raised while routing, reversing or generating a path.
///
/// Registry and Filter return this through `Result`; the Router folds it into
/// the returned [`crate::Route`] and the Generator hands it back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteError {
    /// Malformed path input
    InvalidPath(String),
    /// Handler id outside the configured namespace
    InvalidNamespace(String),
    /// Nothing routable matched
    NotFound(String),
    /// The node exists but has no handler for the verb
    MethodNotAllowed {
        /// Human-readable message
        message: String,
        /// Sorted, comma-joined verbs that are available at the node
        allowed: String,
    },
    /// A value failed casting
    InvalidArgument(ArgumentError),
}

impl RouteError {
    /// The kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouteError::InvalidPath(_) => ErrorKind::InvalidPath,
            RouteError::InvalidNamespace(_) => ErrorKind::InvalidNamespace,
            RouteError::NotFound(_) => ErrorKind::NotFound,
            RouteError::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            RouteError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        RouteError::NotFound(message.into())
    }

    pub(crate) fn invalid_path(message: impl Into<String>) -> Self {
        RouteError::InvalidPath(message.into())
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPath(msg)
            | RouteError::InvalidNamespace(msg)
            | RouteError::NotFound(msg) => write!(f, "{}", msg),
            RouteError::MethodNotAllowed { message, .. } => write!(f, "{}", message),
            RouteError::InvalidArgument(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RouteError {}

impl From<ArgumentError> for RouteError {
    fn from(err: ArgumentError) -> Self {
        RouteError::InvalidArgument(err)
    }
}
