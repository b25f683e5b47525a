use crate::types::ParameterDescriptor;

/// Routable view of one handler: its parameters split into required and
/// optional, with ignored leading parameters already removed.
///
/// Built once per handler id and shared through the registry cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    handler_id: String,
    required: Vec<ParameterDescriptor>,
    optional: Vec<ParameterDescriptor>,
}

impl Action {
    /// Partition `parameters` after skipping the first `ignore` of them
    pub fn new(handler_id: &str, parameters: &[ParameterDescriptor], ignore: usize) -> Self {
        let (required, optional): (Vec<_>, Vec<_>) = parameters
            .iter()
            .skip(ignore)
            .cloned()
            .partition(ParameterDescriptor::is_required);
        Self {
            handler_id: handler_id.to_string(),
            required,
            optional,
        }
    }

    #[must_use]
    pub fn handler_id(&self) -> &str {
        &self.handler_id
    }

    /// Required parameters from `offset` on; empty when `offset` is past the end
    #[must_use]
    pub fn required_parameters(&self, offset: usize) -> &[ParameterDescriptor] {
        self.required.get(offset..).unwrap_or(&[])
    }

    /// Optional parameters, a trailing variadic included
    #[must_use]
    pub fn optional_parameters(&self) -> &[ParameterDescriptor] {
        &self.optional
    }

    #[must_use]
    pub fn required_count(&self) -> usize {
        self.required.len()
    }

    /// Does the handler take any routed parameter at all?
    #[must_use]
    pub fn has_parameters(&self) -> bool {
        !self.required.is_empty() || !self.optional.is_empty()
    }

    /// Required then optional parameters
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.required.iter().chain(self.optional.iter())
    }
}

/// Reverse-routing template of one handler.
///
/// `path` holds positional placeholders (`/api/repo/{0}/{1}/issue/{2}`) for
/// required parameters; optional parameters are appended at generation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reverse {
    pub handler_id: String,
    /// Capitalized verb (`Get`, `Post`, ...)
    pub verb: String,
    pub path: String,
    /// Required then optional parameters
    pub parameters: Vec<ParameterDescriptor>,
    pub required_count: usize,
}
