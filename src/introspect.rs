use crate::types::ParameterDescriptor;

/// Capability that answers questions about handlers and value types.
///
/// The routing core never discovers handler signatures on its own; it asks an
/// `Introspector`. [`crate::catalog::Catalog`] is the in-crate implementation,
/// populated through its builder or a manifest file. Other implementations
/// (generated tables, registries filled at startup) only need these three
/// lookups.
///
/// Implementations must be `Send + Sync`: one introspector is shared by every
/// router, generator and dumper built from the same registry.
pub trait Introspector: Send + Sync {
    /// Does a handler with this id exist?
    fn exists(&self, handler_id: &str) -> bool;

    /// Ordered parameters of the handler's method, ignored leading parameters
    /// included. `None` when the handler is unknown.
    fn parameters(&self, handler_id: &str) -> Option<&[ParameterDescriptor]>;

    /// Ordered constructor parameters of a composite value type. `None` when
    /// the type is unknown.
    fn constructor_parameters(&self, type_name: &str) -> Option<&[ParameterDescriptor]>;
}
