//! # autoroute
//!
//! **autoroute** maps HTTP requests onto a hierarchical registry of handler
//! classes by naming convention alone. There is no route table to maintain:
//! the URL path walks the namespace tree, and whatever is not a namespace
//! becomes a typed argument of the handler found so far.
//!
//! ## Overview
//!
//! ```text
//! GET /api/foo-item/42/edit
//!   -> App::Http::FooItem::Edit::GetFooItemEdit::__invoke(42)
//! ```
//!
//! A handler lives at `<Namespace>::<Token>...::<Verb><Tokens><Suffix>`.
//! URL segments are converted to tokens by splitting on the word separator
//! and capitalizing each word (`foo-item` -> `FooItem`).
//!
//! ## Architecture
//!
//! - **[`registry`]** - handler lookup, naming conventions, cached descriptors
//! - **[`router`]** - verb + path to handler id and arguments
//! - **[`filter`]** - typed conversion of captured segments
//! - **[`reverser`]** / **[`generator`]** - handler id back to a path
//! - **[`dumper`]** - every route of a registry as a table
//! - **[`creator`]** - scaffolding of handler files for a verb and a path
//! - **[`catalog`]** / **[`tree`]** - the registry's view of handler
//!   signatures and of the namespace tree
//! - **[`cli`]** - the `autoroute` command-line tool
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use autoroute::{Catalog, Config, ParameterDescriptor, Registry, Router, TypeTag};
//!
//! let catalog = Catalog::new("App::Http").handler(
//!     "App::Http::FooItem::GetFooItem",
//!     [ParameterDescriptor::required("id", TypeTag::Int)],
//! );
//! let config = Config::new("App::Http", "src/http").with_base_url("/api");
//! let router = Router::new(Arc::new(Registry::from_catalog(config, catalog)));
//!
//! let route = router.route("GET", "/api/foo-item/42");
//! assert!(route.is_ok());
//! assert_eq!(route.handler_id, "App::Http::FooItem::GetFooItem");
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod creator;
pub mod dumper;
pub mod error;
pub mod filter;
pub mod generator;
pub mod introspect;
pub mod logging;
pub mod registry;
pub mod reverser;
pub mod router;
pub mod tree;
pub mod types;

pub use catalog::Catalog;
pub use config::Config;
pub use creator::{Creator, Scaffold};
pub use dumper::{Dumper, RouteTable};
pub use error::{ErrorKind, RouteError};
pub use filter::Filter;
pub use generator::Generator;
pub use introspect::Introspector;
pub use registry::{Action, Registry, Reverse};
pub use reverser::Reverser;
pub use router::{Route, Router};
pub use tree::{FsTree, NamespaceTree};
pub use types::{ParameterDescriptor, TypeTag, Value};
