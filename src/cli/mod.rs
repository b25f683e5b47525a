//! # CLI Module
//!
//! Command-line front end of the `autoroute` binary.
//!
//! ## Commands
//!
//! Every command takes the registry root as two positionals: the namespace
//! (`App::Http`) and the directory holding the handler tree.
//!
//! ### `dump`
//!
//! List every route the registry answers:
//!
//! ```bash
//! autoroute dump App::Http src/http --base-url /api --manifest handlers.yaml
//! ```
//!
//! ```text
//! GET     /api/foo-item/{int:id}
//!         App::Http::FooItem::GetFooItem
//! ```
//!
//! ### `create`
//!
//! Scaffold a handler file for a verb and a path; never overwrites:
//!
//! ```bash
//! autoroute create App::Http src/http GET '/company/{companyId}/employee/{employeeNum}'
//! ```
//!
//! ### `route`
//!
//! Resolve one request and show the handler, arguments and (with `--trace`)
//! every routing step.
//!
//! ### `generate`
//!
//! Build the path for a handler id and argument values.
//!
//! ## Handler Signatures
//!
//! Parameter signatures come from `--manifest` (YAML or JSON, see
//! [`crate::catalog::manifest`]). Without a manifest every file found under
//! the directory is a handler without routed parameters.
//!
//! ## Exit Status
//!
//! `0` on success; `1` with a one-line message on stdout otherwise.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands, OutputFormat, RegistryArgs};
