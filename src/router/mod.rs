//! # Router Module
//!
//! Resolves an HTTP verb and path to a handler id and typed arguments by
//! convention, with no route table.
//!
//! ## Overview
//!
//! The path (minus the base URL) is split on `/`. Segments are consumed left
//! to right: each one either extends the namespace sub-path (`foo-item` ->
//! `FooItem`) or becomes an argument of the handler adopted so far. A
//! handler answers at a sub-path when a class named
//! `<Verb><Tokens><Suffix>` exists there.
//!
//! ```text
//! GET /foo-item/42/edit
//!   foo-item  -> App::Http::FooItem::GetFooItem
//!   42        -> argument 0 ($id)
//!   edit      -> App::Http::FooItem::Edit::GetFooItemEdit
//!
//! GET /foo-item/add
//!   foo-item  -> App::Http::FooItem::GetFooItem
//!   add       -> static tail, App::Http::FooItem::Add::GetFooItemAdd
//! ```
//!
//! Each pass of the capture loop runs these steps:
//!
//! 1. **Sub-path**: consume a segment as a namespace token; an unknown
//!    top-level token may fall through to a root handler with parameters
//! 2. **Main handler**: adopt `<Verb><Tokens>` at the sub-path, or descend
//!    further when it is missing and segments remain
//! 3. **Static tail**: a single remaining segment naming a more specific
//!    handler is consumed as part of the name
//! 4. **Required arguments**: parameters beyond those already captured
//! 5. **Namespace lookahead**: stop if the next segment extends the sub-path
//! 6. **Optional arguments**: fill optional and variadic parameters; any
//!    leftover segment is an error
//!
//! ## Errors
//!
//! Routing never panics and never returns `Err`: the returned [`Route`]
//! carries the [`crate::RouteError`], the `allowed` header for
//! method-not-allowed failures, and the step-by-step trace.

mod core;

pub use core::{ArgumentVec, Route, Router, MAX_INLINE_ARGUMENTS, TRACE_TARGET};
