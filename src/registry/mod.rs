//! # Registry Module
//!
//! Translates between URL conventions and handler ids, and memoizes the
//! per-handler descriptors the router and generator work from.
//!
//! ## Overview
//!
//! Handler ids follow one convention:
//!
//! ```text
//! <namespace>::<Token>::...::<Verb><Token...><Suffix>
//! App::Http::FooItem::Edit::GetFooItemEdit
//! ```
//!
//! Each token is a URL segment converted to upper camel case using the word
//! separator (`foo-item` <-> `FooItem`). The registry synthesizes candidate
//! ids, asks the [`crate::Introspector`] whether they exist, and asks the
//! [`crate::NamespaceTree`] whether a node exists and which verbs it holds.
//!
//! ## Caching
//!
//! [`Action`] and [`Reverse`] descriptors are computed on first use and
//! cached for the registry's lifetime in concurrent maps. Concurrent first
//! requests for the same id may both compute a descriptor, but only the
//! first insert is kept, so every caller observes the same `Arc`.

mod action;
mod core;


pub use action::{Action, Reverse};
pub use core::{verb_class, words_to_token, Registry};
