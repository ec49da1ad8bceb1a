#![cfg_attr(docsrs, feature(doc_cfg))]

//! # si-base
//!
//! Shared structural atoms for the single-invocation synthesis engine:
//!
//! - [`Interner`]/[`Symbol`] — name interning for O(1) equality
//! - [`SiError`]/[`Result`] — the engine's fatal-error type
//!
//! This crate has no knowledge of terms, conjectures, or the CEGIS loop.
//! It provides only the generic infrastructure the rest of the workspace
//! builds on.

pub mod error;
pub mod intern;

pub use error::{Result, SiError};
pub use intern::{Interner, Symbol, SymbolEq};
