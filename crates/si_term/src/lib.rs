#![cfg_attr(docsrs, feature(doc_cfg))]

//! # si-term
//!
//! The expression DAG the rest of the synthesis engine operates on: a
//! hash-consed, immutable term graph with a closed `Kind` enumeration,
//! plus the arithmetic operators transition inference and solution
//! post-processing need.
//!
//! Nodes never mutate. Every transformation (`mk_and`, `substitute`,
//! `push_negation`, ...) takes the graph handle and returns a new
//! [`NodeId`]; structural equality is `NodeId` equality after
//! hash-consing.

pub mod graph;
pub mod node;
pub mod walk;

pub use graph::TermGraph;
pub use node::{Kind, Literal, NodeData, NodeId, Type};
pub use walk::{free_bound_vars, push_negation, size_and_ite_count, substitute};
