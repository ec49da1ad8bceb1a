#![cfg_attr(docsrs, feature(doc_cfg))]

//! # si-match
//!
//! Instantiation dedup and deterministic-trace tracking: [`MatchTrie`]
//! and [`DetTrace`], both built on the same node-identity prefix tree
//! ([`trie::PathTrie`]).

mod det_trace;
mod match_trie;
mod trie;

pub use det_trace::DetTrace;
pub use match_trie::{MatchTrie, ScopedMatchTrie};
