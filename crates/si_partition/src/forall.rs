//! A memoized check for an embedded `FORALL` anywhere under a node.
//!
//! Partitioning bails on an embedded quantifier; the check has to see
//! the entire subtree, not just the
//! top decomposition layer, since a quantifier can hide inside a
//! literal conjunct.

use std::collections::HashMap;

use si_term::{Kind, NodeId, TermGraph};

pub(crate) fn contains_forall(g: &TermGraph, n: NodeId) -> bool {
    let mut memo = HashMap::new();
    contains_forall_rec(g, n, &mut memo)
}

fn contains_forall_rec(g: &TermGraph, n: NodeId, memo: &mut HashMap<NodeId, bool>) -> bool {
    if let Some(&r) = memo.get(&n) {
        return r;
    }
    let result = if g.kind(n) == Kind::Forall {
        true
    } else {
        g.children(n).into_iter().any(|c| contains_forall_rec(g, c, memo))
    };
    memo.insert(n, result);
    result
}
