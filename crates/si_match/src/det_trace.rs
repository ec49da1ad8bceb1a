//! `DetTrace`: one deterministic execution, as a finite set of visited
//! value tuples.

use si_term::{NodeId, TermGraph};

use crate::trie::PathTrie;

/// Tracks the visited-tuple set of one deterministic unfolding and the
/// current value vector.
#[derive(Default)]
pub struct DetTrace {
    trie: PathTrie,
    pub curr: Vec<NodeId>,
}

impl DetTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `(loc, vals)`. Returns `false` — *loop detected* — if this
    /// exact tuple was already visited; otherwise records it, advances
    /// `curr`, and returns `true`.
    pub fn increment(&mut self, loc: NodeId, vals: Vec<NodeId>) -> bool {
        let mut path = Vec::with_capacity(vals.len() + 1);
        path.push(loc);
        path.extend(vals.iter().copied());
        let inserted = self.trie.insert(&path);
        if inserted {
            self.curr = vals;
        }
        inserted
    }

    /// A formula in DNF expressing the finite visited-tuple set as
    /// equalities on `vars`. An empty trace returns `true`.
    pub fn construct_formula(&self, g: &mut TermGraph, vars: &[NodeId]) -> NodeId {
        construct_formula_rec(g, &self.trie, vars, 0)
    }
}

/// `depth == 0` is the `loc` level — a single fixed node per trace, not
/// compared against `vars` — every subsequent level corresponds to
/// `vars[depth - 1]`.
fn construct_formula_rec(g: &mut TermGraph, node: &PathTrie, vars: &[NodeId], depth: usize) -> NodeId {
    if node.children.is_empty() {
        return g.mk_bool(true);
    }
    let mut disjuncts = Vec::with_capacity(node.children.len());
    for (value, child) in &node.children {
        let sub = construct_formula_rec(g, child, vars, depth + 1);
        let conjunct = if depth == 0 {
            sub
        } else {
            let eq = g.mk_eq(vars[depth - 1], *value);
            g.mk_and(vec![eq, sub])
        };
        disjuncts.push(conjunct);
    }
    g.mk_or(disjuncts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_returns_false_on_repeat() {
        let mut g = TermGraph::new();
        let loc = g.mk_skolem("loc", si_term::Type::Bool);
        let v0 = g.mk_int(0);
        let mut dt = DetTrace::new();
        assert!(dt.increment(loc, vec![v0]));
        assert!(!dt.increment(loc, vec![v0]));
    }

    #[test]
    fn curr_tracks_latest_inserted_tuple() {
        let mut g = TermGraph::new();
        let loc = g.mk_skolem("loc", si_term::Type::Bool);
        let v0 = g.mk_int(0);
        let v1 = g.mk_int(1);
        let mut dt = DetTrace::new();
        dt.increment(loc, vec![v0]);
        dt.increment(loc, vec![v1]);
        assert_eq!(dt.curr, vec![v1]);
    }

    #[test]
    fn empty_trace_formula_is_true() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", si_term::Type::Int);
        let dt = DetTrace::new();
        let f = dt.construct_formula(&mut g, &[x]);
        assert_eq!(f, g.mk_bool(true));
    }

    #[test]
    fn formula_is_disjunction_of_tuple_equalities() {
        let mut g = TermGraph::new();
        let loc = g.mk_skolem("loc", si_term::Type::Bool);
        let x = g.mk_bound_var("x", si_term::Type::Int);
        let y = g.mk_bound_var("y", si_term::Type::Int);
        let mut dt = DetTrace::new();
        for k in 0..4 {
            let vk = g.mk_int(k);
            dt.increment(loc, vec![vk, vk]);
        }
        let formula = dt.construct_formula(&mut g, &[x, y]);
        match g.data(formula) {
            si_term::NodeData::Or(cs) => assert_eq!(cs.len(), 4),
            other => panic!("expected Or, got {other:?}"),
        }
    }
}
