//! `InstantiationRecord` — the ordered, deduplicated log of accepted
//! instantiations a [`crate::solver::SingleInvSolver`] builds up over the
//! course of its check loop.
//!
//! Each accepted instantiation pairs a substitution tuple (deduplicated
//! through a [`ScopedMatchTrie`]) with the guard condition that selects it
//! and the per-synthesis-function value it contributes; solution
//! construction later folds these into an ITE cascade.

use si_match::ScopedMatchTrie;
use si_term::{push_negation, NodeId, TermGraph};

/// One conjecture's worth of recorded instantiations, scoped for
/// incremental (push/pop) backtracking.
pub struct InstantiationRecord {
    trie: ScopedMatchTrie,
    conjecture: NodeId,
    /// The guard disequality stored per instantiation — the *negated*
    /// form of the condition that selects this instantiation's branch,
    /// mirroring the guard literal an instantiation engine asserts to
    /// keep a concrete point from being proposed twice.
    lemmas_produced: Vec<NodeId>,
    /// The raw substitution tuple, in case a caller needs to replay it
    /// (e.g. the partial-SI verification lemma).
    subs: Vec<Vec<NodeId>>,
    /// Per-instantiation, per-synthesis-function solution value.
    values: Vec<Vec<NodeId>>,
    scope_lens: Vec<usize>,
}

impl InstantiationRecord {
    pub fn new(conjecture: NodeId) -> Self {
        InstantiationRecord {
            trie: ScopedMatchTrie::new(),
            conjecture,
            lemmas_produced: Vec::new(),
            subs: Vec::new(),
            values: Vec::new(),
            scope_lens: Vec::new(),
        }
    }

    /// Records `subs` under `cond` (the positive branch condition, e.g.
    /// `s = 0`) with one solution value per synthesis function. Returns
    /// `false` — no progress — if this exact `subs` tuple was already
    /// recorded for this conjecture.
    pub fn record(
        &mut self,
        g: &mut TermGraph,
        subs: Vec<NodeId>,
        cond: NodeId,
        values: Vec<NodeId>,
    ) -> bool {
        if !self.trie.add(self.conjecture, &subs) {
            return false;
        }
        let guard = push_negation(g, cond, true);
        self.lemmas_produced.push(guard);
        self.subs.push(subs);
        self.values.push(values);
        true
    }

    pub fn push_scope(&mut self) {
        self.trie.push();
        self.scope_lens.push(self.lemmas_produced.len());
    }

    pub fn pop_scope(&mut self) {
        self.trie.pop();
        let len = self.scope_lens.pop().expect("pop without matching push");
        self.lemmas_produced.truncate(len);
        self.subs.truncate(len);
        self.values.truncate(len);
    }

    pub fn reset(&mut self) {
        self.trie = ScopedMatchTrie::new();
        self.lemmas_produced.clear();
        self.subs.clear();
        self.values.clear();
        self.scope_lens.clear();
    }

    pub fn len(&self) -> usize {
        self.lemmas_produced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas_produced.is_empty()
    }

    pub fn lemmas_produced(&self) -> &[NodeId] {
        &self.lemmas_produced
    }

    pub fn subs(&self, index: usize) -> &[NodeId] {
        &self.subs[index]
    }

    pub fn value(&self, index: usize, program: usize) -> NodeId {
        self.values[index][program]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::Type;

    #[test]
    fn duplicate_subs_are_rejected() {
        let mut g = TermGraph::new();
        let q = g.mk_bool(true);
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);
        let cond = g.mk_eq(x, zero);
        let mut rec = InstantiationRecord::new(q);
        assert!(rec.record(&mut g, vec![zero], cond, vec![zero]));
        assert!(!rec.record(&mut g, vec![zero], cond, vec![zero]));
        assert_eq!(rec.len(), 1);
    }

    #[test]
    fn pop_scope_forgets_instantiations_added_since_push() {
        let mut g = TermGraph::new();
        let q = g.mk_bool(true);
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);
        let one = g.mk_int(1);
        let cond0 = g.mk_eq(x, zero);
        let cond1 = g.mk_eq(x, one);
        let mut rec = InstantiationRecord::new(q);
        assert!(rec.record(&mut g, vec![zero], cond0, vec![zero]));
        rec.push_scope();
        assert!(rec.record(&mut g, vec![one], cond1, vec![one]));
        assert_eq!(rec.len(), 2);
        rec.pop_scope();
        assert_eq!(rec.len(), 1);
        // the popped instantiation is eligible again
        assert!(rec.record(&mut g, vec![one], cond1, vec![one]));
    }

    #[test]
    fn lemmas_produced_stores_the_negated_condition() {
        let mut g = TermGraph::new();
        let q = g.mk_bool(true);
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);
        let cond = g.mk_eq(x, zero);
        let mut rec = InstantiationRecord::new(q);
        rec.record(&mut g, vec![zero], cond, vec![zero]);
        let expected_guard = push_negation(&mut g, cond, true);
        assert_eq!(rec.lemmas_produced()[0], expected_guard);
    }
}
