//! Mock oracles: [`MockEntailmentOracle`] for partial single-invocation
//! refinement, [`MockUnsatCoreOracle`] for solution minimization.

use std::collections::HashMap;
use std::collections::VecDeque;

use si_solver::{EntailmentOracle, UnsatCoreOracle};
use si_term::NodeId;

/// Hands out a fixed, pre-scripted sequence of `(guard, body)` candidate
/// conjectures, then reports exhaustion.
#[derive(Default)]
pub struct MockEntailmentOracle {
    queue: VecDeque<(NodeId, NodeId)>,
}

impl MockEntailmentOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, guard: NodeId, body: NodeId) {
        self.queue.push_back((guard, body));
    }
}

impl EntailmentOracle for MockEntailmentOracle {
    fn next_conjecture(&mut self) -> Option<(NodeId, NodeId)> {
        self.queue.pop_front()
    }
}

/// Reports a fixed unsat core, or `None` to mean the real oracle declined
/// to narrow (solution construction then keeps every lemma produced).
pub struct MockUnsatCoreOracle {
    core: Option<(Vec<NodeId>, Option<HashMap<NodeId, NodeId>>)>,
}

impl MockUnsatCoreOracle {
    pub fn none() -> Self {
        MockUnsatCoreOracle { core: None }
    }

    pub fn with_core(lemmas: Vec<NodeId>, weakening: Option<HashMap<NodeId, NodeId>>) -> Self {
        MockUnsatCoreOracle { core: Some((lemmas, weakening)) }
    }
}

impl UnsatCoreOracle for MockUnsatCoreOracle {
    fn unsat_core_lemmas(&self) -> Option<(Vec<NodeId>, Option<HashMap<NodeId, NodeId>>)> {
        self.core.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::TermGraph;

    #[test]
    fn entailment_oracle_hands_out_queued_conjectures_in_order() {
        let mut g = TermGraph::new();
        let g1 = g.mk_bool(true);
        let b1 = g.mk_int(1);
        let g2 = g.mk_bool(false);
        let b2 = g.mk_int(2);
        let mut oracle = MockEntailmentOracle::new();
        oracle.push(g1, b1);
        oracle.push(g2, b2);
        assert_eq!(oracle.next_conjecture(), Some((g1, b1)));
        assert_eq!(oracle.next_conjecture(), Some((g2, b2)));
        assert_eq!(oracle.next_conjecture(), None);
    }

    #[test]
    fn unsat_core_oracle_reports_none_by_default() {
        let oracle = MockUnsatCoreOracle::none();
        assert!(oracle.unsat_core_lemmas().is_none());
    }

    #[test]
    fn unsat_core_oracle_reports_configured_core() {
        let mut g = TermGraph::new();
        let lemma = g.mk_bool(true);
        let oracle = MockUnsatCoreOracle::with_core(vec![lemma], None);
        let (lemmas, weakening) = oracle.unsat_core_lemmas().unwrap();
        assert_eq!(lemmas, vec![lemma]);
        assert!(weakening.is_none());
    }
}
