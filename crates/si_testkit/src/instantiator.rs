//! [`MockInstantiator`]: feeds a fixed, pre-scripted queue of candidate
//! substitutions through [`InstantiatorCallback`] instead of deriving them
//! from e-matching over a live congruence closure.

use std::collections::VecDeque;

use si_solver::{InstantiatorCallback, Instantiator};
use si_term::NodeId;

/// Each round's `check` drains one batch of candidate substitutions.
/// Returns `false` once the queue is empty, matching the real
/// instantiator's "nothing more to propose this round" signal.
pub struct MockInstantiator {
    rounds: VecDeque<Vec<Vec<NodeId>>>,
    extra_lemmas: Vec<NodeId>,
}

impl MockInstantiator {
    pub fn new() -> Self {
        MockInstantiator { rounds: VecDeque::new(), extra_lemmas: Vec::new() }
    }

    /// Queues one round worth of candidate substitutions, each a
    /// `subs` vector matching the partition's `si_vars` arity.
    pub fn push_round(&mut self, candidates: Vec<Vec<NodeId>>) {
        self.rounds.push_back(candidates);
    }

    /// A lemma to push via `add_lemma` the next time `check` runs,
    /// independent of any candidate substitution.
    pub fn push_lemma(&mut self, n: NodeId) {
        self.extra_lemmas.push(n);
    }
}

impl Default for MockInstantiator {
    fn default() -> Self {
        Self::new()
    }
}

impl Instantiator for MockInstantiator {
    fn check(&mut self, cb: &mut dyn InstantiatorCallback) -> bool {
        for lemma in self.extra_lemmas.drain(..) {
            cb.add_lemma(lemma);
        }
        match self.rounds.pop_front() {
            Some(candidates) => {
                for subs in candidates {
                    if subs.iter().all(|n| cb.is_eligible_for_instantiation(*n)) {
                        cb.do_add_instantiation(&subs);
                    }
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::TermGraph;
    use std::cell::RefCell;

    struct RecordingCb {
        accepted: RefCell<Vec<Vec<NodeId>>>,
    }

    impl InstantiatorCallback for RecordingCb {
        fn do_add_instantiation(&mut self, subs: &[NodeId]) -> bool {
            self.accepted.borrow_mut().push(subs.to_vec());
            true
        }
        fn is_eligible_for_instantiation(&self, _n: NodeId) -> bool {
            true
        }
        fn add_lemma(&mut self, _n: NodeId) -> bool {
            true
        }
    }

    #[test]
    fn drains_one_round_per_check_call() {
        let mut g = TermGraph::new();
        let a = g.mk_int(1);
        let b = g.mk_int(2);
        let mut inst = MockInstantiator::new();
        inst.push_round(vec![vec![a]]);
        inst.push_round(vec![vec![b]]);
        let mut cb = RecordingCb { accepted: RefCell::new(Vec::new()) };

        assert!(inst.check(&mut cb));
        assert!(inst.check(&mut cb));
        assert!(!inst.check(&mut cb));
        assert_eq!(*cb.accepted.borrow(), vec![vec![a], vec![b]]);
    }
}
