//! [`MockOutputChannel`]: records lemmas and phase requirements handed
//! back to the host instead of forwarding them to a real SMT core.

use si_solver::OutputChannel;
use si_term::node::Literal;
use si_term::NodeId;

#[derive(Default)]
pub struct MockOutputChannel {
    pub lemmas: Vec<NodeId>,
    pub phase_requirements: Vec<(Literal, bool)>,
}

impl MockOutputChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputChannel for MockOutputChannel {
    fn lemma(&mut self, n: NodeId) {
        self.lemmas.push(n);
    }

    fn require_phase(&mut self, l: Literal, pol: bool) {
        self.phase_requirements.push((l, pol));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::{TermGraph, Type};

    #[test]
    fn records_lemmas_and_phases_in_order() {
        let mut g = TermGraph::new();
        let a = g.mk_skolem("A", Type::Bool);
        let b = g.mk_skolem("B", Type::Bool);
        let mut out = MockOutputChannel::new();
        out.lemma(a);
        out.lemma(b);
        out.require_phase(Literal::Bool(true), false);
        assert_eq!(out.lemmas, vec![a, b]);
        assert_eq!(out.phase_requirements, vec![(Literal::Bool(true), false)]);
    }
}
