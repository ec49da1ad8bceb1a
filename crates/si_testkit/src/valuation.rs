//! [`MockValuation`]: an in-memory stand-in for the host SMT core's
//! current model, for tests and the CLI demo.

use std::collections::HashMap;

use si_solver::Valuation;
use si_term::node::Literal;
use si_term::NodeId;

/// Tracks a boolean assignment per literal `NodeId`, defaulting unseen
/// literals to a fixed value rather than modeling a genuine three-valued
/// (true/false/unassigned) decision state — sufficient for driving a
/// check loop deterministically in a test.
pub struct MockValuation {
    assignments: HashMap<NodeId, bool>,
    default: bool,
}

impl MockValuation {
    pub fn new() -> Self {
        MockValuation { assignments: HashMap::new(), default: true }
    }

    /// Unseen literals report `default` instead of `true`.
    pub fn with_default(default: bool) -> Self {
        MockValuation { assignments: HashMap::new(), default }
    }

    /// Fixes `n`'s truth value ahead of a `check` call.
    pub fn set(&mut self, n: NodeId, value: bool) {
        self.assignments.insert(n, value);
    }
}

impl Default for MockValuation {
    fn default() -> Self {
        Self::new()
    }
}

impl Valuation for MockValuation {
    fn ensure_literal(&mut self, n: NodeId) -> Literal {
        let value = *self.assignments.entry(n).or_insert(self.default);
        Literal::Bool(value)
    }

    fn has_sat_value(&self, l: Literal) -> Option<bool> {
        match l {
            Literal::Bool(b) => Some(b),
            Literal::Int(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::{TermGraph, Type};

    #[test]
    fn unset_literal_reports_the_configured_default() {
        let mut g = TermGraph::new();
        let guard = g.mk_skolem("G", Type::Bool);
        let mut v = MockValuation::with_default(false);
        let lit = v.ensure_literal(guard);
        assert_eq!(v.has_sat_value(lit), Some(false));
    }

    #[test]
    fn set_overrides_the_default() {
        let mut g = TermGraph::new();
        let guard = g.mk_skolem("G", Type::Bool);
        let mut v = MockValuation::new();
        v.set(guard, false);
        let lit = v.ensure_literal(guard);
        assert_eq!(v.has_sat_value(lit), Some(false));
    }
}
