//! External interface contracts.
//!
//! Nothing here is wire-encoded; these are in-process boundaries the host
//! embedding this engine implements. `si-testkit` provides in-memory mock
//! implementations suitable for unit and integration tests; no production
//! SMT-core or grammar-enumeration backend is implemented in this
//! workspace.

use std::collections::HashMap;

use si_term::node::Literal;
use si_term::{NodeId, TermGraph};

/// Decides and reports on the truth value of ground literals in the host
/// SMT core's current model.
pub trait Valuation {
    fn ensure_literal(&mut self, n: NodeId) -> Literal;
    fn has_sat_value(&self, l: Literal) -> Option<bool>;
}

/// The host's channel for emitting lemmas and phase requirements back to
/// the SMT core.
pub trait OutputChannel {
    fn lemma(&mut self, n: NodeId);
    fn require_phase(&mut self, l: Literal, pol: bool);
}

/// Callback surface an [`Instantiator`] uses to report proposed
/// substitutions back into the engine.
pub trait InstantiatorCallback {
    /// The consumer signals accept (`true`, novel) or reject (`false`,
    /// duplicate or ineligible).
    fn do_add_instantiation(&mut self, subs: &[NodeId]) -> bool;
    /// Filters on substitution term shape: the engine allows only
    /// non-skolem terms, or the engine's own argument skolems.
    fn is_eligible_for_instantiation(&self, n: NodeId) -> bool;
    fn add_lemma(&mut self, n: NodeId) -> bool;
}

/// The external quantifier instantiation engine. `check` invokes the
/// supplied callback zero or more times, once per candidate substitution
/// it proposes this round.
pub trait Instantiator {
    fn check(&mut self, cb: &mut dyn InstantiatorCallback) -> bool;
}

/// Grammar/datatype construction for SyGuS enumeration, out of scope for
/// this engine's own logic but still a boundary
/// the host must satisfy when template synthesis needs a grammar.
pub trait SygusTermDb {
    fn register_template(&mut self, func: NodeId, template: NodeId, arg: NodeId);
}

/// Post-processing hooks for a constructed solution: quantifier-free
/// simplification and, optionally, reconstruction into
/// a restricted sygus grammar.
pub trait SingleInvSol {
    fn simplify_solution(&self, g: &mut TermGraph, n: NodeId) -> NodeId;
    fn reconstruct_solution(&self, g: &mut TermGraph, n: NodeId) -> Option<NodeId>;
}

/// Optional oracle narrowing solution construction to an unsat core: the
/// retained lemma nodes (matched back against
/// [`crate::InstantiationRecord::lemmas_produced`] by identity), and an
/// optional per-lemma weakening substitution.
pub trait UnsatCoreOracle {
    fn unsat_core_lemmas(&self) -> Option<(Vec<NodeId>, Option<HashMap<NodeId, NodeId>>)>;
}

/// Drives partial single-invocation refinement: proposes the next
/// single-invocation candidate conjecture as a `(guard, body)` pair, or
/// `None` when it has nothing left to offer, which the engine treats as
/// a hard incompleteness.
pub trait EntailmentOracle {
    fn next_conjecture(&mut self) -> Option<(NodeId, NodeId)>;
}
