//! `SingleInvSolver` — top-level CEGIS orchestration.
//!
//! Ties `si-partition`'s single-invocation split and `si-transition`'s
//! pre/trans/post inference to a check loop driven by an external
//! [`Instantiator`]. A purely single-invocation conjecture reduces to one
//! ground lemma over a fresh first-order variable per synthesis function,
//! refined round by round into an ITE cascade; a conjecture with a
//! non-single-invocation remainder falls back to partial handling, gated
//! by a pair of guard literals and an [`EntailmentOracle`] that proposes
//! successive single-invocation candidates.

use std::collections::HashMap;

use log::{debug, trace, warn};

use si_base::{Result, SiError};
use si_partition::{SingleInvocationPartition, NSI, SI};
use si_term::node::NodeData;
use si_term::{push_negation, substitute, NodeId, TermGraph, Type};
use si_transition::TransitionInference;

use crate::instantiation::InstantiationRecord;
use crate::interfaces::{EntailmentOracle, Instantiator, InstantiatorCallback, UnsatCoreOracle, Valuation};
use crate::options::{InvTemplMode, SiMode, SolverOptions};
use crate::solution::{
    construct_solution, debug_check_solution, post_process_solution, select_indices,
    sort_indices_constant_first, stats,
};

/// A synthesized invariant-template hole for a function whose spec is
/// transition-shaped but not fully single-invocation: `templ` is the
/// pre/post-gated formula the external grammar enumerator instantiates,
/// `arg` is the uninterpreted application standing for the hole itself.
#[derive(Clone, Copy, Debug)]
pub struct Template {
    pub templ: NodeId,
    pub arg: NodeId,
}

/// Result of one [`SingleInvSolver::check`] round.
#[derive(Clone, Debug)]
pub enum CheckOutcome {
    /// New lemmas to hand the host's `OutputChannel`.
    Progress(Vec<NodeId>),
    /// Nothing new this round; not necessarily final.
    NoProgress,
    /// A partial-SI candidate was refuted; `verification_lemma` checks it
    /// against the full, non-single-invocation specification.
    CandidateRefuted(NodeId),
    /// The entailment oracle has nothing left to offer: partial-SI
    /// refinement cannot make further progress.
    Incomplete,
}

/// Top-level single-invocation CEGIS engine for one conjecture.
pub struct SingleInvSolver {
    options: SolverOptions,
    funcs: Vec<NodeId>,
    prog_to_sol_index: HashMap<NodeId, usize>,
    partition: Option<SingleInvocationPartition>,
    is_single_invocation: bool,
    qq: Option<NodeId>,
    si_vars: Vec<NodeId>,
    func_vars: Vec<NodeId>,
    canonical_vars: Vec<NodeId>,
    negated_si: Option<NodeId>,
    si_guard: Option<NodeId>,
    full_guard: Option<NodeId>,
    ns_guard: Option<NodeId>,
    record: Option<InstantiationRecord>,
    init_lemmas: Vec<NodeId>,
    pending_lemmas: Vec<NodeId>,
    templates: HashMap<NodeId, Template>,
    transitions: HashMap<NodeId, TransitionInference>,
    auto_invariants: HashMap<NodeId, NodeId>,
    needs_check: bool,
}

impl SingleInvSolver {
    /// Initializes the engine from the conjecture's (function- and
    /// state-variable-quantified) matrix `body`. Builds `qq = ¬body` and
    /// partitions it; see [`Self::initialize_from_candidate`] for the
    /// entry point used when resuming with an already-negated candidate
    /// body supplied by an [`EntailmentOracle`].
    pub fn initialize(
        g: &mut TermGraph,
        funcs: Vec<NodeId>,
        body: NodeId,
        options: SolverOptions,
    ) -> Result<Self> {
        let qq = push_negation(g, body, true);
        Self::initialize_from_qq(g, funcs, qq, options)
    }

    /// Like [`Self::initialize`], but `body` is already in negated
    /// (`¬∀`) form — used when an [`EntailmentOracle`] hands back a
    /// candidate conjecture body directly.
    pub fn initialize_from_candidate(
        g: &mut TermGraph,
        funcs: Vec<NodeId>,
        qq: NodeId,
        options: SolverOptions,
    ) -> Result<Self> {
        Self::initialize_from_qq(g, funcs, qq, options)
    }

    fn initialize_from_qq(
        g: &mut TermGraph,
        funcs: Vec<NodeId>,
        qq: NodeId,
        options: SolverOptions,
    ) -> Result<Self> {
        let partition = SingleInvocationPartition::init_with_funcs(g, funcs.clone(), qq);
        let Some(partition) = partition else {
            if options.si_abort || options.si_mode == SiMode::AllAbort {
                return Err(SiError::OptionAbort(
                    "conjecture shape defeats single-invocation partitioning".into(),
                ));
            }
            warn!("partitioning failed (embedded quantifier or argument mismatch), degrading");
            return Ok(Self::degraded(funcs, options));
        };

        if options.si_mode == SiMode::None {
            return Ok(Self::degraded(funcs, options));
        }

        let is_purely_si = partition.is_purely_single_invocation();
        if !is_purely_si && (options.si_abort || options.si_mode == SiMode::AllAbort) {
            return Err(SiError::OptionAbort("conjecture is not single-invocation".into()));
        }
        if !is_purely_si && !options.si_partial {
            return Ok(Self::degraded(funcs, options));
        }

        let prog_to_sol_index = funcs.iter().enumerate().map(|(i, f)| (*f, i)).collect();
        let canonical_vars = partition.si_vars.clone();
        let si_vars = partition.si_vars.clone();

        let mut solver = SingleInvSolver {
            options,
            funcs,
            prog_to_sol_index,
            partition: Some(partition),
            is_single_invocation: is_purely_si,
            qq: Some(qq),
            si_vars,
            func_vars: Vec::new(),
            canonical_vars,
            negated_si: None,
            si_guard: None,
            full_guard: None,
            ns_guard: None,
            record: None,
            init_lemmas: Vec::new(),
            pending_lemmas: Vec::new(),
            templates: HashMap::new(),
            transitions: HashMap::new(),
            auto_invariants: HashMap::new(),
            needs_check: false,
        };

        if is_purely_si {
            solver.configure_single_invocation(g);
        } else {
            solver.configure_partial(g);
        }
        solver.run_presolve(g);
        Ok(solver)
    }

    fn degraded(funcs: Vec<NodeId>, options: SolverOptions) -> Self {
        let prog_to_sol_index = funcs.iter().enumerate().map(|(i, f)| (*f, i)).collect();
        SingleInvSolver {
            options,
            funcs,
            prog_to_sol_index,
            partition: None,
            is_single_invocation: false,
            qq: None,
            si_vars: Vec::new(),
            func_vars: Vec::new(),
            canonical_vars: Vec::new(),
            negated_si: None,
            si_guard: None,
            full_guard: None,
            ns_guard: None,
            record: None,
            init_lemmas: Vec::new(),
            pending_lemmas: Vec::new(),
            templates: HashMap::new(),
            transitions: HashMap::new(),
            auto_invariants: HashMap::new(),
            needs_check: false,
        }
    }

    /// Builds the quantified ground lemma over the single-invocation
    /// bucket and the fresh guard literal that activates it, and seeds a
    /// fresh [`InstantiationRecord`] keyed to the negated SI formula.
    fn configure_single_invocation(&mut self, g: &mut TermGraph) {
        let (si_conj, func_vars) = {
            let p = self.partition.as_ref().expect("partition present");
            (p.get_single_invocation(g), p.func_vars.clone())
        };
        let negated = push_negation(g, si_conj, true);
        let quantified = g.mk_forall(func_vars.clone(), negated);
        let si_guard = g.mk_skolem("G_si", Type::Bool);
        let not_guard = g.mk_not(si_guard);
        let init_lemma = g.mk_or(vec![not_guard, quantified]);

        self.func_vars = func_vars;
        self.negated_si = Some(negated);
        self.si_guard = Some(si_guard);
        self.init_lemmas.push(init_lemma);
        self.record = Some(InstantiationRecord::new(negated));
        self.needs_check = true;
        trace!("single-invocation: guard assigned, init lemma queued");
    }

    /// Partial-SI setup: a full-specification verification lemma gated by
    /// `G_full`, the normal SI loop for whatever SI conjuncts exist
    /// alongside the NSI remainder, and, when template synthesis is
    /// enabled, one transition-inferred template per synthesis function.
    fn configure_partial(&mut self, g: &mut TermGraph) {
        let (nsi, all_vars, si_empty) = {
            let p = self.partition.as_ref().expect("partition present");
            (p.get_non_single_invocation(g), p.all_vars.clone(), p.conjuncts[SI].is_empty())
        };
        let full_forall = g.mk_forall(all_vars, nsi);
        let full_guard = g.mk_skolem("G_full", Type::Bool);
        let not_full = g.mk_not(full_guard);
        let full_lemma = g.mk_or(vec![not_full, full_forall]);
        self.full_guard = Some(full_guard);
        self.init_lemmas.push(full_lemma);

        if !si_empty {
            self.configure_single_invocation(g);
        }

        if self.options.inv_templ_mode != InvTemplMode::None || self.options.inv_auto_unfold {
            self.run_transition_inference(g);
        }
        self.needs_check = true;
        debug!("partial single-invocation: full-spec guard assigned, si_empty={si_empty}");
    }

    fn run_transition_inference(&mut self, g: &mut TermGraph) {
        let qq = self.qq.expect("qq set before transition inference runs");
        let si_vars = self.si_vars.clone();
        let funcs = self.funcs.clone();
        for f in funcs {
            let mut ti = TransitionInference::initialize(f, si_vars.clone());
            ti.process(g, qq);

            let mut discovered = false;
            if ti.is_complete() && self.options.inv_auto_unfold {
                if let Some(formula) = ti.auto_unfold(g, self.options.unfold_step_limit) {
                    debug!("transition inference: auto-unfold discovered an inductive invariant");
                    self.auto_invariants.insert(f, formula);
                    discovered = true;
                }
            }
            if !discovered && self.options.inv_templ_mode != InvTemplMode::None {
                let arg_types: Vec<Type> = si_vars.iter().map(|v| g.get_type(*v).clone()).collect();
                let i_fn = g.mk_function_symbol("I", arg_types, Type::Bool);
                let i_app = g.mk_apply_uf(i_fn, si_vars.clone());
                let templ = match self.options.inv_templ_mode {
                    InvTemplMode::Pre => {
                        let pre = ti.get_pre(g);
                        g.mk_or(vec![pre, i_app])
                    }
                    InvTemplMode::Post => {
                        let post = ti.get_post(g);
                        g.mk_and(vec![post, i_app])
                    }
                    InvTemplMode::None => unreachable!("checked above"),
                };
                self.templates.insert(f, Template { templ, arg: i_app });
            }
            self.transitions.insert(f, ti);
        }
    }

    /// Seeds the instantiation record from any presolve equalities the
    /// partition found — a `s_j = t` equality within an SI conjunct often
    /// pins a synthesis function's value directly, letting the first
    /// round of the check loop skip straight past the obvious case.
    fn run_presolve(&mut self, g: &mut TermGraph) {
        let Some(record) = self.record.as_mut() else { return };
        let (presolve, si_conj) = {
            let p = self.partition.as_ref().expect("partition present");
            (p.collect_presolve_equalities(g), p.get_single_invocation(g))
        };
        for tuple in presolve {
            let subst: HashMap<NodeId, NodeId> =
                self.si_vars.iter().copied().zip(tuple.iter().copied()).collect();
            let ground = substitute(g, si_conj, &subst);
            let Some(values) = solve_func_vars_from_conjunct(g, ground, &self.func_vars) else {
                continue;
            };
            let cond_eqs: Vec<NodeId> =
                self.si_vars.iter().zip(tuple.iter()).map(|(&s, &t)| g.mk_eq(s, t)).collect();
            let cond = g.mk_and(cond_eqs);
            record.record(g, tuple, cond, values);
            trace!("presolve: seeded an instantiation from a pinned equality");
        }
    }

    /// The initial guarded lemma(s): one quantified SI refutation lemma
    /// in full or (partially) single-invocation mode, plus a
    /// full-specification verification lemma when partial.
    pub fn initial_lemmas(&self) -> &[NodeId] {
        &self.init_lemmas
    }

    pub fn is_single_invocation(&self) -> bool {
        self.is_single_invocation
    }

    pub fn needs_check(&self) -> bool {
        self.needs_check
    }

    /// Whether the recorded instantiations for any function would need
    /// an `ITE` cascade to express (more than one branch so far).
    pub fn has_ites(&self) -> bool {
        self.record.as_ref().map_or(false, |r| r.len() > 1)
    }

    pub fn get_trans_pre(&mut self, g: &mut TermGraph, func: NodeId) -> Option<NodeId> {
        self.transitions.get_mut(&func).map(|ti| ti.get_pre(g))
    }

    pub fn get_trans_post(&mut self, g: &mut TermGraph, func: NodeId) -> Option<NodeId> {
        self.transitions.get_mut(&func).map(|ti| ti.get_post(g))
    }

    pub fn get_template(&self, func: NodeId) -> Option<NodeId> {
        self.templates.get(&func).map(|t| t.templ)
    }

    pub fn get_template_arg(&self, func: NodeId) -> Option<NodeId> {
        self.templates.get(&func).map(|t| t.arg)
    }

    pub fn set_canonical_vars(&mut self, vars: Vec<NodeId>) {
        self.canonical_vars = vars;
    }

    /// Runs one round of the check loop.
    ///
    /// Three sub-states, per whether this engine is running in
    /// full single-invocation mode or partial mode:
    ///
    /// - full mode: drives `instantiator` through the normal callback
    ///   loop below.
    /// - partial mode, no active candidate (`ns_guard` unset): asks
    ///   `entailment` for the next single-invocation candidate.
    /// - partial mode, active candidate refuted (`ns_guard` decided
    ///   false): folds the recorded instantiations into a solution,
    ///   substitutes it into the NSI bucket, and emits a verification
    ///   lemma.
    pub fn check(
        &mut self,
        g: &mut TermGraph,
        valuation: &mut dyn Valuation,
        instantiator: &mut dyn Instantiator,
        entailment: Option<&mut dyn EntailmentOracle>,
    ) -> CheckOutcome {
        if !self.needs_check {
            return CheckOutcome::NoProgress;
        }
        if self.full_guard.is_some() && self.ns_guard.is_none() {
            return self.check_need_next_candidate(g, entailment);
        }
        if let Some(ns_guard) = self.ns_guard {
            let lit = valuation.ensure_literal(ns_guard);
            if valuation.has_sat_value(lit) == Some(false) {
                return self.finish_partial_candidate(g);
            }
        }
        self.pending_lemmas.clear();
        {
            let mut cb = Callback { solver: self, g };
            instantiator.check(&mut cb);
        }
        if self.pending_lemmas.is_empty() {
            CheckOutcome::NoProgress
        } else {
            CheckOutcome::Progress(std::mem::take(&mut self.pending_lemmas))
        }
    }

    fn check_need_next_candidate(
        &mut self,
        g: &mut TermGraph,
        entailment: Option<&mut dyn EntailmentOracle>,
    ) -> CheckOutcome {
        let Some(oracle) = entailment else {
            return CheckOutcome::Incomplete;
        };
        match oracle.next_conjecture() {
            Some((guard, body)) => {
                debug!("partial mode: entailment oracle proposed a new candidate");
                self.start_partial_candidate(g, guard, body);
                CheckOutcome::NoProgress
            }
            None => {
                warn!("partial mode: entailment oracle exhausted, reporting incompleteness");
                CheckOutcome::Incomplete
            }
        }
    }

    fn start_partial_candidate(&mut self, g: &mut TermGraph, guard: NodeId, body: NodeId) {
        let qq = push_negation(g, body, true);
        if let Some(partition) = SingleInvocationPartition::init_with_funcs(g, self.funcs.clone(), qq) {
            self.si_vars = partition.si_vars.clone();
            self.partition = Some(partition);
            self.configure_single_invocation(g);
            self.run_presolve(g);
        }
        self.ns_guard = Some(guard);
    }

    /// Folds the recorded instantiations into a solution per function,
    /// substitutes those solutions (as lambdas) into the NSI bucket, and
    /// emits the negated, fully-skolemized result as a verification
    /// lemma — an epoch boundary, so the record resets for the next
    /// candidate.
    fn finish_partial_candidate(&mut self, g: &mut TermGraph) -> CheckOutcome {
        let mut lambdas = HashMap::new();
        for (i, &f) in self.funcs.clone().iter().enumerate() {
            let sol = self.get_solution(g, i, None);
            let lambda = g.mk_lambda(self.si_vars.clone(), sol);
            lambdas.insert(f, lambda);
        }
        let (nsi_inst, all_vars) = {
            let p = self.partition.as_ref().expect("partition present");
            (p.get_specification_inst(g, NSI, &lambdas), p.all_vars.clone())
        };
        let skolems: Vec<NodeId> =
            all_vars.iter().map(|&v| g.mk_skolem("b", g.get_type(v).clone())).collect();
        let subst: HashMap<NodeId, NodeId> = all_vars.into_iter().zip(skolems).collect();
        let ground_nsi = substitute(g, nsi_inst, &subst);
        let verification_lemma = push_negation(g, ground_nsi, true);

        if let Some(record) = self.record.as_mut() {
            record.reset();
        }
        self.ns_guard = None;
        CheckOutcome::CandidateRefuted(verification_lemma)
    }

    /// Called from the instantiator callback: substitutes `subs` into the
    /// negated SI formula for each of its free function variables, records
    /// the resulting guard/value pair, and queues the guarded lemma.
    /// Returns `false` on a duplicate (already-recorded) substitution.
    fn do_add_instantiation(&mut self, g: &mut TermGraph, subs: Vec<NodeId>) -> bool {
        let Some(negated_si) = self.negated_si else { return false };
        let subst: HashMap<NodeId, NodeId> =
            self.func_vars.iter().copied().zip(subs.iter().copied()).collect();
        let lem = substitute(g, negated_si, &subst);
        let cond = push_negation(g, lem, true);
        let recorded = match self.record.as_mut() {
            Some(r) => r.record(g, subs.clone(), cond, subs),
            None => return false,
        };
        if !recorded {
            return false;
        }
        let lemma = if let Some(ns_guard) = self.ns_guard {
            let not_guard = g.mk_not(ns_guard);
            g.mk_or(vec![not_guard, lem])
        } else {
            lem
        };
        self.pending_lemmas.push(lemma);
        true
    }

    fn is_eligible_for_instantiation(&self, g: &TermGraph, n: NodeId) -> bool {
        !matches!(g.data(n), NodeData::Skolem { .. }) || self.func_vars.contains(&n)
    }

    /// Folds the instantiation record for synthesis function `program`
    /// (its index into the function list passed to [`Self::initialize`])
    /// into a quantifier-free term, renaming the engine's internal state
    /// variables to `self.canonical_vars` (identity unless
    /// [`Self::set_canonical_vars`] was called).
    pub fn get_solution(
        &mut self,
        g: &mut TermGraph,
        program: usize,
        core_oracle: Option<&dyn UnsatCoreOracle>,
    ) -> NodeId {
        let Some(record) = self.record.as_ref() else {
            return self.unconstrained_solution(g, program);
        };
        if record.is_empty() {
            return self.unconstrained_solution(g, program);
        }
        let core = if self.options.sol_min_core {
            core_oracle.and_then(|o| o.unsat_core_lemmas())
        } else {
            None
        };
        let (mut indices, weak) = select_indices(record, core);
        sort_indices_constant_first(g, record, program, &mut indices);
        let raw = construct_solution(g, record, program, &indices, &weak);
        let subst: HashMap<NodeId, NodeId> =
            self.si_vars.iter().copied().zip(self.canonical_vars.iter().copied()).collect();
        let renamed = substitute(g, raw, &subst);
        let processed = post_process_solution(g, renamed);
        debug_check_solution(g, processed, &self.canonical_vars);
        let s = stats(g, processed);
        debug!("solution constructed: term_size={} ite_count={}", s.term_size, s.ite_count);
        processed
    }

    fn unconstrained_solution(&self, g: &mut TermGraph, program: usize) -> NodeId {
        let ty = match g.data(self.funcs[program]).clone() {
            NodeData::FunctionSymbol { ret_ty, .. } => ret_ty,
            _ => Type::Int,
        };
        g.mk_skolem("unconstrained", ty)
    }

    /// The index this engine's function list assigns `func`, for a host
    /// that enumerates synthesis functions independently and needs to map
    /// back into [`Self::get_solution`]'s `program` argument.
    pub fn prog_to_sol_index(&self, func: NodeId) -> Option<usize> {
        self.prog_to_sol_index.get(&func).copied()
    }
}

/// Looks for a top-level equality pinning each of `func_vars` to a ground
/// value within `conjunct` (itself already a conjunction of ground
/// literals after a presolve substitution), in order. Returns `None` if
/// any `func_vars` entry is not so pinned.
fn solve_func_vars_from_conjunct(
    g: &TermGraph,
    conjunct: NodeId,
    func_vars: &[NodeId],
) -> Option<Vec<NodeId>> {
    let literals = match g.data(conjunct).clone() {
        NodeData::And(cs) => cs,
        _ => vec![conjunct],
    };
    let mut out = Vec::with_capacity(func_vars.len());
    for &fv in func_vars {
        let mut found = None;
        for &lit in &literals {
            if let NodeData::Eq(a, b) = g.data(lit).clone() {
                if a == fv {
                    found = Some(b);
                    break;
                }
                if b == fv {
                    found = Some(a);
                    break;
                }
            }
        }
        out.push(found?);
    }
    Some(out)
}

struct Callback<'a> {
    solver: &'a mut SingleInvSolver,
    g: &'a mut TermGraph,
}

impl<'a> InstantiatorCallback for Callback<'a> {
    fn do_add_instantiation(&mut self, subs: &[NodeId]) -> bool {
        self.solver.do_add_instantiation(self.g, subs.to_vec())
    }

    fn is_eligible_for_instantiation(&self, n: NodeId) -> bool {
        self.solver.is_eligible_for_instantiation(self.g, n)
    }

    fn add_lemma(&mut self, n: NodeId) -> bool {
        self.solver.pending_lemmas.push(n);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::Type;

    /// `∀f.∀x. f(x) ≥ x ∧ f(x) ≥ 0` is purely single-invocation: the
    /// engine produces one guarded initial lemma and no templates.
    #[test]
    fn pure_si_conjecture_initializes_with_one_guard() {
        let mut g = TermGraph::new();
        let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
        let x = g.mk_bound_var("x", Type::Int);
        let fx = g.mk_apply_uf(f, vec![x]);
        let zero = g.mk_int(0);
        let body = g.mk_and(vec![g.mk_geq(fx, x), g.mk_geq(fx, zero)]);

        let solver =
            SingleInvSolver::initialize(&mut g, vec![f], body, SolverOptions::default()).unwrap();
        assert!(solver.is_single_invocation());
        assert!(solver.needs_check());
        assert_eq!(solver.initial_lemmas().len(), 1);
        assert!(solver.get_template(f).is_none());
    }

    /// A conjecture with an embedded `FORALL` degrades to a non-SI,
    /// non-checking engine rather than erroring, under default options.
    #[test]
    fn embedded_forall_degrades_without_error() {
        let mut g = TermGraph::new();
        let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
        let x = g.mk_bound_var("x", Type::Int);
        let y = g.mk_bound_var("y", Type::Int);
        let inner = g.mk_leq(x, y);
        let nested = g.mk_forall(vec![y], inner);
        let fx = g.mk_apply_uf(f, vec![x]);
        let body = g.mk_and(vec![g.mk_geq(fx, x), nested]);

        let solver =
            SingleInvSolver::initialize(&mut g, vec![f], body, SolverOptions::default()).unwrap();
        assert!(!solver.is_single_invocation());
        assert!(!solver.needs_check());
    }

    /// `si_abort` turns the same embedded-quantifier shape into a hard
    /// error instead of a silent degrade.
    #[test]
    fn si_abort_option_errors_on_non_si_shape() {
        let mut g = TermGraph::new();
        let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
        let x = g.mk_bound_var("x", Type::Int);
        let y = g.mk_bound_var("y", Type::Int);
        let inner = g.mk_leq(x, y);
        let nested = g.mk_forall(vec![y], inner);
        let fx = g.mk_apply_uf(f, vec![x]);
        let body = g.mk_and(vec![g.mk_geq(fx, x), nested]);
        let mut options = SolverOptions::default();
        options.si_abort = true;

        let result = SingleInvSolver::initialize(&mut g, vec![f], body, options);
        assert!(matches!(result, Err(SiError::OptionAbort(_))));
    }

    /// Feeding `do_add_instantiation` two complementary candidates (`0`
    /// for `x ≥ 0`, `x` otherwise) through the public instantiation path
    /// and then reading back the solution reproduces the expected `ITE`.
    #[test]
    fn check_loop_builds_ite_cascade_from_instantiations() {
        let mut g = TermGraph::new();
        let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
        let x = g.mk_bound_var("x", Type::Int);
        let fx = g.mk_apply_uf(f, vec![x]);
        let zero = g.mk_int(0);
        let body = g.mk_and(vec![g.mk_geq(fx, x), g.mk_geq(fx, zero)]);

        let mut solver =
            SingleInvSolver::initialize(&mut g, vec![f], body, SolverOptions::default()).unwrap();

        assert!(solver.do_add_instantiation(&mut g, vec![zero]));
        assert!(!solver.do_add_instantiation(&mut g, vec![zero]));
        let s = solver.si_vars[0];
        assert!(solver.do_add_instantiation(&mut g, vec![s]));
        assert!(solver.has_ites());

        let sol = solver.get_solution(&mut g, 0, None);
        let (_, ite_count) = si_term::size_and_ite_count(&g, sol);
        assert_eq!(ite_count, 1);
    }

    /// A conjecture mixing a single-invocation conjunct with a
    /// non-single-invocation one only reduces under `si_partial`; without
    /// it, the engine degrades entirely rather than mis-synthesizing.
    #[test]
    fn mixed_conjecture_requires_si_partial() {
        let mut g = TermGraph::new();
        let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
        let x = g.mk_bound_var("x", Type::Int);
        let y = g.mk_bound_var("y", Type::Int);
        let fx = g.mk_apply_uf(f, vec![x]);
        let fy = g.mk_apply_uf(f, vec![y]);
        // SI conjunct: f(x) >= x. NSI conjunct: f(x) = f(y) (two distinct
        // argument tuples for the same function).
        let si_conjunct = g.mk_geq(fx, x);
        let nsi_conjunct = g.mk_eq(fx, fy);
        let body = g.mk_and(vec![si_conjunct, nsi_conjunct]);

        let without_partial =
            SingleInvSolver::initialize(&mut g, vec![f], body, SolverOptions::default()).unwrap();
        assert!(!without_partial.is_single_invocation());
        assert!(!without_partial.needs_check());

        let mut options = SolverOptions::default();
        options.si_partial = true;
        let with_partial = SingleInvSolver::initialize(&mut g, vec![f], body, options).unwrap();
        assert!(!with_partial.is_single_invocation());
        assert!(with_partial.needs_check());
        // one SI-refutation guard plus the full-specification guard.
        assert_eq!(with_partial.initial_lemmas().len(), 2);
    }
}
