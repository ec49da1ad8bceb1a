//! `TransitionInference`: recovers the pre/trans/post decomposition of a
//! transition system from a quantified formula.
//!
//! Recovers `pre(x) ⇒ inv(x)`, `inv(x) ∧ trans(x,x') ⇒ inv(x')`,
//! `inv(x) ⇒ post(x)` components from a quantified formula over one
//! function `f`, then drives a bounded deterministic unfolding looking
//! for a trivial inductive invariant.

use std::collections::HashMap;

use log::{debug, trace};
use si_term::node::NodeData;
use si_term::{free_bound_vars, push_negation, substitute, NodeId, TermGraph};

use crate::ground_eval::{eval_bool, eval_int};
use si_match::DetTrace;

/// Component index: `-1` post, `0` trans, `+1` pre.
pub type ComponentIndex = i32;
pub const POST: ComponentIndex = -1;
pub const TRANS: ComponentIndex = 0;
pub const PRE: ComponentIndex = 1;

/// The deterministic-unfolding step count the original hard-codes
/// exposed here as an argument to
/// [`TransitionInference::auto_unfold`] rather than a compile-time
/// constant.
pub const DEFAULT_UNFOLD_STEP_LIMIT: usize = 100;

/// Status of one deterministic-unfolding step: success, terminated,
/// counterexample, or invalid — modeled as a sum type rather than an
/// integer code.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TraceStatus {
    Ok,
    Terminated,
    Counterexample,
    Invalid,
}

/// One pre/trans/post component: the clauses routed to it, a per-clause
/// constant-substitution table, and the cached conjunction of all its
/// clauses.
#[derive(Default)]
pub struct Component {
    pub conjuncts: Vec<NodeId>,
    /// `clause -> (state variable -> ground value)`, populated for
    /// clauses whose remaining literals fully determine every state
    /// variable.
    pub const_eq: HashMap<NodeId, HashMap<NodeId, NodeId>>,
    this: Option<NodeId>,
}

impl Component {
    pub fn has(&self, c: NodeId) -> bool {
        self.conjuncts.contains(&c)
    }
}

/// Infers and holds the `pre`/`trans`/`post` decomposition for one
/// target function.
pub struct TransitionInference {
    func: NodeId,
    vars: Vec<NodeId>,
    prime_vars: Vec<NodeId>,
    components: HashMap<ComponentIndex, Component>,
    complete: bool,
}

impl TransitionInference {
    /// Stores `f` and its state variables
    /// `x_1..x_m`. The primed vector `x'_1..x'_m` is allocated lazily, the
    /// first time a transition clause needs it.
    pub fn initialize(func: NodeId, vars: Vec<NodeId>) -> Self {
        TransitionInference {
            func,
            vars,
            prime_vars: Vec::new(),
            components: HashMap::new(),
            complete: true,
        }
    }

    pub fn func(&self) -> NodeId {
        self.func
    }

    pub fn vars(&self) -> &[NodeId] {
        &self.vars
    }

    pub fn prime_vars(&self) -> &[NodeId] {
        &self.prime_vars
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Processes `n` as a conjunction of clauses, each a disjunction of
    /// literals, classifying each clause's `f`-occurrences and routing it
    /// to `pre`/`trans`/`post`.
    pub fn process(&mut self, g: &mut TermGraph, n: NodeId) {
        let clauses = collect_top_conjuncts(g, n);
        for clause in clauses {
            self.process_clause(g, clause);
        }
        for idx in [PRE, TRANS, POST] {
            self.components.entry(idx).or_default();
        }
    }

    fn process_clause(&mut self, g: &mut TermGraph, clause: NodeId) {
        let disjuncts = top_level_disjuncts(g, clause);

        let mut pos: Option<Vec<NodeId>> = None;
        let mut neg: Option<Vec<NodeId>> = None;
        let mut remaining = Vec::new();
        let mut rejected = false;

        for d in disjuncts {
            match classify_disjunct(g, d, self.func) {
                DisjunctKind::Positive(args) => {
                    if pos.is_some() {
                        rejected = true;
                        break;
                    }
                    pos = Some(args);
                }
                DisjunctKind::Negative(args) => {
                    if neg.is_some() {
                        rejected = true;
                        break;
                    }
                    neg = Some(args);
                }
                DisjunctKind::Other => remaining.push(d),
                DisjunctKind::Forbidden => {
                    rejected = true;
                    break;
                }
            }
        }

        if rejected {
            self.complete = false;
            trace!("transition inference: clause rejected (forbidden shape)");
            return;
        }

        let (idx, current_args) = match (&neg, &pos) {
            (Some(n), Some(_)) => (TRANS, n.clone()),
            (Some(n), None) => (POST, n.clone()),
            (None, Some(p)) => (PRE, p.clone()),
            (None, None) => {
                // Clause does not mention `f` at all; irrelevant to this
                // decomposition, not a shape failure.
                return;
            }
        };

        let mut rename: HashMap<NodeId, NodeId> =
            current_args.iter().copied().zip(self.vars.iter().copied()).collect();

        if idx == TRANS {
            if self.prime_vars.is_empty() {
                self.prime_vars = self
                    .vars
                    .iter()
                    .enumerate()
                    .map(|(j, v)| {
                        let ty = g.get_type(*v).clone();
                        g.mk_fresh_bound_var("x'", j as u32, ty)
                    })
                    .collect();
            }
            let next_args = pos.clone().expect("trans clause has a positive occurrence");
            for (a, x_prime) in next_args.iter().zip(self.prime_vars.iter()) {
                rename.insert(*a, *x_prime);
            }
        }

        let remaining: Vec<NodeId> =
            remaining.into_iter().map(|d| substitute(g, d, &rename)).collect();

        let remaining_or = g.mk_or(remaining);
        let stored = if idx == POST { remaining_or } else { push_negation(g, remaining_or, true) };

        let literal_vars: Vec<NodeId> = if idx == TRANS {
            self.prime_vars.iter().chain(self.vars.iter()).copied().collect()
        } else {
            self.vars.clone()
        };
        let const_eq = extract_const_eq(g, &literal_list(g, stored), &literal_vars);

        let comp = self.components.entry(idx).or_default();
        comp.conjuncts.push(stored);
        if !const_eq.is_empty() {
            comp.const_eq.insert(stored, const_eq);
        }
        debug!("transition inference: routed clause to component {idx}");
    }

    /// The conjunction of component `i`'s clauses, or `true` if empty
    /// mirrored across `si-partition`'s `getConjunct` as `getComponent`.
    pub fn get_component(&mut self, g: &mut TermGraph, i: ComponentIndex) -> NodeId {
        if let Some(cached) = self.components.get(&i).and_then(|c| c.this) {
            return cached;
        }
        let conjuncts = self.components.entry(i).or_default().conjuncts.clone();
        let formula = g.mk_and(conjuncts);
        self.components.get_mut(&i).unwrap().this = Some(formula);
        formula
    }

    pub fn get_pre(&mut self, g: &mut TermGraph) -> NodeId {
        self.get_component(g, PRE)
    }

    pub fn get_trans(&mut self, g: &mut TermGraph) -> NodeId {
        self.get_component(g, TRANS)
    }

    pub fn get_post(&mut self, g: &mut TermGraph) -> NodeId {
        self.get_component(g, POST)
    }

    /// Seeds `dt` from the first pre- (or post-, when `!fwd`) clause whose
    /// constant substitution saturates every state variable
    /// Mirrors the original `initializeTrace` entry point.
    ///
    /// `loc` is the fixed node `dt` uses as its path marker for the whole
    /// trace; it does not
    /// index into either component's `const_eq` table, unlike the
    /// per-clause keys used internally — a deliberate simplification for
    /// this single-location engine, where a clause's own `NodeId` already
    /// uniquely keys its `const_eq` entry.
    pub fn initialize_trace(&self, dt: &mut DetTrace, loc: NodeId, fwd: bool) -> TraceStatus {
        let idx = if fwd { PRE } else { POST };
        let Some(comp) = self.components.get(&idx) else {
            return TraceStatus::Invalid;
        };
        for clause in &comp.conjuncts {
            if let Some(eqs) = comp.const_eq.get(clause) {
                if let Some(curr) = self.saturate(eqs, &self.vars) {
                    return if dt.increment(loc, curr) {
                        TraceStatus::Ok
                    } else {
                        TraceStatus::Invalid
                    };
                }
            }
        }
        TraceStatus::Invalid
    }

    /// Advances `dt` by one step:
    /// checks the opposite-direction guard for a counterexample, the
    /// transition guard for termination, then computes the next tuple
    /// from the trans component's constant substitution.
    pub fn increment_trace(
        &mut self,
        g: &mut TermGraph,
        dt: &mut DetTrace,
        loc: NodeId,
        fwd: bool,
    ) -> TraceStatus {
        let subst: HashMap<NodeId, NodeId> =
            self.vars.iter().copied().zip(dt.curr.iter().copied()).collect();

        let opposite_idx = if fwd { POST } else { PRE };
        let opposite = self.get_component(g, opposite_idx);
        let opposite_ground = substitute(g, opposite, &subst);
        if eval_bool(g, opposite_ground) == Some(false) {
            return TraceStatus::Counterexample;
        }

        let trans = self.get_component(g, TRANS);
        let trans_ground = substitute(g, trans, &subst);
        if matches!(eval_bool(g, trans_ground), Some(false)) {
            return TraceStatus::Terminated;
        }

        let Some(comp) = self.components.get(&TRANS) else {
            return TraceStatus::Terminated;
        };
        let next_vars: Vec<NodeId> = if fwd {
            self.prime_vars.clone()
        } else {
            self.vars.clone()
        };
        if next_vars.is_empty() {
            return TraceStatus::Terminated;
        }

        for clause in &comp.conjuncts {
            let Some(eqs) = comp.const_eq.get(clause) else { continue };
            let mut instantiated = HashMap::new();
            for (k, v) in eqs {
                instantiated.insert(*k, substitute(g, *v, &subst));
            }
            if let Some(next) = self.saturate(&instantiated, &next_vars) {
                return if dt.increment(loc, next) {
                    TraceStatus::Ok
                } else {
                    TraceStatus::Terminated
                };
            }
        }
        TraceStatus::Terminated
    }

    fn saturate(&self, eqs: &HashMap<NodeId, NodeId>, vars: &[NodeId]) -> Option<Vec<NodeId>> {
        let mut out = Vec::with_capacity(vars.len());
        for v in vars {
            out.push(*eqs.get(v)?);
        }
        Some(out)
    }

    /// Runs the bounded deterministic unfolding: the driver loop is bounded
    /// by a small step limit and succeeds when the trace terminates with
    /// no counterexample. Returns the
    /// visited-set formula when it discovers a trivial inductive
    /// invariant, `None` when it hits a counterexample or exhausts
    /// `step_limit` inconclusively.
    pub fn auto_unfold(&mut self, g: &mut TermGraph, step_limit: usize) -> Option<NodeId> {
        let loc = self.func;
        let mut dt = DetTrace::new();
        match self.initialize_trace(&mut dt, loc, true) {
            TraceStatus::Ok => {}
            _ => return None,
        }
        for _ in 0..step_limit {
            match self.increment_trace(g, &mut dt, loc, true) {
                TraceStatus::Ok => continue,
                TraceStatus::Terminated => {
                    return Some(dt.construct_formula(g, &self.vars));
                }
                TraceStatus::Counterexample | TraceStatus::Invalid => return None,
            }
        }
        debug!("transition inference: auto-unfold exhausted step budget inconclusively");
        None
    }
}

enum DisjunctKind {
    Positive(Vec<NodeId>),
    Negative(Vec<NodeId>),
    Other,
    Forbidden,
}

/// Classifies one top-level disjunct of a clause against target function
/// `func`: a direct application is
/// positive, a direct negated application is negative, any other use of
/// `func` nested deeper or any use of a different function symbol makes
/// the whole clause unshaped, and anything else is a plain literal.
fn classify_disjunct(g: &TermGraph, d: NodeId, func: NodeId) -> DisjunctKind {
    match g.data(d).clone() {
        NodeData::ApplyUf { func: f, args } if f == func => DisjunctKind::Positive(args),
        NodeData::Not(inner) => match g.data(inner).clone() {
            NodeData::ApplyUf { func: f, args } if f == func => DisjunctKind::Negative(args),
            _ => {
                if embeds_application(g, d) {
                    DisjunctKind::Forbidden
                } else {
                    DisjunctKind::Other
                }
            }
        },
        _ => {
            if embeds_application(g, d) {
                DisjunctKind::Forbidden
            } else {
                DisjunctKind::Other
            }
        }
    }
}

/// `true` iff `n` contains, anywhere below its root, any `APPLY_UF` at
/// all — whether of `func` (embedded too deep to classify at the
/// top-level-disjunct granularity this classification requires) or of a
/// second function the inference does not understand.
fn embeds_application(g: &TermGraph, n: NodeId) -> bool {
    let mut visited = std::collections::HashSet::new();
    embeds_rec(g, n, &mut visited)
}

fn embeds_rec(g: &TermGraph, n: NodeId, visited: &mut std::collections::HashSet<NodeId>) -> bool {
    if !visited.insert(n) {
        return false;
    }
    if let NodeData::ApplyUf { .. } = g.data(n) {
        return true;
    }
    g.children(n).into_iter().any(|c| embeds_rec(g, c, visited))
}

/// Flattens top-level `AND` layers of `n` into a clause list, mirroring
/// `si_partition`'s conjunct collection but without the single-invocation
/// bookkeeping.
fn collect_top_conjuncts(g: &TermGraph, n: NodeId) -> Vec<NodeId> {
    match g.data(n).clone() {
        NodeData::And(cs) => cs.into_iter().flat_map(|c| collect_top_conjuncts(g, c)).collect(),
        _ => vec![n],
    }
}

fn top_level_disjuncts(g: &TermGraph, n: NodeId) -> Vec<NodeId> {
    match g.data(n).clone() {
        NodeData::Or(ds) => ds,
        _ => vec![n],
    }
}

/// The immediate `AND`/`OR` children of `n`, or `n` itself as a singleton
/// — the literals `extract_const_eq` scans to find state-variable
/// equalities in a stored component clause.
fn literal_list(g: &TermGraph, n: NodeId) -> Vec<NodeId> {
    match g.data(n).clone() {
        NodeData::And(cs) | NodeData::Or(cs) => cs,
        _ => vec![n],
    }
}

/// Scans `literals` for equalities solvable for one variable in
/// `priority_vars`, propagating earlier substitutions into later
/// right-hand sides.
///
/// `priority_vars` is checked in order per literal: for a transition
/// clause, callers pass the primed variables before the unprimed ones, so
/// a step equation like `x' = x + 1` is recorded as `x' -> x + 1` (what
/// `increment_trace` needs to compute the next tuple) rather than the
/// equally-valid but useless-here `x -> x' - 1`.
fn extract_const_eq(
    g: &mut TermGraph,
    literals: &[NodeId],
    priority_vars: &[NodeId],
) -> HashMap<NodeId, NodeId> {
    let mut subst: HashMap<NodeId, NodeId> = HashMap::new();
    for &lit in literals {
        if let NodeData::Eq(a, b) = g.data(lit).clone() {
            let a = substitute(g, a, &subst);
            let b = substitute(g, b, &subst);
            for &v in priority_vars {
                if subst.contains_key(&v) {
                    continue;
                }
                if let Some(value) = solve_for(g, a, b, v) {
                    subst.insert(v, value);
                    break;
                }
            }
        }
    }
    subst
}

/// Tries to solve `lhs = rhs` for `v`, handling the direct case and the
/// one-level linear cases (`v + c`, `v - c`, `c - v`) that are solvable
/// for one variable. Rejects a solution
/// that would make `v` depend on itself; any *other* variable is allowed
/// to appear in the resulting value.
fn solve_for(g: &mut TermGraph, lhs: NodeId, rhs: NodeId, v: NodeId) -> Option<NodeId> {
    let value = solve_side(g, lhs, rhs, v).or_else(|| solve_side(g, rhs, lhs, v))?;
    if mentions(g, value, v) {
        None
    } else {
        Some(value)
    }
}

/// Tries to express `v` using `side` (one operand of the equality) and
/// `other` (the remaining operand), assuming `side` is the one that
/// contains `v`.
fn solve_side(g: &mut TermGraph, side: NodeId, other: NodeId, v: NodeId) -> Option<NodeId> {
    if side == v {
        return Some(other);
    }
    match g.data(side).clone() {
        NodeData::Add(terms) if terms.len() == 2 => {
            let (var_term, rest) = if terms[0] == v {
                (terms[0], terms[1])
            } else if terms[1] == v {
                (terms[1], terms[0])
            } else {
                return None;
            };
            let _ = var_term;
            Some(g.mk_sub(other, rest))
        }
        NodeData::Sub(a, b) if a == v => Some(g.mk_add(vec![other, b])),
        NodeData::Sub(a, b) if b == v => Some(g.mk_sub(a, other)),
        _ => None,
    }
}

fn mentions(g: &TermGraph, n: NodeId, v: NodeId) -> bool {
    n == v || free_bound_vars(g, n).contains(&v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::Type;

    /// `x=0 ⇒ inv(x)`, `inv(x) ∧ x'=x+1 ⇒
    /// inv(x')`, `inv(x) ⇒ x≥0` decomposes into the matching pre/trans/post.
    #[test]
    fn decomposes_pre_trans_post() {
        let mut g = TermGraph::new();
        let inv = g.mk_function_symbol("inv", vec![Type::Int], Type::Bool);
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);

        // pre: x=0 => inv(x), as ¬(x=0) ∨ inv(x)
        let inv_x = g.mk_apply_uf(inv, vec![x]);
        let eq0 = g.mk_eq(x, zero);
        let pre_clause = g.mk_or(vec![g.mk_not(eq0), inv_x]);

        // trans: inv(x) ∧ x'=x+1 => inv(x'), as ¬inv(x) ∨ ¬(x'=x+1) ∨ inv(x')
        let xp = g.mk_bound_var("xp", Type::Int);
        let one = g.mk_int(1);
        let x_plus_1 = g.mk_add(vec![x, one]);
        let step_eq = g.mk_eq(xp, x_plus_1);
        let inv_xp = g.mk_apply_uf(inv, vec![xp]);
        let trans_clause =
            g.mk_or(vec![g.mk_not(inv_x), g.mk_not(step_eq), inv_xp]);

        // post: inv(x) => x>=0, as ¬inv(x) ∨ x>=0
        let geq0 = g.mk_geq(x, zero);
        let post_clause = g.mk_or(vec![g.mk_not(inv_x), geq0]);

        let body = g.mk_and(vec![pre_clause, trans_clause, post_clause]);

        let mut ti = TransitionInference::initialize(inv, vec![x]);
        ti.process(&mut g, body);
        assert!(ti.is_complete());

        let pre = ti.get_pre(&mut g);
        assert_eq!(pre, eq0);

        let post = ti.get_post(&mut g);
        assert_eq!(post, geq0);

        assert_eq!(ti.prime_vars().len(), 1);
    }

    /// The deterministic unfolding of
    /// `pre=(x=0∧y=0)`, `trans=(x'=x+1∧y'=y+1∧x<3)`, `post=(x=y)`
    /// terminates with a trivial invariant after 4 states.
    #[test]
    fn auto_unfold_discovers_finite_invariant() {
        let mut g = TermGraph::new();
        let inv = g.mk_function_symbol("inv", vec![Type::Int, Type::Int], Type::Bool);
        let x = g.mk_bound_var("x", Type::Int);
        let y = g.mk_bound_var("y", Type::Int);
        let zero = g.mk_int(0);

        let inv_xy = g.mk_apply_uf(inv, vec![x, y]);
        let pre_eq = g.mk_and(vec![g.mk_eq(x, zero), g.mk_eq(y, zero)]);
        let pre_clause = g.mk_or(vec![g.mk_not(pre_eq), inv_xy]);

        let xp = g.mk_bound_var("xp", Type::Int);
        let yp = g.mk_bound_var("yp", Type::Int);
        let one = g.mk_int(1);
        let three = g.mk_int(3);
        let x_step = g.mk_eq(xp, g.mk_add(vec![x, one]));
        let y_step = g.mk_eq(yp, g.mk_add(vec![y, one]));
        let guard = g.mk_lt(x, three);
        let inv_xpyp = g.mk_apply_uf(inv, vec![xp, yp]);
        let trans_clause = g.mk_or(vec![
            g.mk_not(inv_xy),
            g.mk_not(x_step),
            g.mk_not(y_step),
            g.mk_not(guard),
            inv_xpyp,
        ]);

        let post_eq = g.mk_eq(x, y);
        let post_clause = g.mk_or(vec![g.mk_not(inv_xy), post_eq]);

        let body = g.mk_and(vec![pre_clause, trans_clause, post_clause]);

        let mut ti = TransitionInference::initialize(inv, vec![x, y]);
        ti.process(&mut g, body);
        assert!(ti.is_complete());

        let formula = ti.auto_unfold(&mut g, DEFAULT_UNFOLD_STEP_LIMIT);
        let formula = formula.expect("finite deterministic trace should terminate");
        match g.data(formula) {
            NodeData::Or(cs) => assert_eq!(cs.len(), 4),
            other => panic!("expected a 4-way disjunction, got {other:?}"),
        }
    }

    #[test]
    fn clause_with_two_functions_marks_incomplete() {
        let mut g = TermGraph::new();
        let inv = g.mk_function_symbol("inv", vec![Type::Int], Type::Bool);
        let other = g.mk_function_symbol("other", vec![Type::Int], Type::Bool);
        let x = g.mk_bound_var("x", Type::Int);
        let inv_x = g.mk_apply_uf(inv, vec![x]);
        let other_x = g.mk_apply_uf(other, vec![x]);
        let clause = g.mk_or(vec![g.mk_not(inv_x), other_x]);

        let mut ti = TransitionInference::initialize(inv, vec![x]);
        ti.process(&mut g, clause);
        assert!(!ti.is_complete());
    }
}
