//! Solution construction — folding an [`InstantiationRecord`] into the
//! single quantifier-free term a target synthesis function is replaced
//! by, per the ITE cascade.

use std::collections::HashMap;

use si_term::node::NodeData;
use si_term::{push_negation, size_and_ite_count, NodeId, TermGraph};

use crate::instantiation::InstantiationRecord;

/// Debug accounting reported alongside a constructed solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SolutionStats {
    pub term_size: usize,
    pub ite_count: usize,
}

/// Picks which recorded indices feed solution construction: all of them,
/// or (when an unsat core is available) only the subset the core retained,
/// with each retained lemma optionally weakened.
pub fn select_indices(
    record: &InstantiationRecord,
    core: Option<(Vec<NodeId>, Option<HashMap<NodeId, NodeId>>)>,
) -> (Vec<usize>, HashMap<NodeId, NodeId>) {
    match core {
        None => ((0..record.len()).collect(), HashMap::new()),
        Some((active, weak_imp)) => {
            let indices = (0..record.len())
                .filter(|&i| active.contains(&record.lemmas_produced()[i]))
                .collect();
            (indices, weak_imp.unwrap_or_default())
        }
    }
}

/// Stable sort placing indices whose solution value (for `program`) is a
/// constant ahead of ones that are not — a leading constant branch costs
/// a cheaper head test.
pub fn sort_indices_constant_first(
    g: &TermGraph,
    record: &InstantiationRecord,
    program: usize,
    indices: &mut [usize],
) {
    indices.sort_by_key(|&i| !matches!(g.data(record.value(i, program)), NodeData::Const(_)));
}

/// Folds `indices` right-to-left into an `ITE` cascade: `ITE(¬cond_k,
/// value_k, tail)`, where `cond_k` is `lemmas_produced[indices[k]]`
/// (possibly weakened) negated back to its positive form, and the last
/// index's value is the tail terminal.
pub fn construct_solution(
    g: &mut TermGraph,
    record: &InstantiationRecord,
    program: usize,
    indices: &[usize],
    weak_imp: &HashMap<NodeId, NodeId>,
) -> NodeId {
    assert!(!indices.is_empty(), "solution construction needs at least one instantiation");
    construct_rec(g, record, program, indices, 0, weak_imp)
}

fn construct_rec(
    g: &mut TermGraph,
    record: &InstantiationRecord,
    program: usize,
    indices: &[usize],
    pos: usize,
    weak_imp: &HashMap<NodeId, NodeId>,
) -> NodeId {
    let uindex = indices[pos];
    if pos == indices.len() - 1 {
        return record.value(uindex, program);
    }
    let guard = record.lemmas_produced()[uindex];
    let guard = weak_imp.get(&guard).copied().unwrap_or(guard);
    let cond = push_negation(g, guard, true);
    let then_branch = record.value(uindex, program);
    let else_branch = construct_rec(g, record, program, indices, pos + 1, weak_imp);
    g.mk_ite(cond, then_branch, else_branch)
}

/// Replaces total variants of integer division/modulus with their
/// partial counterparts, recursively. Everything else is rebuilt
/// identically (a no-op pass except at those two kinds).
pub fn post_process_solution(g: &mut TermGraph, n: NodeId) -> NodeId {
    let mut memo = HashMap::new();
    post_process_rec(g, n, &mut memo)
}

fn post_process_rec(g: &mut TermGraph, n: NodeId, memo: &mut HashMap<NodeId, NodeId>) -> NodeId {
    if let Some(&r) = memo.get(&n) {
        return r;
    }
    let result = match g.data(n).clone() {
        NodeData::Const(_)
        | NodeData::BoundVar { .. }
        | NodeData::Skolem { .. }
        | NodeData::FunctionSymbol { .. } => n,
        NodeData::ApplyUf { func, args } => {
            let args = args.iter().map(|a| post_process_rec(g, *a, memo)).collect();
            g.mk_apply_uf(func, args)
        }
        NodeData::Forall { vars, body } => {
            let body = post_process_rec(g, body, memo);
            g.mk_forall(vars, body)
        }
        NodeData::Lambda { vars, body } => {
            let body = post_process_rec(g, body, memo);
            g.mk_lambda(vars, body)
        }
        NodeData::And(cs) => {
            let cs = cs.iter().map(|c| post_process_rec(g, *c, memo)).collect();
            g.mk_and(cs)
        }
        NodeData::Or(cs) => {
            let cs = cs.iter().map(|c| post_process_rec(g, *c, memo)).collect();
            g.mk_or(cs)
        }
        NodeData::Not(a) => {
            let a = post_process_rec(g, a, memo);
            g.mk_not(a)
        }
        NodeData::Eq(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_eq(a, b)
        }
        NodeData::Ite(c, t, e) => {
            let c = post_process_rec(g, c, memo);
            let t = post_process_rec(g, t, memo);
            let e = post_process_rec(g, e, memo);
            g.mk_ite(c, t, e)
        }
        NodeData::Add(cs) => {
            let cs = cs.iter().map(|c| post_process_rec(g, *c, memo)).collect();
            g.mk_add(cs)
        }
        NodeData::Sub(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_sub(a, b)
        }
        NodeData::Mul(cs) => {
            let cs = cs.iter().map(|c| post_process_rec(g, *c, memo)).collect();
            g.mk_mul(cs)
        }
        NodeData::IntsDivisionTotal(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_ints_division(a, b)
        }
        NodeData::IntsDivision(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_ints_division(a, b)
        }
        NodeData::IntsModulusTotal(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_ints_modulus(a, b)
        }
        NodeData::IntsModulus(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_ints_modulus(a, b)
        }
        NodeData::Lt(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_lt(a, b)
        }
        NodeData::Leq(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_leq(a, b)
        }
        NodeData::Gt(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_gt(a, b)
        }
        NodeData::Geq(a, b) => {
            let a = post_process_rec(g, a, memo);
            let b = post_process_rec(g, b, memo);
            g.mk_geq(a, b)
        }
    };
    memo.insert(n, result);
    result
}

/// Debug validity check: warns if the constructed solution still
/// mentions a skolem outside `canonical_vars` — such a skolem could only
/// have leaked in through a bug in instantiation or substitution.
pub fn debug_check_solution(g: &TermGraph, n: NodeId, canonical_vars: &[NodeId]) {
    let mut visited = std::collections::HashSet::new();
    debug_check_rec(g, n, canonical_vars, &mut visited);
}

fn debug_check_rec(
    g: &TermGraph,
    n: NodeId,
    canonical_vars: &[NodeId],
    visited: &mut std::collections::HashSet<NodeId>,
) {
    if !visited.insert(n) {
        return;
    }
    if matches!(g.data(n), NodeData::Skolem { .. }) && !canonical_vars.contains(&n) {
        log::warn!("solution mentions a skolem outside the canonical variable list: {n:?}");
    }
    for c in g.children(n) {
        debug_check_rec(g, c, canonical_vars, visited);
    }
}

pub fn stats(g: &TermGraph, n: NodeId) -> SolutionStats {
    let (term_size, ite_count) = size_and_ite_count(g, n);
    SolutionStats { term_size, ite_count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::Type;

    fn record_scenario_six(g: &mut TermGraph) -> (InstantiationRecord, NodeId) {
        let q = g.mk_bool(true);
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);
        let one = g.mk_int(1);
        let mut rec = InstantiationRecord::new(q);
        let cond0 = g.mk_eq(x, zero);
        rec.record(g, vec![zero], cond0, vec![zero]);
        let cond1 = g.mk_eq(x, one);
        rec.record(g, vec![one], cond1, vec![one]);
        let always_true = g.mk_bool(true);
        rec.record(g, vec![x], always_true, vec![x]);
        (rec, x)
    }

    #[test]
    fn ite_cascade_matches_scenario_six() {
        let mut g = TermGraph::new();
        let (rec, x) = record_scenario_six(&mut g);
        let indices: Vec<usize> = (0..rec.len()).collect();
        let sol = construct_solution(&mut g, &rec, 0, &indices, &HashMap::new());

        let zero = g.mk_int(0);
        let one = g.mk_int(1);
        let cond0 = g.mk_eq(x, zero);
        let cond1 = g.mk_eq(x, one);
        let inner = g.mk_ite(cond1, one, x);
        let expected = g.mk_ite(cond0, zero, inner);
        assert_eq!(sol, expected);
    }

    #[test]
    fn constant_first_sort_is_a_no_op_when_already_sorted() {
        let mut g = TermGraph::new();
        let (rec, _x) = record_scenario_six(&mut g);
        let mut indices: Vec<usize> = (0..rec.len()).collect();
        sort_indices_constant_first(&g, &rec, 0, &mut indices);
        // the two constant branches (0, 1) sort ahead of the final
        // variable branch (x), which is already the case here.
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn unsat_core_restricts_to_active_lemmas() {
        let mut g = TermGraph::new();
        let (rec, _x) = record_scenario_six(&mut g);
        let active = vec![rec.lemmas_produced()[1]];
        let (indices, weak) = select_indices(&rec, Some((active, None)));
        assert_eq!(indices, vec![1]);
        assert!(weak.is_empty());
    }

    #[test]
    fn post_process_rewrites_total_division_and_modulus() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let two = g.mk_int(2);
        let total = g.mk_ints_division_total(x, two);
        let processed = post_process_solution(&mut g, total);
        assert_eq!(processed, g.mk_ints_division(x, two));
    }
}
