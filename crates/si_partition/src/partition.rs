//! `SingleInvocationPartition`.
//!
//! Splits a conjecture into the part where every synthesis function is
//! invoked through one shared argument tuple (anti-skolemizable into a
//! fresh first-order variable) and the part that is not.

use std::collections::{HashMap, HashSet};

use si_term::node::NodeData;
use si_term::{NodeId, TermGraph, Type};

use crate::forall::contains_forall;

/// Bucket index into [`SingleInvocationPartition::conjuncts`].
pub const SI: usize = 0;
pub const NSI: usize = 1;
pub const ALL: usize = 2;
pub const NGSI: usize = 3;

/// The result of partitioning one conjecture.
pub struct SingleInvocationPartition {
    pub arg_types: Vec<Type>,
    /// Accepted-ness per recognized function-symbol node.
    pub funcs: HashMap<NodeId, bool>,
    pub func_inv: HashMap<NodeId, NodeId>,
    pub inv_to_func: HashMap<NodeId, NodeId>,
    pub func_fo_var: HashMap<NodeId, NodeId>,
    pub fo_var_to_func: HashMap<NodeId, NodeId>,
    pub func_vars: Vec<NodeId>,
    pub si_vars: Vec<NodeId>,
    pub all_vars: Vec<NodeId>,
    pub conjuncts: [Vec<NodeId>; 4],
    accept_cache: HashMap<NodeId, bool>,
}

impl SingleInvocationPartition {
    /// Infers the function set from the first `APPLY_UF` encountered in
    /// `n`, then partitions.
    pub fn init(g: &mut TermGraph, n: NodeId) -> Option<Self> {
        let first = find_first_apply_uf(g, n)?;
        let func = match g.data(first) {
            NodeData::ApplyUf { func, .. } => *func,
            _ => unreachable!(),
        };
        Self::init_with_funcs(g, vec![func], n)
    }

    /// Accepts an explicit function list; all functions must share an
    /// argument-type signature.
    pub fn init_with_funcs(g: &mut TermGraph, funcs: Vec<NodeId>, n: NodeId) -> Option<Self> {
        if contains_forall(g, n) {
            return None;
        }
        let arg_types = match g.data(funcs[0]).clone() {
            NodeData::FunctionSymbol { arg_types, .. } => arg_types,
            _ => return None,
        };
        for f in &funcs {
            match g.data(*f) {
                NodeData::FunctionSymbol { arg_types: a, .. } if *a == arg_types => {}
                _ => return None,
            }
        }

        let m = arg_types.len();
        let si_vars: Vec<NodeId> = arg_types
            .iter()
            .enumerate()
            .map(|(j, ty)| g.mk_fresh_bound_var("s", j as u32, ty.clone()))
            .collect();

        let mut part = SingleInvocationPartition {
            arg_types,
            funcs: HashMap::new(),
            func_inv: HashMap::new(),
            inv_to_func: HashMap::new(),
            func_fo_var: HashMap::new(),
            fo_var_to_func: HashMap::new(),
            func_vars: Vec::new(),
            si_vars,
            all_vars: Vec::new(),
            conjuncts: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
            accept_cache: HashMap::new(),
        };

        for f in funcs {
            part.funcs.insert(f, true);
            part.accept_cache.insert(f, true);
            let ret_ty = match g.data(f) {
                NodeData::FunctionSymbol { ret_ty, .. } => ret_ty.clone(),
                _ => return None,
            };
            let name = g.interner.resolve(g.function_name(f)).to_string();
            let inv = g.mk_apply_uf(f, part.si_vars.clone());
            let fo_var = g.mk_skolem(&format!("F_{name}"), ret_ty);
            part.func_inv.insert(f, inv);
            part.inv_to_func.insert(inv, f);
            part.func_fo_var.insert(f, fo_var);
            part.fo_var_to_func.insert(fo_var, f);
            part.func_vars.push(fo_var);
        }

        part.process(g, n, m);
        Some(part)
    }

    /// Accept `f` iff its argument types exactly match `arg_types`
    /// (arity-0 accepted when `arg_types` is empty). Cached.
    pub fn is_anti_skolemizable_type(&mut self, g: &TermGraph, f: NodeId) -> bool {
        if let Some(&cached) = self.accept_cache.get(&f) {
            return cached;
        }
        let accepted = match g.data(f) {
            NodeData::FunctionSymbol { arg_types, .. } => *arg_types == self.arg_types,
            _ => false,
        };
        self.accept_cache.insert(f, accepted);
        accepted
    }

    pub fn get_conjunct(&self, g: &mut TermGraph, index: usize) -> NodeId {
        g.mk_and(self.conjuncts[index].clone())
    }

    pub fn get_single_invocation(&self, g: &mut TermGraph) -> NodeId {
        self.get_conjunct(g, SI)
    }

    pub fn get_non_single_invocation(&self, g: &mut TermGraph) -> NodeId {
        self.get_conjunct(g, NSI)
    }

    pub fn get_full_specification(&self, g: &mut TermGraph) -> NodeId {
        self.get_conjunct(g, ALL)
    }

    pub fn is_purely_single_invocation(&self) -> bool {
        self.conjuncts[NSI].is_empty()
    }

    pub fn is_non_ground_single_invocation(&self) -> bool {
        self.conjuncts[NGSI].len() == self.conjuncts[NSI].len()
    }

    /// Hunts the SI conjuncts for top-level equalities between a state
    /// variable `s_j` and a ground term (one not mentioning any `s_i`),
    /// grouping by conjunct: a conjunct only contributes a substitution
    /// tuple when every `s_1..s_m` is covered by one of its equalities.
    /// These tuples seed the instantiator before the main CEGIS loop runs,
    /// which is a frequent case in practice for conjuncts shaped like
    /// `s = 0 ⇒ …`.
    pub fn collect_presolve_equalities(&self, g: &mut TermGraph) -> Vec<Vec<NodeId>> {
        let mut out = Vec::new();
        for &conjunct in &self.conjuncts[SI] {
            let mut subst: HashMap<NodeId, NodeId> = HashMap::new();
            for lit in flatten_top_and(g, conjunct) {
                if let NodeData::Eq(a, b) = g.data(lit).clone() {
                    for (lhs, rhs) in [(a, b), (b, a)] {
                        if self.si_vars.contains(&lhs)
                            && !subst.contains_key(&lhs)
                            && !mentions_any(g, rhs, &self.si_vars)
                        {
                            subst.insert(lhs, rhs);
                        }
                    }
                }
            }
            if let Some(tuple) = self.si_vars.iter().map(|v| subst.get(v).copied()).collect() {
                out.push(tuple);
            }
        }
        out
    }

    /// Rewrites bucket `index`, replacing every accepted-function
    /// application by the body of its lambda in `lambdas`, substituting
    /// the lambda's parameters by the application's actual arguments and
    /// beta-reducing.
    pub fn get_specification_inst(
        &self,
        g: &mut TermGraph,
        index: usize,
        lambdas: &HashMap<NodeId, NodeId>,
    ) -> NodeId {
        let conjunction = self.get_conjunct(g, index);
        let mut memo = HashMap::new();
        rewrite_with_lambdas(g, conjunction, lambdas, &mut memo)
    }

    // -- internal: processing a formula n ---------------------------------

    fn process(&mut self, g: &mut TermGraph, n: NodeId, m: usize) {
        let mut raw_conjuncts = Vec::new();
        if !collect_conjuncts(g, n, true, &mut raw_conjuncts) {
            // Embedded FORALL or un-decomposable shape: produce an empty
            // partition. The partition is total, so this is not an error.
            return;
        }

        for c in raw_conjuncts {
            let (rewritten, is_si, is_ngsi) = self.process_conjunct(g, c, m);
            self.conjuncts[ALL].push(rewritten);
            if is_si {
                let si_form =
                    si_term::substitute(g, rewritten, &self.invocation_to_fo_var_subst());
                self.conjuncts[SI].push(si_form);
            } else {
                self.conjuncts[NSI].push(rewritten);
                if is_ngsi {
                    self.conjuncts[NGSI].push(rewritten);
                }
            }
        }

        let mut seen = HashSet::new();
        for &c in &self.conjuncts[ALL] {
            for v in si_term::free_bound_vars(g, c) {
                if seen.insert(v) {
                    self.all_vars.push(v);
                }
            }
        }
    }

    fn invocation_to_fo_var_subst(&self) -> HashMap<NodeId, NodeId> {
        self.func_inv
            .iter()
            .map(|(f, inv)| (*inv, self.func_fo_var[f]))
            .collect()
    }

    /// Returns `(rewritten_conjunct, is_single_invocation, is_non_ground_si)`.
    fn process_conjunct(&mut self, g: &mut TermGraph, c: NodeId, m: usize) -> (NodeId, bool, bool) {
        let occurrences = collect_accepted_applications(g, c, &self.funcs);

        let canonical = occurrences.first().map(|(_, args)| args.clone());
        let mismatched = match &canonical {
            None => false,
            Some(tuple) => occurrences.iter().any(|(_, args)| args != tuple),
        };

        let mut rewritten = c;
        let mut extra_disjuncts = Vec::new();

        if let Some(tuple) = &canonical {
            // Rename distinct bound-variable canonical positions to
            // `s_1..s_m`; guard non-distinct/non-variable positions with
            // an explicit disjunct instead.
            let mut rename = HashMap::new();
            let mut position_count: HashMap<NodeId, usize> = HashMap::new();
            for a in tuple {
                *position_count.entry(*a).or_insert(0) += 1;
            }
            for (j, a) in tuple.iter().enumerate() {
                let is_simple_var =
                    matches!(g.data(*a), NodeData::BoundVar { .. }) && position_count[a] == 1;
                if is_simple_var {
                    rename.insert(*a, self.si_vars[j]);
                } else {
                    let neq = g.mk_eq(self.si_vars[j], *a);
                    extra_disjuncts.push(g.mk_not(neq));
                }
            }

            // Replace matching occurrences' applications with the
            // canonical invocation term, leave mismatched ones untouched.
            let mut replace = HashMap::new();
            for (app, args) in &occurrences {
                if args == tuple {
                    if let NodeData::ApplyUf { func, .. } = g.data(*app) {
                        replace.insert(*app, self.func_inv[func]);
                    }
                }
            }
            rewritten = substitute_nodes(g, rewritten, &replace);
            rewritten = si_term::substitute(g, rewritten, &rename);

            if !extra_disjuncts.is_empty() {
                extra_disjuncts.push(rewritten);
                rewritten = g.mk_or(extra_disjuncts);
            }
        }

        let free = si_term::free_bound_vars(g, rewritten);
        let is_ngsi = free.len() > m;
        let is_si = !mismatched && !is_ngsi;
        (rewritten, is_si, is_ngsi)
    }
}

fn flatten_top_and(g: &TermGraph, n: NodeId) -> Vec<NodeId> {
    match g.data(n).clone() {
        NodeData::And(cs) => cs,
        _ => vec![n],
    }
}

fn mentions_any(g: &TermGraph, n: NodeId, vars: &[NodeId]) -> bool {
    let free = si_term::free_bound_vars(g, n);
    vars.iter().any(|v| free.contains(v))
}

fn find_first_apply_uf(g: &TermGraph, n: NodeId) -> Option<NodeId> {
    let mut memo = HashSet::new();
    find_first_apply_uf_rec(g, n, &mut memo)
}

fn find_first_apply_uf_rec(g: &TermGraph, n: NodeId, visited: &mut HashSet<NodeId>) -> Option<NodeId> {
    if !visited.insert(n) {
        return None;
    }
    if matches!(g.data(n), NodeData::ApplyUf { .. }) {
        return Some(n);
    }
    for c in g.children(n) {
        if let Some(found) = find_first_apply_uf_rec(g, c, visited) {
            return Some(found);
        }
    }
    None
}

/// Walks down conjunctive layers, pushing `¬`
/// through `¬OR`/`¬AND` and failing on an embedded `FORALL` anywhere in
/// the reached subtree.
fn collect_conjuncts(g: &mut TermGraph, n: NodeId, pol: bool, out: &mut Vec<NodeId>) -> bool {
    match g.data(n).clone() {
        NodeData::Forall { .. } => false,
        NodeData::Not(a) => collect_conjuncts(g, a, !pol, out),
        NodeData::And(cs) if pol => {
            for c in cs {
                if !collect_conjuncts(g, c, true, out) {
                    return false;
                }
            }
            true
        }
        NodeData::Or(cs) if !pol => {
            for c in cs {
                if !collect_conjuncts(g, c, false, out) {
                    return false;
                }
            }
            true
        }
        _ => {
            if contains_forall(g, n) {
                return false;
            }
            let literal = if pol { n } else { si_term::push_negation(g, n, true) };
            out.push(literal);
            true
        }
    }
}

/// Every `APPLY_UF` node of an accepted function under `n`, in
/// left-to-right pre-order, as `(application, args)`.
fn collect_accepted_applications(
    g: &TermGraph,
    n: NodeId,
    funcs: &HashMap<NodeId, bool>,
) -> Vec<(NodeId, Vec<NodeId>)> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    collect_accepted_rec(g, n, funcs, &mut visited, &mut out);
    out
}

fn collect_accepted_rec(
    g: &TermGraph,
    n: NodeId,
    funcs: &HashMap<NodeId, bool>,
    visited: &mut HashSet<NodeId>,
    out: &mut Vec<(NodeId, Vec<NodeId>)>,
) {
    if !visited.insert(n) {
        return;
    }
    if let NodeData::ApplyUf { func, args } = g.data(n) {
        if funcs.get(func).copied().unwrap_or(false) {
            out.push((n, args.clone()));
        }
    }
    for c in g.children(n) {
        collect_accepted_rec(g, c, funcs, visited, out);
    }
}

/// Substitutes whole subtrees (not just leaves) by identity — used to
/// replace matching `APPLY_UF` occurrences with their canonical
/// invocation term before the variable-rename pass runs.
fn substitute_nodes(g: &mut TermGraph, n: NodeId, replace: &HashMap<NodeId, NodeId>) -> NodeId {
    let mut memo = HashMap::new();
    substitute_nodes_rec(g, n, replace, &mut memo)
}

fn substitute_nodes_rec(
    g: &mut TermGraph,
    n: NodeId,
    replace: &HashMap<NodeId, NodeId>,
    memo: &mut HashMap<NodeId, NodeId>,
) -> NodeId {
    if let Some(&r) = memo.get(&n) {
        return r;
    }
    let result = if let Some(&r) = replace.get(&n) {
        r
    } else {
        match g.data(n).clone() {
            NodeData::ApplyUf { func, args } => {
                let new_args: Vec<NodeId> =
                    args.iter().map(|a| substitute_nodes_rec(g, *a, replace, memo)).collect();
                g.mk_apply_uf(func, new_args)
            }
            NodeData::And(cs) => {
                let cs = cs.iter().map(|c| substitute_nodes_rec(g, *c, replace, memo)).collect();
                g.mk_and(cs)
            }
            NodeData::Or(cs) => {
                let cs = cs.iter().map(|c| substitute_nodes_rec(g, *c, replace, memo)).collect();
                g.mk_or(cs)
            }
            NodeData::Not(a) => {
                let a = substitute_nodes_rec(g, a, replace, memo);
                g.mk_not(a)
            }
            NodeData::Eq(a, b) => {
                let a = substitute_nodes_rec(g, a, replace, memo);
                let b = substitute_nodes_rec(g, b, replace, memo);
                g.mk_eq(a, b)
            }
            NodeData::Ite(c, t, e) => {
                let c = substitute_nodes_rec(g, c, replace, memo);
                let t = substitute_nodes_rec(g, t, replace, memo);
                let e = substitute_nodes_rec(g, e, replace, memo);
                g.mk_ite(c, t, e)
            }
            NodeData::Lt(a, b) => {
                let a = substitute_nodes_rec(g, a, replace, memo);
                let b = substitute_nodes_rec(g, b, replace, memo);
                g.mk_lt(a, b)
            }
            NodeData::Leq(a, b) => {
                let a = substitute_nodes_rec(g, a, replace, memo);
                let b = substitute_nodes_rec(g, b, replace, memo);
                g.mk_leq(a, b)
            }
            NodeData::Gt(a, b) => {
                let a = substitute_nodes_rec(g, a, replace, memo);
                let b = substitute_nodes_rec(g, b, replace, memo);
                g.mk_gt(a, b)
            }
            NodeData::Geq(a, b) => {
                let a = substitute_nodes_rec(g, a, replace, memo);
                let b = substitute_nodes_rec(g, b, replace, memo);
                g.mk_geq(a, b)
            }
            _ => n,
        }
    };
    memo.insert(n, result);
    result
}

fn rewrite_with_lambdas(
    g: &mut TermGraph,
    n: NodeId,
    lambdas: &HashMap<NodeId, NodeId>,
    memo: &mut HashMap<NodeId, NodeId>,
) -> NodeId {
    if let Some(&r) = memo.get(&n) {
        return r;
    }
    let result = match g.data(n).clone() {
        NodeData::ApplyUf { func, args } if lambdas.contains_key(&func) => {
            let new_args: Vec<NodeId> =
                args.iter().map(|a| rewrite_with_lambdas(g, *a, lambdas, memo)).collect();
            let lambda = lambdas[&func];
            match g.data(lambda).clone() {
                NodeData::Lambda { vars, body } => {
                    // One beta-reduction step only: the candidate body is
                    // substituted as-is, not recursively re-rewritten,
                    // since an identity lambda `λp. f(p)` would otherwise
                    // regenerate an `f`-application forever.
                    let subst: HashMap<NodeId, NodeId> =
                        vars.into_iter().zip(new_args.into_iter()).collect();
                    si_term::substitute(g, body, &subst)
                }
                _ => g.mk_apply_uf(func, new_args),
            }
        }
        NodeData::ApplyUf { func, args } => {
            let new_args: Vec<NodeId> =
                args.iter().map(|a| rewrite_with_lambdas(g, *a, lambdas, memo)).collect();
            g.mk_apply_uf(func, new_args)
        }
        NodeData::And(cs) => {
            let cs = cs.iter().map(|c| rewrite_with_lambdas(g, *c, lambdas, memo)).collect();
            g.mk_and(cs)
        }
        NodeData::Or(cs) => {
            let cs = cs.iter().map(|c| rewrite_with_lambdas(g, *c, lambdas, memo)).collect();
            g.mk_or(cs)
        }
        NodeData::Not(a) => {
            let a = rewrite_with_lambdas(g, a, lambdas, memo);
            g.mk_not(a)
        }
        NodeData::Eq(a, b) => {
            let a = rewrite_with_lambdas(g, a, lambdas, memo);
            let b = rewrite_with_lambdas(g, b, lambdas, memo);
            g.mk_eq(a, b)
        }
        NodeData::Ite(c, t, e) => {
            let c = rewrite_with_lambdas(g, c, lambdas, memo);
            let t = rewrite_with_lambdas(g, t, lambdas, memo);
            let e = rewrite_with_lambdas(g, e, lambdas, memo);
            g.mk_ite(c, t, e)
        }
        NodeData::Lt(a, b) => {
            let a = rewrite_with_lambdas(g, a, lambdas, memo);
            let b = rewrite_with_lambdas(g, b, lambdas, memo);
            g.mk_lt(a, b)
        }
        NodeData::Leq(a, b) => {
            let a = rewrite_with_lambdas(g, a, lambdas, memo);
            let b = rewrite_with_lambdas(g, b, lambdas, memo);
            g.mk_leq(a, b)
        }
        NodeData::Gt(a, b) => {
            let a = rewrite_with_lambdas(g, a, lambdas, memo);
            let b = rewrite_with_lambdas(g, b, lambdas, memo);
            g.mk_gt(a, b)
        }
        NodeData::Geq(a, b) => {
            let a = rewrite_with_lambdas(g, a, lambdas, memo);
            let b = rewrite_with_lambdas(g, b, lambdas, memo);
            g.mk_geq(a, b)
        }
        _ => n,
    };
    memo.insert(n, result);
    result
}
