//! The hash-consed expression DAG.
//!
//! `TermGraph` is the one mutable, append-only structure shared by every
//! component of the engine, replacing the ambient "current node manager"
//! idiom: constructors take `&mut TermGraph` and return a
//! [`NodeId`]; nothing ever mutates an existing node.

use std::collections::HashMap;

use crate::node::{Kind, Literal, NodeData, NodeId, Type};
use si_base::{Interner, Symbol};

/// Hash-conses [`NodeData`] into stable [`NodeId`] handles.
pub struct TermGraph {
    table: HashMap<NodeData, NodeId>,
    nodes: Vec<NodeData>,
    types: Vec<Type>,
    pub interner: Interner,
}

impl TermGraph {
    pub fn new() -> Self {
        TermGraph {
            table: HashMap::new(),
            nodes: Vec::new(),
            types: Vec::new(),
            interner: Interner::new(),
        }
    }

    fn insert(&mut self, data: NodeData, ty: Type) -> NodeId {
        if let Some(&id) = self.table.get(&data) {
            return id;
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(data.clone());
        self.types.push(ty);
        self.table.insert(data, id);
        id
    }

    pub fn data(&self, n: NodeId) -> &NodeData {
        &self.nodes[n.index()]
    }

    pub fn kind(&self, n: NodeId) -> Kind {
        self.data(n).kind()
    }

    pub fn get_type(&self, n: NodeId) -> &Type {
        &self.types[n.index()]
    }

    pub fn is_const(&self, n: NodeId) -> bool {
        matches!(self.data(n), NodeData::Const(_))
    }

    pub fn get_operator(&self, n: NodeId) -> Option<NodeId> {
        self.data(n).operator()
    }

    pub fn get_bound_vars(&self, n: NodeId) -> Vec<NodeId> {
        self.data(n).bound_vars().to_vec()
    }

    pub fn children(&self, n: NodeId) -> Vec<NodeId> {
        self.data(n).children()
    }

    // -- constructors -----------------------------------------------------

    pub fn mk_bool(&mut self, b: bool) -> NodeId {
        self.insert(NodeData::Const(Literal::Bool(b)), Type::Bool)
    }

    pub fn mk_int(&mut self, v: i64) -> NodeId {
        self.insert(NodeData::Const(Literal::Int(v)), Type::Int)
    }

    pub fn mk_bound_var(&mut self, name: &str, ty: Type) -> NodeId {
        let sym = self.interner.intern(name);
        self.insert(NodeData::BoundVar { name: sym, ty: ty.clone() }, ty)
    }

    /// A fresh bound variable is never hash-consed against an existing one
    /// of the same name: callers that need genuine freshness (skolemizing
    /// `s_1..s_m`, allocating primed transition variables) must mint a
    /// unique name themselves, e.g. by suffixing a counter.
    pub fn mk_fresh_bound_var(&mut self, base: &str, counter: u32, ty: Type) -> NodeId {
        self.mk_bound_var(&format!("{base}!{counter}"), ty)
    }

    pub fn mk_skolem(&mut self, name: &str, ty: Type) -> NodeId {
        let sym = self.interner.intern(name);
        self.insert(NodeData::Skolem { name: sym, ty: ty.clone() }, ty)
    }

    pub fn mk_function_symbol(&mut self, name: &str, arg_types: Vec<Type>, ret_ty: Type) -> NodeId {
        let sym = self.interner.intern(name);
        let ty = Type::Function(arg_types.clone(), Box::new(ret_ty.clone()));
        self.insert(NodeData::FunctionSymbol { name: sym, arg_types, ret_ty }, ty)
    }

    pub fn mk_apply_uf(&mut self, func: NodeId, args: Vec<NodeId>) -> NodeId {
        let ret_ty = match self.data(func) {
            NodeData::FunctionSymbol { ret_ty, .. } => ret_ty.clone(),
            _ => panic!("mk_apply_uf: operator is not a function symbol"),
        };
        self.insert(NodeData::ApplyUf { func, args }, ret_ty)
    }

    pub fn function_name(&self, func: NodeId) -> Symbol {
        match self.data(func) {
            NodeData::FunctionSymbol { name, .. } => *name,
            _ => panic!("function_name: not a function symbol"),
        }
    }

    pub fn mk_forall(&mut self, vars: Vec<NodeId>, body: NodeId) -> NodeId {
        if vars.is_empty() {
            return body;
        }
        self.insert(NodeData::Forall { vars, body }, Type::Bool)
    }

    pub fn mk_lambda(&mut self, vars: Vec<NodeId>, body: NodeId) -> NodeId {
        let body_ty = self.get_type(body).clone();
        let arg_types = vars.iter().map(|v| self.get_type(*v).clone()).collect();
        self.insert(
            NodeData::Lambda { vars, body },
            Type::Function(arg_types, Box::new(body_ty)),
        )
    }

    /// Smart `AND`: flattens nested conjunctions, drops redundant `true`
    /// conjuncts, and short-circuits to `false` if any conjunct is `false`.
    pub fn mk_and(&mut self, conjuncts: Vec<NodeId>) -> NodeId {
        let mut flat = Vec::with_capacity(conjuncts.len());
        for c in conjuncts {
            match self.data(c).clone() {
                NodeData::And(inner) => flat.extend(inner),
                NodeData::Const(Literal::Bool(true)) => {}
                NodeData::Const(Literal::Bool(false)) => return self.mk_bool(false),
                _ => flat.push(c),
            }
        }
        match flat.len() {
            0 => self.mk_bool(true),
            1 => flat[0],
            _ => self.insert(NodeData::And(flat), Type::Bool),
        }
    }

    /// Smart `OR`, the dual of [`TermGraph::mk_and`].
    pub fn mk_or(&mut self, disjuncts: Vec<NodeId>) -> NodeId {
        let mut flat = Vec::with_capacity(disjuncts.len());
        for d in disjuncts {
            match self.data(d).clone() {
                NodeData::Or(inner) => flat.extend(inner),
                NodeData::Const(Literal::Bool(false)) => {}
                NodeData::Const(Literal::Bool(true)) => return self.mk_bool(true),
                _ => flat.push(d),
            }
        }
        match flat.len() {
            0 => self.mk_bool(false),
            1 => flat[0],
            _ => self.insert(NodeData::Or(flat), Type::Bool),
        }
    }

    /// Simple negation: double-negation elimination and constant folding, otherwise wraps
    /// in `NOT`. This is *not* a full NNF push — callers that need the
    /// negation pushed through `AND`/`OR`/quantifiers call
    /// [`crate::walk::push_negation`].
    pub fn mk_not(&mut self, n: NodeId) -> NodeId {
        match self.data(n).clone() {
            NodeData::Not(inner) => inner,
            NodeData::Const(Literal::Bool(b)) => self.mk_bool(!b),
            _ => self.insert(NodeData::Not(n), Type::Bool),
        }
    }

    pub fn mk_eq(&mut self, a: NodeId, b: NodeId) -> NodeId {
        if a == b {
            return self.mk_bool(true);
        }
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        self.insert(NodeData::Eq(a, b), Type::Bool)
    }

    pub fn mk_ite(&mut self, cond: NodeId, then_branch: NodeId, else_branch: NodeId) -> NodeId {
        if let NodeData::Const(Literal::Bool(b)) = self.data(cond) {
            return if *b { then_branch } else { else_branch };
        }
        if then_branch == else_branch {
            return then_branch;
        }
        let ty = self.get_type(then_branch).clone();
        self.insert(NodeData::Ite(cond, then_branch, else_branch), ty)
    }

    pub fn mk_add(&mut self, terms: Vec<NodeId>) -> NodeId {
        let mut flat = Vec::with_capacity(terms.len());
        let mut constant = 0i64;
        for t in terms {
            match self.data(t).clone() {
                NodeData::Add(inner) => flat.extend(inner),
                NodeData::Const(Literal::Int(v)) => constant += v,
                _ => flat.push(t),
            }
        }
        if constant != 0 || flat.is_empty() {
            let c = self.mk_int(constant);
            flat.push(c);
        }
        match flat.len() {
            1 => flat[0],
            _ => self.insert(NodeData::Add(flat), Type::Int),
        }
    }

    pub fn mk_sub(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::Sub(a, b), Type::Int)
    }

    pub fn mk_mul(&mut self, factors: Vec<NodeId>) -> NodeId {
        self.insert(NodeData::Mul(factors), Type::Int)
    }

    pub fn mk_ints_division_total(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::IntsDivisionTotal(a, b), Type::Int)
    }

    pub fn mk_ints_division(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::IntsDivision(a, b), Type::Int)
    }

    pub fn mk_ints_modulus_total(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::IntsModulusTotal(a, b), Type::Int)
    }

    pub fn mk_ints_modulus(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::IntsModulus(a, b), Type::Int)
    }

    pub fn mk_lt(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::Lt(a, b), Type::Bool)
    }

    pub fn mk_leq(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::Leq(a, b), Type::Bool)
    }

    pub fn mk_gt(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::Gt(a, b), Type::Bool)
    }

    pub fn mk_geq(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.insert(NodeData::Geq(a, b), Type::Bool)
    }
}

impl Default for TermGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_consing_returns_same_id() {
        let mut g = TermGraph::new();
        let a = g.mk_int(5);
        let b = g.mk_int(5);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_constants_get_distinct_ids() {
        let mut g = TermGraph::new();
        let a = g.mk_int(5);
        let b = g.mk_int(6);
        assert_ne!(a, b);
    }

    #[test]
    fn and_of_single_conjunct_is_identity() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let e = g.mk_leq(x, x);
        assert_eq!(g.mk_and(vec![e]), e);
    }

    #[test]
    fn and_flattens_nested_conjunctions() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let a = g.mk_leq(x, x);
        let b = g.mk_geq(x, x);
        let inner = g.mk_and(vec![a, b]);
        let c = g.mk_lt(x, x);
        let outer = g.mk_and(vec![inner, c]);
        match g.data(outer) {
            NodeData::And(cs) => assert_eq!(cs.len(), 3),
            _ => panic!("expected flattened And"),
        }
    }

    #[test]
    fn and_with_false_conjunct_is_false() {
        let mut g = TermGraph::new();
        let t = g.mk_bool(true);
        let f = g.mk_bool(false);
        let out = g.mk_and(vec![t, f]);
        assert_eq!(out, g.mk_bool(false));
    }

    #[test]
    fn double_negation_cancels() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let e = g.mk_leq(x, x);
        let n1 = g.mk_not(e);
        let n2 = g.mk_not(n1);
        assert_eq!(n2, e);
    }

    #[test]
    fn eq_is_commutative_under_hash_consing() {
        let mut g = TermGraph::new();
        let a = g.mk_int(1);
        let b = g.mk_int(2);
        assert_eq!(g.mk_eq(a, b), g.mk_eq(b, a));
    }

    #[test]
    fn eq_of_identical_nodes_is_true() {
        let mut g = TermGraph::new();
        let a = g.mk_int(1);
        assert_eq!(g.mk_eq(a, a), g.mk_bool(true));
    }

    #[test]
    fn ite_with_constant_condition_simplifies() {
        let mut g = TermGraph::new();
        let t = g.mk_bool(true);
        let a = g.mk_int(1);
        let b = g.mk_int(2);
        assert_eq!(g.mk_ite(t, a, b), a);
    }

    #[test]
    fn apply_uf_has_operator_and_ret_type() {
        let mut g = TermGraph::new();
        let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
        let x = g.mk_bound_var("x", Type::Int);
        let app = g.mk_apply_uf(f, vec![x]);
        assert_eq!(g.get_operator(app), Some(f));
        assert_eq!(*g.get_type(app), Type::Int);
    }
}
