//! Ground-term evaluation.
//!
//! The deterministic unfolding loop needs to decide whether a guard is
//! true or false once every state variable has been substituted by a
//! concrete integer/boolean constant. `TermGraph`'s smart constructors
//! only fold the handful of cases that come up while building formulas
//! (double negation, constant-operand `AND`/`OR`); deciding `3 < 5` is a
//! job for this module, not the constructor layer.
//!
//! Evaluation is partial: a node that still mentions a skolem, bound
//! variable, or function application returns `None` rather than
//! panicking — except `AND`/`OR`, which absorb a known `false`/`true`
//! child and decide the whole expression even when a sibling child is
//! still unresolved. That absorption is what lets `increment_trace`
//! detect termination from a transition component that still mentions
//! the unassigned primed variables.

use si_term::node::{Literal, NodeData};
use si_term::{NodeId, TermGraph};

pub(crate) fn eval_bool(g: &TermGraph, n: NodeId) -> Option<bool> {
    match g.data(n).clone() {
        NodeData::Const(Literal::Bool(b)) => Some(b),
        NodeData::And(cs) => {
            let mut unknown = false;
            for c in &cs {
                match eval_bool(g, *c) {
                    Some(false) => return Some(false),
                    Some(true) => {}
                    None => unknown = true,
                }
            }
            if unknown {
                None
            } else {
                Some(true)
            }
        }
        NodeData::Or(cs) => {
            let mut unknown = false;
            for c in &cs {
                match eval_bool(g, *c) {
                    Some(true) => return Some(true),
                    Some(false) => {}
                    None => unknown = true,
                }
            }
            if unknown {
                None
            } else {
                Some(false)
            }
        }
        NodeData::Not(a) => eval_bool(g, a).map(|b| !b),
        NodeData::Ite(c, t, e) => {
            if eval_bool(g, c)? {
                eval_bool(g, t)
            } else {
                eval_bool(g, e)
            }
        }
        NodeData::Eq(a, b) => eval_eq(g, a, b),
        NodeData::Lt(a, b) => Some(eval_int(g, a)? < eval_int(g, b)?),
        NodeData::Leq(a, b) => Some(eval_int(g, a)? <= eval_int(g, b)?),
        NodeData::Gt(a, b) => Some(eval_int(g, a)? > eval_int(g, b)?),
        NodeData::Geq(a, b) => Some(eval_int(g, a)? >= eval_int(g, b)?),
        _ => None,
    }
}

fn eval_eq(g: &TermGraph, a: NodeId, b: NodeId) -> Option<bool> {
    if let (Some(x), Some(y)) = (eval_int(g, a), eval_int(g, b)) {
        return Some(x == y);
    }
    if let (Some(x), Some(y)) = (eval_bool(g, a), eval_bool(g, b)) {
        return Some(x == y);
    }
    None
}

pub(crate) fn eval_int(g: &TermGraph, n: NodeId) -> Option<i64> {
    match g.data(n).clone() {
        NodeData::Const(Literal::Int(v)) => Some(v),
        NodeData::Add(cs) => cs.iter().try_fold(0i64, |acc, c| Some(acc + eval_int(g, *c)?)),
        NodeData::Sub(a, b) => Some(eval_int(g, a)? - eval_int(g, b)?),
        NodeData::Mul(cs) => cs.iter().try_fold(1i64, |acc, c| Some(acc * eval_int(g, *c)?)),
        NodeData::IntsDivisionTotal(a, b) => {
            let (a, b) = (eval_int(g, a)?, eval_int(g, b)?);
            Some(if b == 0 { 0 } else { a.div_euclid(b) })
        }
        NodeData::IntsDivision(a, b) => {
            let (a, b) = (eval_int(g, a)?, eval_int(g, b)?);
            if b == 0 {
                None
            } else {
                Some(a.div_euclid(b))
            }
        }
        NodeData::IntsModulusTotal(a, b) => {
            let (a, b) = (eval_int(g, a)?, eval_int(g, b)?);
            Some(if b == 0 { a } else { a.rem_euclid(b) })
        }
        NodeData::IntsModulus(a, b) => {
            let (a, b) = (eval_int(g, a)?, eval_int(g, b)?);
            if b == 0 {
                None
            } else {
                Some(a.rem_euclid(b))
            }
        }
        NodeData::Ite(c, t, e) => {
            if eval_bool(g, c)? {
                eval_int(g, t)
            } else {
                eval_int(g, e)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::TermGraph;

    #[test]
    fn evaluates_arithmetic_comparison() {
        let mut g = TermGraph::new();
        let a = g.mk_int(3);
        let b = g.mk_int(5);
        let lt = g.mk_lt(a, b);
        assert_eq!(eval_bool(&g, lt), Some(true));
    }

    #[test]
    fn evaluates_nested_arithmetic() {
        let mut g = TermGraph::new();
        let one = g.mk_int(1);
        let two = g.mk_int(2);
        let sum = g.mk_add(vec![one, two]);
        let three = g.mk_int(3);
        let eq = g.mk_eq(sum, three);
        assert_eq!(eval_bool(&g, eq), Some(true));
    }

    #[test]
    fn skolem_is_unevaluable() {
        let mut g = TermGraph::new();
        let s = g.mk_skolem("a", si_term::Type::Int);
        let zero = g.mk_int(0);
        let eq = g.mk_eq(s, zero);
        assert_eq!(eval_bool(&g, eq), None);
    }

    #[test]
    fn total_division_by_zero_is_zero() {
        let mut g = TermGraph::new();
        let a = g.mk_int(7);
        let zero = g.mk_int(0);
        let d = g.mk_ints_division_total(a, zero);
        assert_eq!(eval_int(&g, d), Some(0));
    }
}
