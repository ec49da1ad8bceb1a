//! Renders a [`NodeId`] back into the S-expression surface syntax
//! `format` parses, for printing guard lemmas and constructed solutions.

use si_term::node::{Literal, NodeData};
use si_term::{NodeId, TermGraph};

pub fn render(g: &TermGraph, n: NodeId) -> String {
    let mut out = String::new();
    render_rec(g, n, &mut out);
    out
}

fn render_rec(g: &TermGraph, n: NodeId, out: &mut String) {
    match g.data(n) {
        NodeData::Const(Literal::Bool(b)) => out.push_str(&b.to_string()),
        NodeData::Const(Literal::Int(v)) => out.push_str(&v.to_string()),
        NodeData::BoundVar { name, .. } => out.push_str(g.interner.resolve(*name)),
        NodeData::Skolem { name, .. } => out.push_str(g.interner.resolve(*name)),
        NodeData::FunctionSymbol { name, .. } => out.push_str(g.interner.resolve(*name)),
        NodeData::ApplyUf { func, args } => {
            out.push('(');
            render_rec(g, *func, out);
            for a in args {
                out.push(' ');
                render_rec(g, *a, out);
            }
            out.push(')');
        }
        NodeData::Forall { vars, body } => render_binder(g, "forall", vars, *body, out),
        NodeData::Lambda { vars, body } => render_binder(g, "lambda", vars, *body, out),
        NodeData::And(cs) => render_nary(g, "and", cs, out),
        NodeData::Or(cs) => render_nary(g, "or", cs, out),
        NodeData::Add(cs) => render_nary(g, "+", cs, out),
        NodeData::Mul(cs) => render_nary(g, "*", cs, out),
        NodeData::Not(a) => render_unary(g, "not", *a, out),
        NodeData::Eq(a, b) => render_binary(g, "=", *a, *b, out),
        NodeData::Sub(a, b) => render_binary(g, "-", *a, *b, out),
        NodeData::IntsDivisionTotal(a, b) | NodeData::IntsDivision(a, b) => {
            render_binary(g, "div", *a, *b, out)
        }
        NodeData::IntsModulusTotal(a, b) | NodeData::IntsModulus(a, b) => {
            render_binary(g, "mod", *a, *b, out)
        }
        NodeData::Lt(a, b) => render_binary(g, "<", *a, *b, out),
        NodeData::Leq(a, b) => render_binary(g, "<=", *a, *b, out),
        NodeData::Gt(a, b) => render_binary(g, ">", *a, *b, out),
        NodeData::Geq(a, b) => render_binary(g, ">=", *a, *b, out),
        NodeData::Ite(c, t, e) => {
            out.push_str("(ite ");
            render_rec(g, *c, out);
            out.push(' ');
            render_rec(g, *t, out);
            out.push(' ');
            render_rec(g, *e, out);
            out.push(')');
        }
    }
}

fn render_binder(g: &TermGraph, keyword: &str, vars: &[NodeId], body: NodeId, out: &mut String) {
    out.push('(');
    out.push_str(keyword);
    out.push_str(" (");
    for (i, v) in vars.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        render_rec(g, *v, out);
    }
    out.push_str(") ");
    render_rec(g, body, out);
    out.push(')');
}

fn render_nary(g: &TermGraph, keyword: &str, cs: &[NodeId], out: &mut String) {
    out.push('(');
    out.push_str(keyword);
    for c in cs {
        out.push(' ');
        render_rec(g, *c, out);
    }
    out.push(')');
}

fn render_unary(g: &TermGraph, keyword: &str, a: NodeId, out: &mut String) {
    out.push('(');
    out.push_str(keyword);
    out.push(' ');
    render_rec(g, a, out);
    out.push(')');
}

fn render_binary(g: &TermGraph, keyword: &str, a: NodeId, b: NodeId, out: &mut String) {
    out.push('(');
    out.push_str(keyword);
    out.push(' ');
    render_rec(g, a, out);
    out.push(' ');
    render_rec(g, b, out);
    out.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::Type;

    #[test]
    fn renders_a_simple_comparison() {
        let mut g = TermGraph::new();
        let x = g.mk_bound_var("x", Type::Int);
        let zero = g.mk_int(0);
        let n = g.mk_geq(x, zero);
        assert_eq!(render(&g, n), "(>= x 0)");
    }

    #[test]
    fn renders_a_function_application() {
        let mut g = TermGraph::new();
        let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
        let x = g.mk_bound_var("x", Type::Int);
        let app = g.mk_apply_uf(f, vec![x]);
        assert_eq!(render(&g, app), "(f x)");
    }
}
