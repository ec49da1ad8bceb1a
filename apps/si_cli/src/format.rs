//! A tiny S-expression conjecture format, parsed into a [`TermGraph`].
//!
//! ```text
//! (declare-var x Int)
//! (declare-fun f (Int) Int)
//! (constraint (and (>= (f x) x) (>= (f x) 0)))
//! ```
//!
//! `declare-var` introduces a bound variable shared across every
//! `constraint`; `declare-fun` introduces a synthesis function in
//! declaration order (the order [`SingleInvSolver::initialize`] expects
//! its `funcs` list in); every `constraint` form is parsed as a formula
//! and the whole file's constraints are conjoined into one body.

use std::collections::HashMap;
use std::fmt;

use si_term::{NodeId, TermGraph, Type};

#[derive(Debug)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

fn err<T>(msg: impl Into<String>) -> Result<T, ParseError> {
    Err(ParseError(msg.into()))
}

/// The parsed result: the graph, the synthesis functions in declaration
/// order, and the conjoined constraint body.
pub struct Conjecture {
    pub graph: TermGraph,
    pub funcs: Vec<NodeId>,
    pub body: NodeId,
}

/// A parenthesized S-expression token tree, the intermediate form
/// between the tokenizer and the semantic parser below.
enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

fn tokenize(src: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in src.chars() {
        match c {
            '(' | ')' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(c.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn strip_comments(src: &str) -> String {
    src.lines()
        .map(|line| line.split(';').next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_sexps(tokens: &[String]) -> Result<Vec<Sexp>, ParseError> {
    let mut pos = 0;
    let mut top = Vec::new();
    while pos < tokens.len() {
        let (sexp, next) = parse_one(tokens, pos)?;
        top.push(sexp);
        pos = next;
    }
    Ok(top)
}

fn parse_one(tokens: &[String], pos: usize) -> Result<(Sexp, usize), ParseError> {
    let Some(tok) = tokens.get(pos) else {
        return err("unexpected end of input");
    };
    if tok == "(" {
        let mut items = Vec::new();
        let mut pos = pos + 1;
        loop {
            match tokens.get(pos) {
                None => return err("unclosed '('"),
                Some(t) if t == ")" => return Ok((Sexp::List(items), pos + 1)),
                _ => {
                    let (item, next) = parse_one(tokens, pos)?;
                    items.push(item);
                    pos = next;
                }
            }
        }
    } else if tok == ")" {
        err("unexpected ')'")
    } else {
        Ok((Sexp::Atom(tok.clone()), pos + 1))
    }
}

struct Ctx {
    g: TermGraph,
    vars: HashMap<String, NodeId>,
    funcs: HashMap<String, NodeId>,
    func_order: Vec<NodeId>,
}

/// Parses the whole conjecture file.
pub fn parse(src: &str) -> Result<Conjecture, ParseError> {
    let stripped = strip_comments(src);
    let tokens = tokenize(&stripped);
    let forms = parse_sexps(&tokens)?;

    let mut ctx = Ctx {
        g: TermGraph::new(),
        vars: HashMap::new(),
        funcs: HashMap::new(),
        func_order: Vec::new(),
    };
    let mut constraints = Vec::new();

    for form in &forms {
        let Sexp::List(items) = form else {
            return err("top-level forms must be parenthesized");
        };
        let Some(Sexp::Atom(head)) = items.first() else {
            return err("expected a form keyword");
        };
        match head.as_str() {
            "declare-var" => declare_var(&mut ctx, items)?,
            "declare-fun" => declare_fun(&mut ctx, items)?,
            "constraint" => {
                if items.len() != 2 {
                    return err("constraint takes exactly one expression");
                }
                constraints.push(parse_expr(&mut ctx, &items[1])?);
            }
            other => return err(format!("unknown top-level form '{other}'")),
        }
    }

    if constraints.is_empty() {
        return err("no constraint forms present");
    }
    let body = if constraints.len() == 1 { constraints[0] } else { ctx.g.mk_and(constraints) };

    Ok(Conjecture { graph: ctx.g, funcs: ctx.func_order, body })
}

fn declare_var(ctx: &mut Ctx, items: &[Sexp]) -> Result<(), ParseError> {
    let [_, Sexp::Atom(name), ty] = items else {
        return err("declare-var takes a name and a type");
    };
    let ty = parse_type(ty)?;
    if ctx.vars.contains_key(name) {
        return err(format!("variable '{name}' declared twice"));
    }
    let node = ctx.g.mk_bound_var(name, ty);
    ctx.vars.insert(name.clone(), node);
    Ok(())
}

fn declare_fun(ctx: &mut Ctx, items: &[Sexp]) -> Result<(), ParseError> {
    let [_, Sexp::Atom(name), Sexp::List(arg_tys), ret_ty] = items else {
        return err("declare-fun takes a name, an argument type list, and a return type");
    };
    let arg_types = arg_tys.iter().map(parse_type).collect::<Result<Vec<_>, _>>()?;
    let ret_ty = parse_type(ret_ty)?;
    if ctx.funcs.contains_key(name) {
        return err(format!("function '{name}' declared twice"));
    }
    let func = ctx.g.mk_function_symbol(name, arg_types, ret_ty);
    ctx.funcs.insert(name.clone(), func);
    ctx.func_order.push(func);
    Ok(())
}

fn parse_type(sexp: &Sexp) -> Result<Type, ParseError> {
    match sexp {
        Sexp::Atom(s) if s == "Int" => Ok(Type::Int),
        Sexp::Atom(s) if s == "Bool" => Ok(Type::Bool),
        Sexp::Atom(s) => err(format!("unknown type '{s}'")),
        Sexp::List(_) => err("function types are not accepted here"),
    }
}

fn parse_expr(ctx: &mut Ctx, sexp: &Sexp) -> Result<NodeId, ParseError> {
    match sexp {
        Sexp::Atom(s) => parse_atom(ctx, s),
        Sexp::List(items) => parse_form(ctx, items),
    }
}

fn parse_atom(ctx: &mut Ctx, s: &str) -> Result<NodeId, ParseError> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(ctx.g.mk_int(v));
    }
    match s {
        "true" => return Ok(ctx.g.mk_bool(true)),
        "false" => return Ok(ctx.g.mk_bool(false)),
        _ => {}
    }
    if let Some(&v) = ctx.vars.get(s) {
        return Ok(v);
    }
    if let Some(&f) = ctx.funcs.get(s) {
        return Ok(ctx.g.mk_apply_uf(f, Vec::new()));
    }
    err(format!("unbound identifier '{s}'"))
}

fn parse_form(ctx: &mut Ctx, items: &[Sexp]) -> Result<NodeId, ParseError> {
    let Some(Sexp::Atom(head)) = items.first() else {
        return err("expected an operator or function name");
    };
    let args = &items[1..];

    if let Some(&func) = ctx.funcs.get(head) {
        let arg_nodes = args.iter().map(|a| parse_expr(ctx, a)).collect::<Result<Vec<_>, _>>()?;
        return Ok(ctx.g.mk_apply_uf(func, arg_nodes));
    }

    match head.as_str() {
        "and" => nary(ctx, args, TermGraph::mk_and),
        "or" => nary(ctx, args, TermGraph::mk_or),
        "+" => nary(ctx, args, TermGraph::mk_add),
        "*" => nary(ctx, args, TermGraph::mk_mul),
        "not" => {
            let [a] = args else { return err("'not' takes exactly one argument") };
            let a = parse_expr(ctx, a)?;
            Ok(ctx.g.mk_not(a))
        }
        "ite" => {
            let [c, t, e] = args else { return err("'ite' takes exactly three arguments") };
            let (c, t, e) = (parse_expr(ctx, c)?, parse_expr(ctx, t)?, parse_expr(ctx, e)?);
            Ok(ctx.g.mk_ite(c, t, e))
        }
        "-" => {
            let [a, b] = args else { return err("'-' takes exactly two arguments") };
            let (a, b) = (parse_expr(ctx, a)?, parse_expr(ctx, b)?);
            Ok(ctx.g.mk_sub(a, b))
        }
        "div" => binary(ctx, args, TermGraph::mk_ints_division_total),
        "mod" => binary(ctx, args, TermGraph::mk_ints_modulus_total),
        "=" => binary(ctx, args, TermGraph::mk_eq),
        "<" => binary(ctx, args, TermGraph::mk_lt),
        "<=" => binary(ctx, args, TermGraph::mk_leq),
        ">" => binary(ctx, args, TermGraph::mk_gt),
        ">=" => binary(ctx, args, TermGraph::mk_geq),
        other => err(format!("unknown operator or undeclared function '{other}'")),
    }
}

fn binary(
    ctx: &mut Ctx,
    args: &[Sexp],
    build: impl Fn(&mut TermGraph, NodeId, NodeId) -> NodeId,
) -> Result<NodeId, ParseError> {
    let [a, b] = args else { return err("expected exactly two arguments") };
    let a = parse_expr(ctx, a)?;
    let b = parse_expr(ctx, b)?;
    Ok(build(&mut ctx.g, a, b))
}

fn nary(
    ctx: &mut Ctx,
    args: &[Sexp],
    build: impl Fn(&mut TermGraph, Vec<NodeId>) -> NodeId,
) -> Result<NodeId, ParseError> {
    if args.is_empty() {
        return err("expected at least one argument");
    }
    let nodes = args.iter().map(|a| parse_expr(ctx, a)).collect::<Result<Vec<_>, _>>()?;
    Ok(build(&mut ctx.g, nodes))
}
