use si_partition::{SingleInvocationPartition, ALL, NSI, SI};
use si_term::{NodeData, TermGraph, Type};

/// `∀f.∀x. f(x) ≥ x ∧ f(x) ≥ 0` is purely single-invocation.
#[test]
fn pure_si_conjecture_has_empty_nsi() {
    let mut g = TermGraph::new();
    let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
    let x = g.mk_bound_var("x", Type::Int);
    let fx = g.mk_apply_uf(f, vec![x]);
    let zero = g.mk_int(0);
    let body = g.mk_and(vec![g.mk_geq(fx, x), g.mk_geq(fx, zero)]);

    let part = SingleInvocationPartition::init_with_funcs(&mut g, vec![f], body).unwrap();
    assert!(part.is_purely_single_invocation());
    assert_eq!(part.conjuncts[NSI].len(), 0);
    assert_eq!(part.conjuncts[SI].len(), 1);

    // SI conjunct mentions F (the anti-skolemized invocation) and no
    // remaining application of f at its own argument tuple.
    let fo_var = part.func_fo_var[&f];
    let si_conjunct = part.conjuncts[SI][0];
    match g.data(si_conjunct) {
        NodeData::And(cs) => {
            assert_eq!(cs.len(), 2);
            for c in cs {
                match g.data(*c) {
                    NodeData::Geq(a, _) => assert_eq!(*a, fo_var),
                    other => panic!("unexpected conjunct shape: {other:?}"),
                }
            }
        }
        other => panic!("expected And, got {other:?}"),
    }
}

/// Scenario 2: `∀f.∀x y. f(x) = f(y) ⇒ x = y` has differing argument
/// tuples `(x)` and `(y)`, so it is routed to NSI.
#[test]
fn differing_argument_tuples_are_routed_to_nsi() {
    let mut g = TermGraph::new();
    let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
    let x = g.mk_bound_var("x", Type::Int);
    let y = g.mk_bound_var("y", Type::Int);
    let fx = g.mk_apply_uf(f, vec![x]);
    let fy = g.mk_apply_uf(f, vec![y]);
    let antecedent = g.mk_eq(fx, fy);
    let consequent = g.mk_eq(x, y);
    // `a => b` encoded as `¬a ∨ b`.
    let not_antecedent = g.mk_not(antecedent);
    let body = g.mk_or(vec![not_antecedent, consequent]);

    let part = SingleInvocationPartition::init_with_funcs(&mut g, vec![f], body).unwrap();
    assert!(!part.is_purely_single_invocation());
    assert_eq!(part.conjuncts[NSI].len(), 1);
    assert_eq!(part.conjuncts[ALL].len(), 1);
}

/// A conjecture with an embedded quantifier makes the whole partition
/// fail: partitioning bails on an embedded `FORALL`.
#[test]
fn embedded_forall_yields_empty_partition() {
    let mut g = TermGraph::new();
    let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
    let x = g.mk_bound_var("x", Type::Int);
    let y = g.mk_bound_var("y", Type::Int);
    let fx = g.mk_apply_uf(f, vec![x]);
    let inner = g.mk_geq(fx, y);
    let quantified = g.mk_forall(vec![y], inner);

    let part = SingleInvocationPartition::init_with_funcs(&mut g, vec![f], quantified);
    assert!(part.is_none());
}

/// `getSpecificationInst(i, {f → f})` with an eta-expanded identity
/// lambda is a no-op, up to rewriting.
#[test]
fn identity_lambda_round_trips_specification() {
    let mut g = TermGraph::new();
    let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
    let x = g.mk_bound_var("x", Type::Int);
    let fx = g.mk_apply_uf(f, vec![x]);
    let zero = g.mk_int(0);
    let body = g.mk_geq(fx, zero);

    let part = SingleInvocationPartition::init_with_funcs(&mut g, vec![f], body).unwrap();

    let param = g.mk_bound_var("p", Type::Int);
    let identity_body = g.mk_apply_uf(f, vec![param]);
    let identity_lambda = g.mk_lambda(vec![param], identity_body);
    let mut lambdas = std::collections::HashMap::new();
    lambdas.insert(f, identity_lambda);

    let rewritten = part.get_specification_inst(&mut g, ALL, &lambdas);
    let original = part.get_conjunct(&mut g, ALL);
    assert_eq!(rewritten, original);
}

/// `x=0 ∧ f(x)≥0` has a top-level equality pinning the sole state
/// variable to a ground term; `collect_presolve_equalities` should
/// surface `[0]` as a candidate instantiation before any instantiator
/// ever runs.
#[test]
fn presolve_equality_is_found_in_si_conjunct() {
    let mut g = TermGraph::new();
    let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
    let x = g.mk_bound_var("x", Type::Int);
    let fx = g.mk_apply_uf(f, vec![x]);
    let zero = g.mk_int(0);
    let body = g.mk_and(vec![g.mk_eq(x, zero), g.mk_geq(fx, zero)]);

    let part = SingleInvocationPartition::init_with_funcs(&mut g, vec![f], body).unwrap();
    let tuples = part.collect_presolve_equalities(&mut g);
    assert_eq!(tuples, vec![vec![zero]]);
}

/// `f(x) ≥ x ∧ f(x) ≥ 0` has no state-variable equality at all, so the
/// presolve fast path is a no-op.
#[test]
fn presolve_equality_is_absent_without_a_ground_equality() {
    let mut g = TermGraph::new();
    let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
    let x = g.mk_bound_var("x", Type::Int);
    let fx = g.mk_apply_uf(f, vec![x]);
    let zero = g.mk_int(0);
    let body = g.mk_and(vec![g.mk_geq(fx, x), g.mk_geq(fx, zero)]);

    let part = SingleInvocationPartition::init_with_funcs(&mut g, vec![f], body).unwrap();
    assert!(part.collect_presolve_equalities(&mut g).is_empty());
}
