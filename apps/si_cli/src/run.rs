//! Drives the check loop for the `check` and `solve` subcommands.

use si_solver::{CheckOutcome, SingleInvSolver, SolverOptions};
use si_term::TermGraph;
use si_testkit::{MockEntailmentOracle, MockInstantiator, MockValuation};

use crate::print::render;

/// Reports single-invocation status and the initial guard lemma(s)
/// without driving any check-loop rounds.
pub fn check(g: &mut TermGraph, funcs: Vec<si_term::NodeId>, body: si_term::NodeId) -> String {
    let options = SolverOptions::default();
    match SingleInvSolver::initialize(g, funcs, body, options) {
        Ok(solver) => {
            let mut out = String::new();
            out.push_str(&format!("single-invocation: {}\n", solver.is_single_invocation()));
            out.push_str("initial lemmas:\n");
            for lemma in solver.initial_lemmas() {
                out.push_str(&format!("  {}\n", render(g, *lemma)));
            }
            out
        }
        Err(e) => format!("error: {e}\n"),
    }
}

/// Runs the check loop to completion against scripted candidate
/// substitution tuples (one per `--candidate` flag), printing every
/// lemma produced round by round and the final constructed solution.
pub fn solve(
    g: &mut TermGraph,
    funcs: Vec<si_term::NodeId>,
    body: si_term::NodeId,
    options: SolverOptions,
    candidates: Vec<Vec<i64>>,
) -> Result<String, String> {
    let mut solver =
        SingleInvSolver::initialize(g, funcs.clone(), body, options).map_err(|e| e.to_string())?;

    let mut out = String::new();
    out.push_str(&format!("single-invocation: {}\n", solver.is_single_invocation()));
    out.push_str("initial lemmas:\n");
    for lemma in solver.initial_lemmas() {
        out.push_str(&format!("  {}\n", render(g, *lemma)));
    }

    let mut instantiator = MockInstantiator::new();
    for tuple in &candidates {
        let nodes = tuple.iter().map(|&v| g.mk_int(v)).collect::<Vec<_>>();
        instantiator.push_round(vec![nodes]);
    }
    let mut valuation = MockValuation::new();
    let mut oracle = MockEntailmentOracle::new();

    let mut round = 0usize;
    loop {
        if !solver.needs_check() {
            break;
        }
        let outcome = solver.check(g, &mut valuation, &mut instantiator, Some(&mut oracle));
        round += 1;
        match outcome {
            CheckOutcome::Progress(lemmas) => {
                out.push_str(&format!("round {round} lemmas:\n"));
                for lemma in &lemmas {
                    out.push_str(&format!("  {}\n", render(g, *lemma)));
                }
            }
            CheckOutcome::CandidateRefuted(guard) => {
                out.push_str(&format!("round {round}: candidate refuted ({})\n", render(g, guard)));
            }
            CheckOutcome::NoProgress => {
                out.push_str(&format!("round {round}: no progress, stopping\n"));
                break;
            }
            CheckOutcome::Incomplete => {
                out.push_str(&format!("round {round}: incomplete\n"));
                break;
            }
        }
        if round > candidates.len() + 1 {
            break;
        }
    }

    for (i, func) in funcs.iter().enumerate() {
        let program = solver.prog_to_sol_index(*func).unwrap_or(i);
        let sol = solver.get_solution(g, program, None);
        out.push_str(&format!("solution[{i}]: {}\n", render(g, sol)));
    }

    Ok(out)
}
