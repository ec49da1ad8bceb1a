//! `siq` — command-line argument parsing and dispatch.
//!
//! The CLI is built on [`clap`] for argument parsing with derive macros,
//! mirroring the project's other command-line tool.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use si_solver::{InvTemplMode, SiMode, SolverOptions};

use crate::format;
use crate::run;

/// Command-line interface for the single-invocation synthesis engine.
#[derive(Parser)]
#[command(name = "siq")]
#[command(about = "A single-invocation synthesis engine driver", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Partition a conjecture and report single-invocation status, without
    /// running any check-loop rounds.
    Check {
        /// Path to a conjecture file in the engine's S-expression format.
        file: PathBuf,
    },

    /// Run the check loop to completion, against scripted candidate
    /// substitution tuples, and print the guard trace and solution.
    Solve {
        /// Path to a conjecture file in the engine's S-expression format.
        file: PathBuf,

        /// A candidate substitution tuple for the synthesis function's
        /// argument(s), as comma-separated integers (e.g. "0,1").
        /// Repeatable; each occurrence drives one round of the check loop.
        #[arg(long = "candidate")]
        candidates: Vec<String>,

        /// Attempt partial single-invocation handling when the conjecture
        /// is not purely single-invocation.
        #[arg(long)]
        si_partial: bool,

        /// Build an invariant template of the given polarity (`pre` or
        /// `post`) for a transition-shaped partial conjecture.
        #[arg(long)]
        inv_templ: Option<String>,

        /// Attempt deterministic-trace invariant discovery before falling
        /// back to a template hole.
        #[arg(long)]
        auto_unfold: bool,

        /// Abort instead of degrading when the conjecture is not
        /// single-invocation.
        #[arg(long)]
        si_abort: bool,
    },
}

pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check { file } => cmd_check(&file),
        Commands::Solve { file, candidates, si_partial, inv_templ, auto_unfold, si_abort } => {
            cmd_solve(&file, candidates, si_partial, inv_templ.as_deref(), auto_unfold, si_abort)
        }
    }
}

fn cmd_check(file: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("checking {}", file.display());
    let src = fs::read_to_string(file)?;
    let conj = format::parse(&src)?;
    let mut g = conj.graph;
    let report = run::check(&mut g, conj.funcs, conj.body);
    print!("{report}");
    Ok(())
}

fn cmd_solve(
    file: &std::path::Path,
    candidates: Vec<String>,
    si_partial: bool,
    inv_templ: Option<&str>,
    auto_unfold: bool,
    si_abort: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("solving {} with {} scripted candidate(s)", file.display(), candidates.len());
    let src = fs::read_to_string(file)?;
    let conj = format::parse(&src)?;
    let mut g = conj.graph;

    let candidates = candidates
        .iter()
        .map(|c| {
            c.split(',')
                .map(|v| v.trim().parse::<i64>())
                .collect::<Result<Vec<i64>, _>>()
                .map_err(|e| format!("invalid --candidate '{c}': {e}"))
        })
        .collect::<Result<Vec<Vec<i64>>, String>>()?;

    let options = SolverOptions {
        si_mode: if si_abort { SiMode::AllAbort } else { SiMode::Use },
        si_partial,
        inv_templ_mode: match inv_templ {
            Some("pre") => InvTemplMode::Pre,
            Some("post") => InvTemplMode::Post,
            Some(other) => return Err(format!("unknown --inv-templ '{other}', expected pre or post").into()),
            None => InvTemplMode::None,
        },
        inv_auto_unfold: auto_unfold,
        si_abort,
        ..SolverOptions::default()
    };

    let report = run::solve(&mut g, conj.funcs, conj.body, options, candidates)?;
    print!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn cmd_check_loads_a_conjecture_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "(declare-var x Int)\n(declare-fun f (Int) Int)\n(constraint (>= (f x) x))"
        )
        .unwrap();
        cmd_check(file.path()).unwrap();
    }

    #[test]
    fn cmd_solve_rejects_an_unknown_inv_templ_flag() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "(declare-var x Int)\n(declare-fun f (Int) Int)\n(constraint (>= (f x) x))"
        )
        .unwrap();
        let err = cmd_solve(file.path(), vec![], false, Some("sideways"), false, false).unwrap_err();
        assert!(err.to_string().contains("unknown --inv-templ"));
    }
}
