#![cfg_attr(docsrs, feature(doc_cfg))]

//! # si-solver
//!
//! [`SingleInvSolver`] — the top-level orchestration that ties
//! `si-partition`'s single-invocation split and `si-transition`'s
//! transition-system inference to a CEGIS-style check loop driven by an
//! external [`Instantiator`], plus the narrow trait boundaries the engine
//! expects its host to implement ([`interfaces`]) and the `Default`-backed
//! [`SolverOptions`] configuration surface.

pub mod instantiation;
pub mod interfaces;
pub mod options;
pub mod solution;
pub mod solver;

pub use instantiation::InstantiationRecord;
pub use interfaces::{
    EntailmentOracle, Instantiator, InstantiatorCallback, OutputChannel, SingleInvSol,
    SygusTermDb, UnsatCoreOracle, Valuation,
};
pub use options::{InvTemplMode, SiMode, SolverOptions};
pub use solution::SolutionStats;
pub use solver::{CheckOutcome, SingleInvSolver};
