#![cfg_attr(docsrs, feature(doc_cfg))]

//! # si-testkit
//!
//! In-memory mock implementations of the host interfaces declared in
//! `si_solver::interfaces`, for driving [`si_solver::SingleInvSolver`] in
//! tests and in the CLI demo without a real SMT core or grammar
//! enumerator behind it.

mod instantiator;
mod oracle;
mod output;
mod sol;
mod valuation;

pub use instantiator::MockInstantiator;
pub use oracle::{MockEntailmentOracle, MockUnsatCoreOracle};
pub use output::MockOutputChannel;
pub use sol::{MockSingleInvSol, MockSygusTermDb};
pub use valuation::MockValuation;
