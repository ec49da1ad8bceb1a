//! `SolverOptions` — the engine's configuration-option table,
//! concretized as a plain struct with a `Default` matching the original's
//! documented defaults.

/// `si_mode`: whether to attempt single-invocation recognition at all.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SiMode {
    /// Disable single-invocation handling entirely.
    None,
    /// Prefer single-invocation handling when applicable (the default).
    #[default]
    Use,
    /// Abort the run if the conjecture is not single-invocation.
    AllAbort,
}

/// `inv_templ_mode`: which polarity of invariant template to build for a
/// partially single-invocation, transition-shaped conjecture.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InvTemplMode {
    #[default]
    None,
    Pre,
    Post,
}

/// The engine's tunable behavior.
/// `si-cli` constructs this from `clap`-parsed flags.
#[derive(Clone, Debug)]
pub struct SolverOptions {
    pub si_mode: SiMode,
    /// Enable partial-SI handling with entailment-oracle-driven
    /// refinement.
    pub si_partial: bool,
    pub inv_templ_mode: InvTemplMode,
    /// Attempt deterministic-trace invariant discovery before falling
    /// back to a template hole.
    pub inv_auto_unfold: bool,
    /// Use the context-scoped match-trie variant, undone on SMT backtrack.
    pub incremental: bool,
    /// Restrict solution construction to unsat-core indices.
    pub sol_min_core: bool,
    /// Allow unsat-core weakening of retained lemmas.
    pub sol_min_inst: bool,
    /// Reconstruct the solution into a restricted sygus grammar via
    /// [`crate::SingleInvSol::reconstruct_solution`].
    pub si_reconstruct: bool,
    /// On non-SI detection, abort rather than degrade to a fallback
    /// strategy.
    pub si_abort: bool,
    /// The deterministic-unfolding step budget. The original hard-codes
    /// this at 100; this crate exposes it as a configurable option.
    pub unfold_step_limit: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            si_mode: SiMode::default(),
            si_partial: false,
            inv_templ_mode: InvTemplMode::default(),
            inv_auto_unfold: false,
            incremental: false,
            sol_min_core: false,
            sol_min_inst: false,
            si_reconstruct: false,
            si_abort: false,
            unfold_step_limit: si_transition::DEFAULT_UNFOLD_STEP_LIMIT,
        }
    }
}
