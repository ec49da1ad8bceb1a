//! Error type for the synthesis engine.
//!
//! Most failure modes in this engine are non-fatal and encoded as `bool`
//! or `Option` (a conjecture that is not single-invocation is simply not
//! single-invocation, not an error). [`SiError`] is reserved for the
//! handful of conditions that genuinely abort the run.

use std::fmt;

/// Fatal conditions raised by the synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiError {
    /// A term was structurally incompatible with the operation attempting
    /// to process it (e.g. a non-Boolean node passed where a formula was
    /// expected).
    ShapeMismatch(String),
    /// The entailment oracle driving partial single-invocation refinement
    /// could not be queried, or returned an answer the engine cannot act
    /// on.
    EntailmentFailure(String),
    /// A configuration option required the run to abort rather than fall
    /// back to an incomplete strategy.
    OptionAbort(String),
}

impl fmt::Display for SiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiError::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            SiError::EntailmentFailure(msg) => write!(f, "entailment oracle failure: {msg}"),
            SiError::OptionAbort(msg) => write!(f, "aborted by option: {msg}"),
        }
    }
}

impl std::error::Error for SiError {}

/// Alias for `std::result::Result<T, SiError>`.
pub type Result<T> = std::result::Result<T, SiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_display() {
        let err = SiError::ShapeMismatch("expected Bool".into());
        assert!(format!("{err}").contains("expected Bool"));
    }

    #[test]
    fn option_abort_display() {
        let err = SiError::OptionAbort("si_abort set".into());
        assert!(format!("{err}").contains("si_abort set"));
    }
}
