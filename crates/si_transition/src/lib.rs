#![cfg_attr(docsrs, feature(doc_cfg))]

//! # si-transition
//!
//! [`TransitionInference`] — recovers a `pre(x)`/`trans(x,x')`/`post(x)`
//! decomposition from a quantified formula over one function `f`, and
//! drives [`si_match::DetTrace`] through a bounded deterministic
//! unfolding looking for a trivial inductive invariant.

mod transition;

pub use transition::{
    Component, ComponentIndex, TraceStatus, TransitionInference, DEFAULT_UNFOLD_STEP_LIMIT, POST, PRE, TRANS,
};
