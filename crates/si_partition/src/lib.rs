#![cfg_attr(docsrs, feature(doc_cfg))]

//! # si-partition
//!
//! [`SingleInvocationPartition`] — splits a synthesis conjecture into the
//! part where every target function is invoked through one shared
//! argument tuple (anti-skolemizable) and the part that is not.

mod forall;
mod partition;

pub use partition::{SingleInvocationPartition, ALL, NGSI, NSI, SI};
