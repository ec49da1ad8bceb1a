//! [`MockSingleInvSol`] and [`MockSygusTermDb`]: identity-ish stand-ins
//! for the post-processing and grammar-registration hooks a real sygus
//! front end would provide.

use std::collections::HashMap;

use si_solver::{SingleInvSol, SygusTermDb};
use si_term::{NodeId, TermGraph};

/// Passes solutions through unmodified; `reconstruct_solution` always
/// declines, matching a host with no grammar-restricted rewriter wired up.
#[derive(Default)]
pub struct MockSingleInvSol;

impl MockSingleInvSol {
    pub fn new() -> Self {
        Self
    }
}

impl SingleInvSol for MockSingleInvSol {
    fn simplify_solution(&self, _g: &mut TermGraph, n: NodeId) -> NodeId {
        n
    }

    fn reconstruct_solution(&self, _g: &mut TermGraph, _n: NodeId) -> Option<NodeId> {
        None
    }
}

/// Records template registrations for later inspection by a test.
#[derive(Default)]
pub struct MockSygusTermDb {
    pub templates: HashMap<NodeId, (NodeId, NodeId)>,
}

impl MockSygusTermDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SygusTermDb for MockSygusTermDb {
    fn register_template(&mut self, func: NodeId, template: NodeId, arg: NodeId) {
        self.templates.insert(func, (template, arg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::Type;

    #[test]
    fn simplify_solution_is_identity() {
        let mut g = TermGraph::new();
        let n = g.mk_int(7);
        let sol = MockSingleInvSol::new();
        assert_eq!(sol.simplify_solution(&mut g, n), n);
        assert!(sol.reconstruct_solution(&mut g, n).is_none());
    }

    #[test]
    fn term_db_records_registered_templates() {
        let mut g = TermGraph::new();
        let f = g.mk_function_symbol("f", vec![Type::Int], Type::Int);
        let templ = g.mk_skolem("I", Type::Bool);
        let arg = g.mk_bound_var("x", Type::Int);
        let mut db = MockSygusTermDb::new();
        db.register_template(f, templ, arg);
        assert_eq!(db.templates.get(&f), Some(&(templ, arg)));
    }
}
