//! A bare prefix tree over node-identity paths.
//!
//! Both [`crate::match_trie::MatchTrie`] and [`crate::det_trace::DetTrace`]
//! need the same primitive: insert a path of [`NodeId`]s, report whether
//! it was new, and later walk the tree back out. This module holds that
//! primitive so neither duplicates it.

use std::collections::HashMap;

use si_term::NodeId;

#[derive(Default)]
pub(crate) struct PathTrie {
    pub(crate) children: HashMap<NodeId, PathTrie>,
    pub(crate) is_leaf: bool,
}

impl PathTrie {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts `path`, returning `true` iff it was not already present.
    pub(crate) fn insert(&mut self, path: &[NodeId]) -> bool {
        match path.split_first() {
            None => {
                let existed = self.is_leaf;
                self.is_leaf = true;
                !existed
            }
            Some((head, rest)) => self.children.entry(*head).or_default().insert(rest),
        }
    }

    /// Removes `path` if present, pruning now-empty branches. Returns
    /// `true` if `self` became empty as a result (no children, not a
    /// leaf) so the caller can prune its own entry for this subtree.
    pub(crate) fn remove(&mut self, path: &[NodeId]) -> bool {
        match path.split_first() {
            None => {
                self.is_leaf = false;
            }
            Some((head, rest)) => {
                let mut prune = false;
                if let Some(child) = self.children.get_mut(head) {
                    if child.remove(rest) {
                        prune = true;
                    }
                }
                if prune {
                    self.children.remove(head);
                }
            }
        }
        !self.is_leaf && self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_term::TermGraph;

    #[test]
    fn insert_reports_novelty() {
        let mut g = TermGraph::new();
        let a = g.mk_int(1);
        let b = g.mk_int(2);
        let mut t = PathTrie::new();
        assert!(t.insert(&[a, b]));
        assert!(!t.insert(&[a, b]));
    }

    #[test]
    fn distinct_order_is_distinct_path() {
        let mut g = TermGraph::new();
        let a = g.mk_int(1);
        let b = g.mk_int(2);
        let mut t = PathTrie::new();
        assert!(t.insert(&[a, b]));
        assert!(t.insert(&[b, a]));
    }

    #[test]
    fn remove_allows_reinsertion() {
        let mut g = TermGraph::new();
        let a = g.mk_int(1);
        let mut t = PathTrie::new();
        t.insert(&[a]);
        t.remove(&[a]);
        assert!(t.insert(&[a]));
    }
}
