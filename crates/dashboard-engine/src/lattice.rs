//! C1: the semantic-type lattice.
//!
//! Single-inheritance: every type has at most one declared parent.
//! Closed-world: every type a rule mentions must be registered here -
//! the lattice doesn't infer edges, it just closes the ones it's given.

use std::collections::HashMap;

use dashboard_types::SemanticType;

/// `is_a`/`ancestor_chain`/`ancestor_count` over a declared set of
/// parent edges.
#[derive(Debug, Clone, Default)]
pub struct TypeLattice {
    parent: HashMap<SemanticType, SemanticType>,
}

impl TypeLattice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `child`'s parent is `parent`. Root types (e.g.
    /// `Number`, `Temporal`) simply never get an edge declared for them.
    pub fn declare(&mut self, child: impl Into<SemanticType>, parent: impl Into<SemanticType>) {
        self.parent.insert(child.into(), parent.into());
    }

    /// `is_a(child, ancestor)`: transitive reflexive closure over parent
    /// edges. Every type is its own ancestor.
    pub fn is_a(&self, child: &SemanticType, ancestor: &SemanticType) -> bool {
        let mut current = child;
        loop {
            if current == ancestor {
                return true;
            }
            match self.parent.get(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    /// Ordered from `t` itself up to its root.
    pub fn ancestor_chain(&self, t: &SemanticType) -> Vec<SemanticType> {
        let mut chain = vec![t.clone()];
        let mut current = t;
        while let Some(next) = self.parent.get(current) {
            chain.push(next.clone());
            current = next;
        }
        chain
    }

    /// Length of `ancestor_chain` - used to pick the most specific
    /// applicable rule (§4.8).
    pub fn ancestor_count(&self, t: &SemanticType) -> usize {
        self.ancestor_chain(t).len()
    }
}
