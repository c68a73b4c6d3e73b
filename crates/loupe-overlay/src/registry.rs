//! Registry of diagrams that already carry a click handler.
//!
//! Binding is tracked by element identity rather than by inspecting the marker
//! attribute, so a stale marker copied into new content never suppresses a
//! binding and a bound element is never bound twice.

use std::collections::HashSet;

use loupe_dom::{Document, NodeId};

/// A set of bound diagram elements.
#[derive(Debug, Default, Clone)]
pub struct BindingRegistry {
    bound: HashSet<NodeId>,
}

impl BindingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding. Returns `false` if the element was already bound.
    pub fn bind(&mut self, id: NodeId) -> bool {
        self.bound.insert(id)
    }

    /// Check whether an element is bound.
    pub fn is_bound(&self, id: NodeId) -> bool {
        self.bound.contains(&id)
    }

    /// Drop bindings for elements no longer attached to the document.
    ///
    /// Returns the number of bindings removed.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.bound.len();
        self.bound.retain(|id| doc.is_connected(*id));
        before - self.bound.len()
    }

    /// Number of bound elements.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Check if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    /// Forget every binding.
    pub fn clear(&mut self) {
        self.bound.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_each_element_once() {
        let mut doc = Document::new();
        let diagram = doc.create_element("div");
        let mut registry = BindingRegistry::new();

        assert!(registry.bind(diagram));
        assert!(!registry.bind(diagram));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn prunes_detached_elements() {
        let mut doc = Document::new();
        let kept = doc.create_element("div");
        let dropped = doc.create_element("div");
        doc.append_child(doc.body(), kept).unwrap();
        doc.append_child(doc.body(), dropped).unwrap();

        let mut registry = BindingRegistry::new();
        registry.bind(kept);
        registry.bind(dropped);

        doc.remove(dropped);
        let removed = registry.prune(&doc);

        assert_eq!(removed, 1);
        assert!(registry.is_bound(kept));
        assert!(!registry.is_bound(dropped));
    }
}
