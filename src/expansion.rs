//! Expanded/collapsed state of rendered nodes

use crate::node::NodeId;
use std::collections::HashSet;

/// Which nodes are expanded. Everything else is collapsed.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashSet<NodeId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expand(&mut self, id: NodeId) {
        self.expanded.insert(id);
    }

    /// Expand multiple nodes at once (e.g., all ancestors)
    pub fn expand_all(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.expanded.extend(ids);
    }

    pub fn collapse(&mut self, id: NodeId) {
        self.expanded.remove(&id);
    }

    /// Collapse an expanded node, or expand a collapsed one if `confirmed`.
    ///
    /// Returns whether the node is expanded afterwards.
    pub fn toggle(&mut self, id: NodeId, confirmed: bool) -> bool {
        if self.expanded.remove(&id) {
            return false;
        }
        if confirmed {
            self.expanded.insert(id);
        }
        confirmed
    }

    /// Drop state for nodes that are gone.
    pub fn forget(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.expanded.remove(id);
        }
    }
}
