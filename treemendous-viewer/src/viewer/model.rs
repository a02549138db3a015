//! Model - the viewer's state
//!
//! The model wraps a [`TreeController`] (tree, selection, expansion, click
//! debouncing) together with the cursor.
//! Viewers read it to render and the app mutates it through the event methods.

use std::time::Instant;
use tracing::debug;
use treemendous::render::{icon, node_label};
use treemendous::{Node, NodeId, Outcome, Scope, SelectMode, Tree, TreeController};

/// Which viewer receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    TreeViewer,
    DetailViewer,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::TreeViewer => Focus::DetailViewer,
            Focus::DetailViewer => Focus::TreeViewer,
        }
    }
}

/// A visible row of the tree, ready to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedTreeNode {
    pub node_id: NodeId,
    pub depth: usize,
    pub label: String,
    pub icon: &'static str,
    pub is_expanded: bool,
    pub has_children: bool,
    pub is_selected: bool,
    pub is_active: bool,
}

#[derive(Debug)]
pub struct Model {
    controller: TreeController,
    label_field: String,
    cursor: Option<NodeId>,
    last_outcome: Option<Outcome>,
}

impl Model {
    /// Sync `tree` against `scope` and put the cursor on the first row.
    pub fn new(tree: Tree, scope: &Scope, mode: SelectMode, label_field: impl Into<String>) -> Self {
        let mut controller = TreeController::new(tree, mode);
        let report = controller.sync(scope);
        debug!(nodes = report.added.len(), mode = %mode, "initial sync");
        let cursor = controller.rows().first().map(|row| row.id);

        Model {
            controller,
            label_field: label_field.into(),
            cursor,
            last_outcome: None,
        }
    }

    pub fn expression(&self) -> String {
        self.controller.tree().expression().to_string()
    }

    pub fn select_mode(&self) -> SelectMode {
        self.controller.selection().mode()
    }

    pub fn flattened_tree(&self) -> Vec<FlattenedTreeNode> {
        let selection = self.controller.selection();
        self.controller
            .rows()
            .into_iter()
            .map(|row| FlattenedTreeNode {
                node_id: row.id,
                depth: row.depth,
                label: node_label(&row.node, &self.label_field),
                icon: icon(&row.node),
                is_expanded: row.is_expanded,
                has_children: row.has_children,
                is_selected: selection.is_selected(row.id),
                is_active: selection.is_active(row.id),
            })
            .collect()
    }

    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    pub fn move_cursor(&mut self, id: NodeId) {
        if self.controller.tree().find(id).is_some() {
            self.cursor = Some(id);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.controller.tree().node(id)
    }

    /// Ids from the top level down to `id`.
    pub fn path(&self, id: NodeId) -> Option<Vec<NodeId>> {
        self.controller.tree().path_to(id)
    }

    pub fn is_node_expanded(&self, id: NodeId) -> bool {
        self.controller.expansion().is_expanded(id)
    }

    pub fn is_node_selected(&self, id: NodeId) -> bool {
        self.controller.selection().is_selected(id)
    }

    pub fn selected_count(&self) -> usize {
        self.controller.selection().selected().len()
    }

    /// What the last click or expansion did.
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Key presses are deliberate, so clicks are always confirmed.
    pub fn click(&mut self, id: NodeId, now: Instant) -> Outcome {
        let outcome = self.controller.click(id, now, true);
        self.record(outcome)
    }

    pub fn double_click(&mut self, id: NodeId) -> Outcome {
        let outcome = self.controller.double_click(id, true);
        self.record(outcome)
    }

    pub fn expand(&mut self, id: NodeId) -> Outcome {
        let expandable = self
            .controller
            .rows()
            .iter()
            .any(|row| row.id == id && row.has_children);
        let outcome = if expandable && !self.is_node_expanded(id) {
            self.controller.expansion_mut().expand(id);
            Outcome::Expanded
        } else {
            Outcome::Ignored
        };
        self.record(outcome)
    }

    pub fn collapse(&mut self, id: NodeId) -> Outcome {
        let outcome = if self.is_node_expanded(id) {
            self.controller.expansion_mut().collapse(id);
            Outcome::Collapsed
        } else {
            Outcome::Ignored
        };
        self.record(outcome)
    }

    /// Remove the node from its level. Only items of flat levels can be
    /// removed; the cursor moves to the row that takes the node's place.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let index = self.controller.rows().iter().position(|row| row.id == id);
        if self.controller.remove(id).is_none() {
            self.record(Outcome::Ignored);
            return false;
        }
        debug!(node = %id, "removed node");

        if self.cursor == Some(id) {
            let rows = self.controller.rows();
            self.cursor = index
                .map(|index| index.min(rows.len().saturating_sub(1)))
                .and_then(|index| rows.get(index))
                .map(|row| row.id);
        }
        self.last_outcome = None;
        true
    }

    fn record(&mut self, outcome: Outcome) -> Outcome {
        self.last_outcome = Some(outcome);
        outcome
    }
}
