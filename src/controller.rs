//! Interaction state of a tree
//!
//! [`TreeController`] owns a [`Tree`] together with its selection registry,
//! expansion state and per-node click debouncers, and keeps them consistent
//! across syncs: nodes that appear are registered for selection, nodes that
//! disappear are forgotten everywhere.

use crate::expansion::ExpansionState;
use crate::interaction::{Bindings, ClickDebounce, Gesture};
use crate::item::Item;
use crate::node::NodeId;
use crate::selection::{SelectMode, SelectionRegistry};
use crate::source::Scope;
use crate::tree::{Row, SyncReport, Tree};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

/// What a gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Selected,
    Deselected,
    Expanded,
    Collapsed,
    /// Debounced, unconfirmed, unbound, or unknown node
    Ignored,
}

#[derive(Debug)]
pub struct TreeController {
    tree: Tree,
    selection: SelectionRegistry,
    expansion: ExpansionState,
    bindings: Bindings,
    clicks: HashMap<NodeId, ClickDebounce>,
}

impl TreeController {
    pub fn new(tree: Tree, mode: SelectMode) -> Self {
        TreeController {
            tree,
            selection: SelectionRegistry::new(mode),
            expansion: ExpansionState::new(),
            bindings: Bindings::default(),
            clicks: HashMap::new(),
        }
    }

    pub fn with_bindings(mut self, bindings: Bindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionRegistry {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionRegistry {
        &mut self.selection
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut ExpansionState {
        &mut self.expansion
    }

    pub fn bindings(&self) -> Bindings {
        self.bindings
    }

    /// Sync the tree and reconcile the per-node state with it.
    pub fn sync(&mut self, scope: &Scope) -> SyncReport {
        let report = self.tree.sync(scope);
        if self.bindings.select {
            for id in &report.added {
                self.selection.register(*id);
            }
        }
        self.forget(&report.removed);
        report
    }

    /// A single click on node `id` at `now`.
    ///
    /// With selection bound, a selected node is deselected and an unselected
    /// one is selected if `confirmed`; repeated clicks within the debounce
    /// window are ignored. With only expansion bound, every click toggles
    /// expansion instead.
    pub fn click(&mut self, id: NodeId, now: Instant, confirmed: bool) -> Outcome {
        if self.tree.find(id).is_none() {
            return Outcome::Ignored;
        }

        if self.bindings.select_gesture() == Some(Gesture::Click) {
            if !self.clicks.entry(id).or_default().accept(now) {
                debug!(node = %id, "click debounced");
                return Outcome::Ignored;
            }
            return self.toggle_selection(id, confirmed);
        }
        if self.bindings.expand_gesture() == Some(Gesture::Click) {
            return self.toggle_expansion(id, confirmed);
        }
        Outcome::Ignored
    }

    /// A double click on node `id`: toggles expansion when selection took the
    /// single click.
    pub fn double_click(&mut self, id: NodeId, confirmed: bool) -> Outcome {
        if self.tree.find(id).is_none() {
            return Outcome::Ignored;
        }
        if self.bindings.expand_gesture() == Some(Gesture::DoubleClick) {
            return self.toggle_expansion(id, confirmed);
        }
        Outcome::Ignored
    }

    fn toggle_selection(&mut self, id: NodeId, confirmed: bool) -> Outcome {
        let was = self.selection.is_selected(id);
        match (was, self.selection.toggle(id, confirmed)) {
            (true, false) => Outcome::Deselected,
            (false, true) => Outcome::Selected,
            _ => Outcome::Ignored,
        }
    }

    fn toggle_expansion(&mut self, id: NodeId, confirmed: bool) -> Outcome {
        let was = self.expansion.is_expanded(id);
        match (was, self.expansion.toggle(id, confirmed)) {
            (true, false) => Outcome::Collapsed,
            (false, true) => Outcome::Expanded,
            _ => Outcome::Ignored,
        }
    }

    /// Expand every ancestor of `id` so it shows up in [`TreeController::rows`].
    pub fn reveal(&mut self, id: NodeId) -> bool {
        let Some(mut path) = self.tree.path_to(id) else {
            return false;
        };
        path.pop();
        self.expansion.expand_all(path);
        true
    }

    /// Remove an item from the tree, writing back to its group.
    pub fn remove(&mut self, id: NodeId) -> Option<Item> {
        let (item, removed) = self.tree.remove(id)?;
        self.forget(&removed);
        Some(item)
    }

    pub fn rows(&self) -> Vec<Row> {
        self.tree.rows(&self.expansion)
    }

    fn forget(&mut self, ids: &[NodeId]) {
        if ids.is_empty() {
            return;
        }
        self.selection.forget(ids);
        self.expansion.forget(ids);
        for id in ids {
            self.clicks.remove(id);
        }
    }
}
