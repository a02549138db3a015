//! Selection state of a tree
//!
//! Each tree owns one [`SelectionRegistry`]. Nodes that can be selected are
//! registered with it, which lets the registry arbitrate between them according
//! to the tree's [`SelectMode`]:
//!
//! - **none** prevents selection.
//! - **single** allows only a single node to be selected.
//! - **active** allows only a single selected node, but many "active" nodes.
//! - **multi** allows any number of selected nodes at any given time.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SelectMode {
    #[default]
    None,
    Single,
    Active,
    Multi,
}

impl SelectMode {
    /// Parse a mode name. Unknown names mean [`SelectMode::None`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "single" => SelectMode::Single,
            "active" => SelectMode::Active,
            "multi" => SelectMode::Multi,
            _ => SelectMode::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectMode::None => "none",
            SelectMode::Single => "single",
            SelectMode::Active => "active",
            SelectMode::Multi => "multi",
        }
    }

    /// Whether selecting a node deselects the others.
    fn is_exclusive(&self) -> bool {
        matches!(self, SelectMode::Single | SelectMode::Active)
    }
}

impl fmt::Display for SelectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SelectMode::from_name(s))
    }
}

impl From<String> for SelectMode {
    fn from(name: String) -> Self {
        SelectMode::from_name(&name)
    }
}

impl From<SelectMode> for String {
    fn from(mode: SelectMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Per-node selection flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectState {
    pub selected: bool,
    pub active: bool,
}

/// Registered nodes and their selection flags, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SelectionRegistry {
    mode: SelectMode,
    entries: Vec<(NodeId, SelectState)>,
}

impl SelectionRegistry {
    pub fn new(mode: SelectMode) -> Self {
        SelectionRegistry {
            mode,
            entries: Vec::new(),
        }
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    /// Register a node. Returns false if it already was.
    pub fn register(&mut self, id: NodeId) -> bool {
        if self.is_registered(id) {
            return false;
        }
        self.entries.push((id, SelectState::default()));
        true
    }

    /// Deregister a node, dropping its flags. Returns false if it was unknown.
    pub fn deregister(&mut self, id: NodeId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn forget(&mut self, ids: &[NodeId]) {
        self.entries.retain(|(entry, _)| !ids.contains(entry));
    }

    pub fn is_registered(&self, id: NodeId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, id: NodeId) -> SelectState {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, state)| *state)
            .unwrap_or_default()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.state(id).selected
    }

    pub fn is_active(&self, id: NodeId) -> bool {
        self.state(id).active
    }

    /// Select a node according to the mode. Unregistered nodes are registered
    /// first.
    ///
    /// Returns false when the mode prevents selection.
    pub fn select(&mut self, id: NodeId) -> bool {
        if self.mode == SelectMode::None {
            return false;
        }

        self.register(id);
        let mode = self.mode;
        for (entry, state) in &mut self.entries {
            if *entry == id {
                state.selected = true;
                if mode == SelectMode::Active {
                    state.active = true;
                }
            } else if mode.is_exclusive() {
                state.selected = false;
            }
        }
        true
    }

    /// Clear the selected and active flags of a node.
    pub fn deselect(&mut self, id: NodeId) {
        if let Some((_, state)) = self.entries.iter_mut().find(|(entry, _)| *entry == id) {
            *state = SelectState::default();
        }
    }

    /// Deselect a selected node, or select it if `confirmed`.
    ///
    /// Returns whether the node is selected afterwards.
    pub fn toggle(&mut self, id: NodeId, confirmed: bool) -> bool {
        if self.is_selected(id) {
            self.deselect(id);
            return false;
        }
        confirmed && self.select(id)
    }

    pub fn selected(&self) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|(_, state)| state.selected)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn active(&self) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|(_, state)| state.active)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use serde_json::json;

    fn registry(mode: SelectMode) -> (Vec<Item>, Vec<NodeId>, SelectionRegistry) {
        let items = Item::collect((0..5).map(|i| json!(i)));
        let ids: Vec<NodeId> = items.iter().map(NodeId::of_item).collect();
        let mut registry = SelectionRegistry::new(mode);
        for id in &ids {
            registry.register(*id);
        }
        (items, ids, registry)
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(SelectMode::from_name("single"), SelectMode::Single);
        assert_eq!(SelectMode::from_name("MULTI"), SelectMode::Multi);
        assert_eq!(SelectMode::from_name("active"), SelectMode::Active);
        assert_eq!(SelectMode::from_name("bogus"), SelectMode::None);
        assert_eq!("none".parse::<SelectMode>().unwrap(), SelectMode::None);
        assert_eq!(SelectMode::Active.to_string(), "active");
    }

    #[test]
    fn test_mode_serde() {
        let mode: SelectMode = serde_json::from_str(r#""multi""#).unwrap();
        assert_eq!(mode, SelectMode::Multi);
        let mode: SelectMode = serde_json::from_str(r#""whatever""#).unwrap();
        assert_eq!(mode, SelectMode::None);
        assert_eq!(serde_json::to_string(&SelectMode::Single).unwrap(), r#""single""#);
    }

    #[test]
    fn test_none_does_nothing() {
        let (_items, ids, mut registry) = registry(SelectMode::None);
        assert!(!registry.select(ids[0]));
        assert!(!registry.is_selected(ids[0]));
    }

    #[test]
    fn test_single_selects_one_at_a_time() {
        let (_items, ids, mut registry) = registry(SelectMode::Single);

        registry.select(ids[0]);
        assert!(registry.is_selected(ids[0]));
        assert!(!registry.is_active(ids[0]));

        registry.select(ids[1]);
        assert!(!registry.is_selected(ids[0]));
        assert!(registry.is_selected(ids[1]));
        assert_eq!(registry.selected(), vec![ids[1]]);
    }

    #[test]
    fn test_active_marks_many_nodes_active() {
        let (_items, ids, mut registry) = registry(SelectMode::Active);

        registry.select(ids[0]);
        assert!(registry.is_selected(ids[0]));
        assert!(registry.is_active(ids[0]));

        registry.select(ids[1]);
        assert!(!registry.is_selected(ids[0]));
        assert!(registry.is_active(ids[0]));
        assert!(registry.is_selected(ids[1]));
        assert!(registry.is_active(ids[1]));
        assert_eq!(registry.active(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_multi_selects_many() {
        let (_items, ids, mut registry) = registry(SelectMode::Multi);

        registry.select(ids[0]);
        registry.select(ids[1]);
        assert!(registry.is_selected(ids[0]));
        assert!(registry.is_selected(ids[1]));
        assert!(registry.active().is_empty());
    }

    #[test]
    fn test_deselect_clears_active() {
        let (_items, ids, mut registry) = registry(SelectMode::Active);
        registry.select(ids[2]);

        registry.deselect(ids[2]);
        assert_eq!(registry.state(ids[2]), SelectState::default());
    }

    #[test]
    fn test_toggle_respects_confirmation() {
        let (_items, ids, mut registry) = registry(SelectMode::Single);

        assert!(!registry.toggle(ids[0], false));
        assert!(!registry.is_selected(ids[0]));

        assert!(registry.toggle(ids[0], true));
        // deselecting never asks
        assert!(!registry.toggle(ids[0], false));
        assert!(!registry.is_selected(ids[0]));
    }

    #[test]
    fn test_register_and_deregister() {
        let items = Item::collect(vec![json!(1)]);
        let id = NodeId::of_item(&items[0]);
        let mut registry = SelectionRegistry::new(SelectMode::Single);

        assert!(registry.is_empty());
        assert!(registry.register(id));
        assert!(!registry.register(id));
        assert_eq!(registry.len(), 1);

        assert!(registry.deregister(id));
        assert!(!registry.deregister(id));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_select_registers_unknown_nodes() {
        let items = Item::collect(vec![json!(1)]);
        let id = NodeId::of_item(&items[0]);
        let mut registry = SelectionRegistry::new(SelectMode::Multi);

        assert!(registry.select(id));
        assert!(registry.is_registered(id));
    }
}
