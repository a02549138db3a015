//! A single rendered level
//!
//! A level watches one collection and renders it, grouped or not. Each call to
//! [`Level::digest`] is one change-detection tick: the members are collected,
//! compared by identity with what the level saw last time, and regrouped only
//! if they changed. Regrouping merges into the groups already rendered, so the
//! group handles a level hands out stay valid across ticks.

use crate::expression::ParsedExpression;
use crate::grouping::{group, Group, Grouping, LevelState};
use crate::item::{same_items, Item};
use crate::node::{Node, NodeId};
use crate::source::{Accessor, NodeSource, Scope};
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Debug)]
pub struct Level {
    expression: Rc<ParsedExpression>,
    accessor: Accessor,
    /// State of the level this one watches
    parent_state: LevelState,
    grouping: Grouping,
    /// Group whose children this level renders
    owner: Option<Group>,
    /// Members as of the last regroup
    seen: Option<Vec<Item>>,
}

impl Level {
    pub fn new(expression: Rc<ParsedExpression>, accessor: Accessor, parent_state: LevelState) -> Self {
        Level {
            expression,
            accessor,
            parent_state,
            grouping: Grouping::default(),
            owner: None,
            seen: None,
        }
    }

    /// A top-level level watching `source`.
    pub fn root(expression: Rc<ParsedExpression>, source: impl Into<NodeSource>) -> Self {
        Level::new(expression, source.into().resolve(), LevelState::Flat)
    }

    pub fn state(&self) -> LevelState {
        self.grouping.state()
    }

    pub fn is_intermediate(&self) -> bool {
        self.state() == LevelState::Grouped
    }

    pub fn parent_state(&self) -> LevelState {
        self.parent_state
    }

    /// Follow a change in the watched level's state. Forces a regroup on the
    /// next tick.
    pub fn set_parent_state(&mut self, state: LevelState) {
        if self.parent_state != state {
            self.parent_state = state;
            self.grouping = Grouping::default();
            self.seen = None;
        }
    }

    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.grouping.nodes()
    }

    pub fn len(&self) -> usize {
        self.grouping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grouping.is_empty()
    }

    pub fn owner(&self) -> Option<&Group> {
        self.owner.as_ref()
    }

    /// One change-detection tick. Returns whether the level regrouped.
    pub fn digest(&mut self, scope: &Scope) -> bool {
        let members = self.accessor.collect(scope);

        let same_owner = match (&self.owner, &members.owner) {
            (None, None) => true,
            (Some(a), Some(b)) => Group::ptr_eq(a, b),
            _ => false,
        };
        let same_members = self
            .seen
            .as_deref()
            .is_some_and(|seen| same_items(seen, &members.items));
        if same_owner && same_members {
            return false;
        }

        trace!(members = members.items.len(), "collection changed");
        self.seen = Some(members.items.clone());
        self.owner = members.owner;

        let previous = match std::mem::take(&mut self.grouping) {
            Grouping::Grouped(groups) => Some(groups),
            Grouping::Ungrouped(_) => None,
        };
        self.grouping = group(&self.expression, self.parent_state, previous, members.items);
        true
    }

    /// The rendered items of a flat level, for the UI to mutate in place.
    pub fn items_mut(&mut self) -> Option<&mut Vec<Item>> {
        match &mut self.grouping {
            Grouping::Ungrouped(items) => Some(items),
            Grouping::Grouped(_) => None,
        }
    }

    /// Remove an item from a flat level. Call [`Level::write_back`] afterwards
    /// to propagate the removal to the owning group.
    pub fn remove(&mut self, id: NodeId) -> Option<Item> {
        let items = self.items_mut()?;
        let position = items.iter().position(|item| NodeId::of_item(item) == id)?;
        Some(items.remove(position))
    }

    /// Copy a flat level's items onto the group it renders, if they differ.
    ///
    /// Returns whether the group was updated. The written members become the
    /// level's last seen members, so the next tick does not regroup.
    pub fn write_back(&mut self) -> bool {
        let (Grouping::Ungrouped(items), Some(owner)) = (&self.grouping, &self.owner) else {
            return false;
        };
        if same_items(items, owner.record().children()) {
            return false;
        }

        debug!(
            key = %owner.key(),
            members = items.len(),
            "writing level items back to group"
        );
        owner.replace_children(items.clone());
        self.seen = Some(items.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parse;
    use crate::source::{Members, SharedItems};
    use serde_json::json;
    use std::cell::RefCell;

    fn expression(text: &str) -> Rc<ParsedExpression> {
        Rc::new(parse(text).unwrap())
    }

    fn typed(values: &[(&str, &str)]) -> Vec<Item> {
        Item::collect(
            values
                .iter()
                .map(|(name, kind)| json!({"name": name, "type": kind})),
        )
    }

    #[test]
    fn test_digest_mirrors_named_collection() {
        let mut scope = Scope::new();
        scope.set_items("nodes", Item::collect((1..=5).map(|i| json!(i))));
        let mut level = Level::root(expression("nodes"), "nodes");

        assert!(level.digest(&scope));
        assert_eq!(level.len(), 5);

        scope.items_mut("nodes").unwrap().push(Item::new(json!(6)));
        assert!(level.digest(&scope));
        assert_eq!(level.len(), 6);
    }

    #[test]
    fn test_digest_skips_unchanged_collections() {
        let mut scope = Scope::new();
        scope.set_items("nodes", typed(&[("a", "X")]));
        let mut level = Level::root(expression("nodes group by type"), "nodes");

        assert!(level.digest(&scope));
        assert!(!level.digest(&scope));
    }

    #[test]
    fn test_digest_mirrors_literal_collection() {
        let shared: SharedItems = Rc::new(RefCell::new(Item::collect((1..=5).map(|i| json!(i)))));
        let mut level = Level::root(expression("nodes"), shared.clone());

        level.digest(&Scope::new());
        assert_eq!(level.len(), 5);

        shared.borrow_mut().push(Item::new(json!(6)));
        level.digest(&Scope::new());
        assert_eq!(level.len(), 6);
    }

    #[test]
    fn test_digest_mirrors_accessor() {
        let shared: SharedItems = Rc::new(RefCell::new(Item::collect((1..=5).map(|i| json!(i)))));
        let captured = shared.clone();
        let accessor = Accessor::new(move |_| Members::detached(captured.borrow().clone()));
        let mut level = Level::root(expression("nodes"), accessor);

        level.digest(&Scope::new());
        assert_eq!(level.len(), 5);

        shared.borrow_mut().push(Item::new(json!(6)));
        level.digest(&Scope::new());
        assert_eq!(level.len(), 6);
    }

    #[test]
    fn test_grouped_level_keeps_group_identity() {
        let mut scope = Scope::new();
        scope.set_items("nodes", typed(&[("a", "X"), ("b", "Y")]));
        let mut level = Level::root(expression("nodes group by type"), "nodes");
        level.digest(&scope);

        let before = level.grouping().groups().unwrap().to_vec();
        scope
            .items_mut("nodes")
            .unwrap()
            .push(Item::new(json!({"name": "c", "type": "X"})));
        level.digest(&scope);

        let after = level.grouping().groups().unwrap();
        assert!(Group::ptr_eq(&before[0], &after[0]));
        assert!(Group::ptr_eq(&before[1], &after[1]));
        assert_eq!(after[0].len(), 2);
    }

    #[test]
    fn test_alternation_between_groups_and_items() {
        let mut scope = Scope::new();
        scope.set_items(
            "nodes",
            typed(&[("a", "foo"), ("b", "foo"), ("c", "foo"), ("d", "bar")]),
        );
        let expr = expression("nodes group by type");
        let mut level = Level::root(expr.clone(), "nodes");
        level.digest(&scope);

        assert!(level.is_intermediate());
        assert_eq!(level.len(), 2);

        let first = level.nodes().remove(0);
        let mut child = Level::new(expr, NodeSource::path("node.children").resolve(), level.state());
        child.digest(&Scope::for_node("node", first));

        assert!(!child.is_intermediate());
        assert_eq!(child.len(), 3);
        assert!(child.owner().is_some());
    }

    #[test]
    fn test_write_back_updates_owner() {
        let mut scope = Scope::new();
        scope.set_items("nodes", typed(&[("a", "X"), ("b", "X")]));
        let expr = expression("nodes group by type");
        let mut level = Level::root(expr.clone(), "nodes");
        level.digest(&scope);

        let group = level.grouping().groups().unwrap()[0].clone();
        let mut child = Level::new(expr, NodeSource::path("node.children").resolve(), level.state());
        child.digest(&Scope::for_node("node", Node::Group(group.clone())));

        assert!(!child.write_back());

        let first = NodeId::of_item(&child.grouping().items().unwrap()[0]);
        assert!(child.remove(first).is_some());
        assert!(child.write_back());
        assert_eq!(group.len(), 1);
        assert!(same_items(
            &group.children(),
            child.grouping().items().unwrap()
        ));

        assert!(!child.write_back());
    }

    #[test]
    fn test_write_back_is_noop_without_owner() {
        let mut scope = Scope::new();
        scope.set_items("nodes", typed(&[("a", "X")]));
        let mut level = Level::root(expression("nodes"), "nodes");
        level.digest(&scope);

        level.items_mut().unwrap().clear();
        assert!(!level.write_back());
    }

    #[test]
    fn test_grouped_level_has_no_mutable_items() {
        let mut scope = Scope::new();
        scope.set_items("nodes", typed(&[("a", "X")]));
        let mut level = Level::root(expression("nodes group by type"), "nodes");
        level.digest(&scope);

        assert!(level.items_mut().is_none());
        assert!(!level.write_back());
    }
}
