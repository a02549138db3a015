//! Rendered nodes
//!
//! A level renders either original items or group records. [`Node`] is the
//! common handle for both, and [`NodeId`] its identity.

use crate::grouping::Group;
use crate::item::Item;
use std::fmt;

/// Stable identifier for a rendered node.
///
/// Derived from the identity of the node's shared record, so it stays the same
/// for as long as the node is alive, across regroups and merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn of_item(item: &Item) -> Self {
        NodeId(item.address())
    }

    pub fn of_group(group: &Group) -> Self {
        NodeId(group.address())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// One node of a rendered level.
#[derive(Debug, Clone)]
pub enum Node {
    Item(Item),
    Group(Group),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Item(item) => NodeId::of_item(item),
            Node::Group(group) => NodeId::of_group(group),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Node::Item(item) => Some(item),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            Node::Item(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Node::Item(item) => item.to_json(),
            Node::Group(group) => group.to_json(),
        }
    }
}

impl From<Item> for Node {
    fn from(item: Item) -> Self {
        Node::Item(item)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}
