//! Grouping engine
//!
//! Turns a flat collection into group records keyed by a property, and keeps
//! those records stable when the collection changes.
//!
//! # The Algorithm
//!
//! 1. **Bucketing:** walk the members in order, read `member[group_key]` and
//!    append the member to the group for that key, creating the group on first
//!    sight. Groups come out in first-seen order, members in source order.
//!
//! 2. **Merging:** when the level already renders groups, the fresh groups are
//!    only *candidates*. A candidate whose key matches a rendered group donates
//!    the members that group does not hold yet (by identity); a candidate with
//!    an unseen key is appended at the end. Rendered groups are never replaced
//!    or reordered, and members are never removed, so views bound to a group
//!    keep their state across regroups.
//!
//! 3. **Alternation:** a level watching the children of a group renders them
//!    flat even though the grouping configuration is inherited. One grouping
//!    expression therefore yields a group level, then an item level, then a
//!    group level again for nested collections, and so on.

use crate::expression::ParsedExpression;
use crate::item::{Item, ItemSet};
use crate::node::Node;
use serde_json::{Map, Value};
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Whether a rendered level holds original items or group records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelState {
    #[default]
    Flat,
    Grouped,
}

/// The value a member holds for the group key.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// The member has no such property
    Missing,
    Value(Value),
}

impl GroupKey {
    /// Read `field` off an item, including array fields lifted into
    /// collections.
    pub fn of(item: &Item, field: &str) -> Self {
        if let Some(value) = item.get(field) {
            return GroupKey::Value(value.clone());
        }
        match item.collection(field) {
            Some(members) => GroupKey::Value(Value::Array(
                members.iter().map(Item::to_json).collect(),
            )),
            None => GroupKey::Missing,
        }
    }

    /// JSON form, with a missing key rendered as `null`.
    pub fn to_json(&self) -> Value {
        match self {
            GroupKey::Missing => Value::Null,
            GroupKey::Value(value) => value.clone(),
        }
    }

    /// Hashable stand-in, equal exactly when the keys are equal.
    fn fingerprint(&self) -> String {
        match self {
            // serialized JSON is never empty
            GroupKey::Missing => String::new(),
            GroupKey::Value(value) => value.to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Missing => write!(f, "(missing)"),
            GroupKey::Value(Value::String(s)) => write!(f, "{}", s),
            GroupKey::Value(value) => write!(f, "{}", value),
        }
    }
}

/// A synthetic parent record: one key value and the members sharing it.
#[derive(Debug)]
pub struct GroupRecord {
    key_field: String,
    key: GroupKey,
    children_field: String,
    children: Vec<Item>,
}

impl GroupRecord {
    /// Name of the property the key was read from.
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    /// Name of the property the members are stored under.
    pub fn children_field(&self) -> &str {
        &self.children_field
    }

    pub fn children(&self) -> &[Item] {
        &self.children
    }
}

/// Shared handle to a [`GroupRecord`].
///
/// Cloning shares the record. The engine mutates records in place during a
/// merge, and every level holding the handle sees the change.
#[derive(Debug, Clone)]
pub struct Group(Rc<RefCell<GroupRecord>>);

impl Group {
    fn new(key_field: &str, key: GroupKey, children_field: &str, first: Item) -> Self {
        Group(Rc::new(RefCell::new(GroupRecord {
            key_field: key_field.to_string(),
            key,
            children_field: children_field.to_string(),
            children: vec![first],
        })))
    }

    /// Borrow the record.
    pub fn record(&self) -> Ref<'_, GroupRecord> {
        self.0.borrow()
    }

    pub fn key(&self) -> GroupKey {
        self.record().key.clone()
    }

    /// Handles to the current members.
    pub fn children(&self) -> Vec<Item> {
        self.record().children.clone()
    }

    pub fn len(&self) -> usize {
        self.record().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record().children.is_empty()
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.record()
            .children
            .iter()
            .any(|child| Item::ptr_eq(child, item))
    }

    /// Replace the member sequence wholesale.
    pub fn replace_children(&self, children: Vec<Item>) {
        self.0.borrow_mut().children = children;
    }

    pub fn ptr_eq(a: &Group, b: &Group) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Append the candidates not already present, keeping their order.
    /// Returns how many were appended.
    fn absorb(&self, candidates: Vec<Item>) -> usize {
        let mut record = self.0.borrow_mut();
        let mut present = ItemSet::of(&record.children);
        let before = record.children.len();
        for candidate in candidates {
            if present.insert(&candidate) {
                record.children.push(candidate);
            }
        }
        record.children.len() - before
    }

    fn push(&self, item: Item) {
        self.0.borrow_mut().children.push(item);
    }

    /// JSON form: `{ <key_field>: key, <children_field>: [members] }`.
    pub fn to_json(&self) -> Value {
        let record = self.record();
        let mut fields = Map::new();
        fields.insert(record.key_field.clone(), record.key.to_json());
        fields.insert(
            record.children_field.clone(),
            Value::Array(record.children.iter().map(Item::to_json).collect()),
        );
        Value::Object(fields)
    }
}

/// What one level renders.
#[derive(Debug, Clone)]
pub enum Grouping {
    /// The members, untouched
    Ungrouped(Vec<Item>),
    /// Group records built from (or merged with) the members
    Grouped(Vec<Group>),
}

impl Default for Grouping {
    fn default() -> Self {
        Grouping::Ungrouped(Vec::new())
    }
}

impl Grouping {
    pub fn state(&self) -> LevelState {
        match self {
            Grouping::Ungrouped(_) => LevelState::Flat,
            Grouping::Grouped(_) => LevelState::Grouped,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Grouping::Ungrouped(items) => items.len(),
            Grouping::Grouped(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> Option<&[Item]> {
        match self {
            Grouping::Ungrouped(items) => Some(items),
            Grouping::Grouped(_) => None,
        }
    }

    pub fn groups(&self) -> Option<&[Group]> {
        match self {
            Grouping::Grouped(groups) => Some(groups),
            Grouping::Ungrouped(_) => None,
        }
    }

    /// Handles to every rendered node, in order.
    pub fn nodes(&self) -> Vec<Node> {
        match self {
            Grouping::Ungrouped(items) => items.iter().cloned().map(Node::Item).collect(),
            Grouping::Grouped(groups) => groups.iter().cloned().map(Node::Group).collect(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Grouping::Ungrouped(items) => Value::Array(items.iter().map(Item::to_json).collect()),
            Grouping::Grouped(groups) => Value::Array(groups.iter().map(Group::to_json).collect()),
        }
    }
}

/// Group `next` for a level.
///
/// - No group key, or a parent level that is itself grouped: `next` comes back
///   as [`Grouping::Ungrouped`], untouched.
/// - Otherwise the members are bucketed. With `previous` (the groups the level
///   currently renders) the buckets are merged into it and the same vector is
///   returned; without it the buckets are returned as they are.
pub fn group(
    expression: &ParsedExpression,
    parent: LevelState,
    previous: Option<Vec<Group>>,
    next: Vec<Item>,
) -> Grouping {
    let Some(key_field) = expression.group_key() else {
        return Grouping::Ungrouped(next);
    };
    if parent == LevelState::Grouped {
        return Grouping::Ungrouped(next);
    }

    let candidates = bucket(key_field, expression.children_field(), &next);
    match previous {
        Some(mut existing) => {
            merge(&mut existing, candidates);
            Grouping::Grouped(existing)
        }
        None => Grouping::Grouped(candidates),
    }
}

/// Bucket `items` by `key_field`, keys in first-seen order.
pub fn bucket(key_field: &str, children_field: &str, items: &[Item]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = GroupKey::of(item, key_field);
        match index.get(&key.fingerprint()) {
            Some(&position) => groups[position].push(item.clone()),
            None => {
                index.insert(key.fingerprint(), groups.len());
                groups.push(Group::new(key_field, key, children_field, item.clone()));
            }
        }
    }

    debug!(
        key = key_field,
        members = items.len(),
        groups = groups.len(),
        "bucketed members"
    );
    groups
}

/// Merge freshly bucketed `candidates` into the rendered `existing` groups,
/// in place.
///
/// Matching keys absorb the members they lack; unseen keys are appended at the
/// end. Nothing is removed.
pub fn merge(existing: &mut Vec<Group>, candidates: Vec<Group>) {
    let mut new_groups = 0;
    let mut new_members = 0;

    for candidate in candidates {
        let key = candidate.key();
        match existing.iter().find(|group| group.record().key == key) {
            Some(group) => new_members += group.absorb(candidate.children()),
            None => {
                new_groups += 1;
                existing.push(candidate);
            }
        }
    }

    debug!(
        groups = existing.len(),
        new_groups, new_members, "merged regrouped members"
    );
}
