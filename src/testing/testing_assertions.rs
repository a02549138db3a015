//! Fluent assertion API for groupings

use crate::grouping::{Group, GroupKey, Grouping, LevelState};
use crate::item::Item;
use serde_json::Value;

// ============================================================================
// Entry Point
// ============================================================================

/// Create an assertion builder for a level's grouping
pub fn assert_grouping(grouping: &Grouping) -> GroupingAssertion<'_> {
    GroupingAssertion { grouping }
}

// ============================================================================
// Grouping Assertions
// ============================================================================

pub struct GroupingAssertion<'a> {
    grouping: &'a Grouping,
}

impl<'a> GroupingAssertion<'a> {
    pub fn is_grouped(self) -> Self {
        assert_eq!(
            self.grouping.state(),
            LevelState::Grouped,
            "Expected group records, found items: [{}]",
            summarize(self.grouping)
        );
        self
    }

    pub fn is_flat(self) -> Self {
        assert_eq!(
            self.grouping.state(),
            LevelState::Flat,
            "Expected items, found group records: [{}]",
            summarize(self.grouping)
        );
        self
    }

    /// Assert the number of group records
    pub fn group_count(self, expected: usize) -> Self {
        let groups = self.groups();
        assert_eq!(
            groups.len(),
            expected,
            "Expected {} groups, found {} groups: [{}]",
            expected,
            groups.len(),
            summarize(self.grouping)
        );
        self
    }

    /// Assert the number of items of a flat level
    pub fn item_count(self, expected: usize) -> Self {
        let items = self.items();
        assert_eq!(
            items.len(),
            expected,
            "Expected {} items, found {} items: [{}]",
            expected,
            items.len(),
            summarize(self.grouping)
        );
        self
    }

    /// Assert on a specific group by index
    pub fn group<F, R>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(GroupAssertion<'a>) -> R,
    {
        let groups = self.groups();
        assert!(
            index < groups.len(),
            "Group index {} out of bounds (level has {} groups)",
            index,
            groups.len()
        );
        assertion(GroupAssertion {
            group: &groups[index],
            context: format!("groups[{}]", index),
        });
        self
    }

    /// Assert on a specific item of a flat level by index
    pub fn item<F, R>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ItemAssertion) -> R,
    {
        let items = self.items();
        assert!(
            index < items.len(),
            "Item index {} out of bounds (level has {} items)",
            index,
            items.len()
        );
        assertion(ItemAssertion {
            item: items[index].clone(),
            context: format!("items[{}]", index),
        });
        self
    }

    /// Assert the group keys, in order
    pub fn keys(self, expected: &[Value]) -> Self {
        let actual: Vec<Value> = self.groups().iter().map(|g| g.key().to_json()).collect();
        assert_eq!(actual, expected, "Group keys differ");
        self
    }

    fn groups(&self) -> &'a [Group] {
        match self.grouping.groups() {
            Some(groups) => groups,
            None => panic!(
                "Expected group records, found items: [{}]",
                summarize(self.grouping)
            ),
        }
    }

    fn items(&self) -> &'a [Item] {
        match self.grouping.items() {
            Some(items) => items,
            None => panic!(
                "Expected items, found group records: [{}]",
                summarize(self.grouping)
            ),
        }
    }
}

// ============================================================================
// Group Assertions
// ============================================================================

pub struct GroupAssertion<'a> {
    group: &'a Group,
    context: String,
}

impl<'a> GroupAssertion<'a> {
    /// Assert the key value; strings compare against the unquoted key
    pub fn key(self, expected: impl Into<Value>) -> Self {
        let expected = expected.into();
        let actual = self.group.key();
        assert_eq!(
            actual,
            GroupKey::Value(expected.clone()),
            "{}: Expected key {}, found {}",
            self.context,
            expected,
            actual
        );
        self
    }

    /// Assert the members did not carry the key property
    pub fn key_missing(self) -> Self {
        let actual = self.group.key();
        assert_eq!(
            actual,
            GroupKey::Missing,
            "{}: Expected missing key, found {}",
            self.context,
            actual
        );
        self
    }

    pub fn key_field(self, expected: &str) -> Self {
        let record = self.group.record();
        assert_eq!(
            record.key_field(),
            expected,
            "{}: Expected key field '{}', found '{}'",
            self.context,
            expected,
            record.key_field()
        );
        drop(record);
        self
    }

    pub fn children_field(self, expected: &str) -> Self {
        let record = self.group.record();
        assert_eq!(
            record.children_field(),
            expected,
            "{}: Expected children field '{}', found '{}'",
            self.context,
            expected,
            record.children_field()
        );
        drop(record);
        self
    }

    pub fn child_count(self, expected: usize) -> Self {
        let actual = self.group.len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} children, found {}",
            self.context,
            expected,
            actual
        );
        self
    }

    /// Assert on a specific member by index
    pub fn child<F, R>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ItemAssertion) -> R,
    {
        let children = self.group.children();
        assert!(
            index < children.len(),
            "{}: Child index {} out of bounds (group has {} children)",
            self.context,
            index,
            children.len()
        );
        assertion(ItemAssertion {
            item: children[index].clone(),
            context: format!("{}:children[{}]", self.context, index),
        });
        self
    }

    /// Assert the members are exactly `expected`, by identity and in order
    pub fn same_children(self, expected: &[Item]) -> Self {
        let children = self.group.children();
        assert!(
            crate::item::same_items(&children, expected),
            "{}: Expected children {:?}, found {:?}",
            self.context,
            expected,
            children
        );
        self
    }

    /// Assert this is the very group record `expected` points at
    pub fn is(self, expected: &Group) -> Self {
        assert!(
            Group::ptr_eq(self.group, expected),
            "{}: Expected the same group record",
            self.context
        );
        self
    }
}

// ============================================================================
// Item Assertions
// ============================================================================

pub struct ItemAssertion {
    item: Item,
    context: String,
}

impl ItemAssertion {
    /// Assert a scalar field's value
    pub fn field(self, name: &str, expected: impl Into<Value>) -> Self {
        let expected = expected.into();
        assert_eq!(
            self.item.get(name),
            Some(&expected),
            "{}: Expected {} = {}, found {:?}",
            self.context,
            name,
            expected,
            self.item
        );
        self
    }

    /// Assert this is the very record `expected` points at
    pub fn is(self, expected: &Item) -> Self {
        assert!(
            Item::ptr_eq(&self.item, expected),
            "{}: Expected {:?}, found {:?}",
            self.context,
            expected,
            self.item
        );
        self
    }
}

fn summarize(grouping: &Grouping) -> String {
    match grouping {
        Grouping::Ungrouped(items) => items
            .iter()
            .map(|item| item.value().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        Grouping::Grouped(groups) => groups
            .iter()
            .map(|group| format!("{}({})", group.key(), group.len()))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
