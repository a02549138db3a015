//! Shared handles to source records
//!
//! The grouping engine never looks inside a record beyond the group key, and it
//! compares records by identity, not by value. An [`Item`] is therefore a cheap
//! reference-counted handle: cloning it clones the handle, and two handles are
//! "the same item" exactly when they point at the same record.
//!
//! Records are built once from JSON. Object fields holding arrays are lifted
//! into nested item collections at that point, so a branch rendering
//! `node.children` sees the same child handles on every change notification.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

struct Record {
    /// The record's scalar part: an object without its collection fields, or
    /// any non-object JSON value as-is.
    value: Value,
    collections: BTreeMap<String, Vec<Item>>,
}

/// A shared handle to one record of a source collection.
#[derive(Clone)]
pub struct Item(Rc<Record>);

impl Item {
    /// Build an item from JSON, lifting array fields into nested collections.
    pub fn new(value: Value) -> Self {
        let record = match value {
            Value::Object(map) => {
                let mut fields = Map::new();
                let mut collections = BTreeMap::new();
                for (name, field) in map {
                    match field {
                        Value::Array(values) => {
                            collections.insert(name, Item::collect(values));
                        }
                        other => {
                            fields.insert(name, other);
                        }
                    }
                }
                Record {
                    value: Value::Object(fields),
                    collections,
                }
            }
            other => Record {
                value: other,
                collections: BTreeMap::new(),
            },
        };
        Item(Rc::new(record))
    }

    /// Build one item per JSON value.
    pub fn collect(values: impl IntoIterator<Item = Value>) -> Vec<Item> {
        values.into_iter().map(Item::new).collect()
    }

    /// Read a scalar field. Collection fields are not visible here.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.value.as_object().and_then(|fields| fields.get(field))
    }

    /// The record's scalar part.
    pub fn value(&self) -> &Value {
        &self.0.value
    }

    /// A nested collection lifted from an array field.
    pub fn collection(&self, field: &str) -> Option<&[Item]> {
        self.0.collections.get(field).map(Vec::as_slice)
    }

    pub fn has_collections(&self) -> bool {
        self.0.collections.values().any(|items| !items.is_empty())
    }

    /// Whether two handles refer to the same record.
    pub fn ptr_eq(a: &Item, b: &Item) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Rebuild the full JSON value, nested collections included.
    pub fn to_json(&self) -> Value {
        if self.0.collections.is_empty() {
            return self.0.value.clone();
        }

        let mut fields = self.0.value.as_object().cloned().unwrap_or_default();
        for (name, items) in &self.0.collections {
            fields.insert(
                name.clone(),
                Value::Array(items.iter().map(Item::to_json).collect()),
            );
        }
        Value::Object(fields)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({})", self.to_json())
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::new(value)
    }
}

/// Whether two sequences hold the same items, by identity, in the same order.
pub fn same_items(a: &[Item], b: &[Item]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Item::ptr_eq(x, y))
}

/// Identity set over items, for "already present" checks.
#[derive(Debug, Default)]
pub(crate) struct ItemSet {
    addresses: HashSet<usize>,
}

impl ItemSet {
    pub(crate) fn of(items: &[Item]) -> Self {
        ItemSet {
            addresses: items.iter().map(Item::address).collect(),
        }
    }

    /// Insert an item, returning false if it was already present.
    pub(crate) fn insert(&mut self, item: &Item) -> bool {
        self.addresses.insert(item.address())
    }
}
