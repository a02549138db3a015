//! Record and scope builders for tests

use crate::item::Item;
use crate::source::Scope;
use serde_json::{json, Value};

/// `{"name": name, "type": kind}` records, in order.
pub fn typed_items(records: &[(&str, &str)]) -> Vec<Item> {
    Item::collect(
        records
            .iter()
            .map(|(name, kind)| json!({"name": name, "type": kind})),
    )
}

/// A scope binding `values` as items under `name`.
pub fn scope_with(name: &str, values: Vec<Value>) -> Scope {
    let mut scope = Scope::new();
    scope.set_items(name, Item::collect(values));
    scope
}

/// Two levels of `title`/`type` records, nested under `children`.
pub fn nested_values() -> Vec<Value> {
    vec![
        json!({"title": "A", "type": "type1", "children": [
            {"title": "Aa", "type": "type2", "children": [{"title": "Aaa"}]},
            {"title": "Ab", "type": "type2"}
        ]}),
        json!({"title": "B", "type": "type1", "children": [
            {"title": "Ba", "type": "type2", "children": [{"title": "Baa"}]},
            {"title": "Bb", "type": "type3"}
        ]}),
    ]
}
