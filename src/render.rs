//! Output formats for a synced tree
//!
//! Treeviz is a one line per node rendering of the whole tree, all branches
//! included regardless of expansion. Nesting is drawn with box connectors:
//!
//!   ├─ ⊞ type: X
//!   │ ├─ • a
//!   │ └─ • b
//!   └─ ⊞ type: Y
//!     └─ • c
//!
//! Icons:
//!     Group: ⊞
//!     Item: •
//!
//! The JSON form nests the rendered levels: every node carries its rendered
//! branch under the children field, so grouped levels show up as group
//! records at whatever depth they were produced.

use crate::grouping::Grouping;
use crate::node::Node;
use crate::tree::{Branch, Tree};
use serde_json::{Map, Value};

/// Item property used as a label, unless configured otherwise.
pub const DEFAULT_LABEL_FIELD: &str = "name";

const MAX_LABEL_CHARS: usize = 30;

pub fn icon(node: &Node) -> &'static str {
    match node {
        Node::Group(_) => "⊞",
        Node::Item(_) => "•",
    }
}

/// `key_field: key` for groups; the label property (or the whole scalar
/// record, compacted) for items.
pub fn node_label(node: &Node, label_field: &str) -> String {
    match node {
        Node::Group(group) => {
            let record = group.record();
            format!("{}: {}", record.key_field(), record.key())
        }
        Node::Item(item) => match item.get(label_field) {
            Some(Value::String(label)) => label.clone(),
            Some(value) => value.to_string(),
            None => item.value().to_string(),
        },
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

/// Lines are joined with `\n`, without a trailing newline.
pub fn to_treeviz_str(tree: &Tree, label_field: &str) -> String {
    let mut lines = Vec::new();
    append_children(&mut lines, tree.root().children(), "", label_field);
    lines.join("\n")
}

fn append_children(lines: &mut Vec<String>, children: &[Branch], prefix: &str, label_field: &str) {
    for (i, child) in children.iter().enumerate() {
        let Some(node) = child.node() else {
            continue;
        };
        let is_last = i == children.len() - 1;
        let connector = if is_last { "└─" } else { "├─" };

        lines.push(format!(
            "{}{} {} {}",
            prefix,
            connector,
            icon(node),
            truncate(&node_label(node, label_field), MAX_LABEL_CHARS)
        ));

        let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        append_children(lines, child.children(), &new_prefix, label_field);
    }
}

/// One level as JSON: its items, or its group records.
pub fn grouping_to_json(grouping: &Grouping) -> Value {
    grouping.to_json()
}

/// The rendered tree as nested JSON.
pub fn to_json(tree: &Tree) -> Value {
    let children_field = tree.expression().children_field();
    Value::Array(
        tree.root()
            .children()
            .iter()
            .map(|branch| branch_to_json(branch, children_field))
            .collect(),
    )
}

fn branch_to_json(branch: &Branch, children_field: &str) -> Value {
    let Some(node) = branch.node() else {
        return Value::Null;
    };

    let mut value = match node {
        Node::Item(item) => item.to_json(),
        Node::Group(group) => {
            let record = group.record();
            let mut fields = Map::new();
            fields.insert(record.key_field().to_string(), record.key().to_json());
            Value::Object(fields)
        }
    };

    if let Value::Object(fields) = &mut value {
        if node.is_group() || !branch.children().is_empty() {
            fields.insert(
                children_field.to_string(),
                Value::Array(
                    branch
                        .children()
                        .iter()
                        .map(|child| branch_to_json(child, children_field))
                        .collect(),
                ),
            );
        }
    }
    value
}
