//! Where a level gets its members from
//!
//! A level can be pointed at its collection three ways: by a dotted path
//! evaluated in a [`Scope`], by a host-owned list, or by an arbitrary closure.
//! All three are resolved once, when the level is configured, into a single
//! [`Accessor`] that every change-detection tick simply calls.

use crate::grouping::Group;
use crate::item::Item;
use crate::node::Node;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{trace, warn};

/// A list owned by the host and mutated between ticks.
pub type SharedItems = Rc<RefCell<Vec<Item>>>;

/// A name bound in a [`Scope`].
#[derive(Debug, Clone)]
pub enum Binding {
    /// A collection of items
    Items(Vec<Item>),
    /// The node a branch renders under
    Node(Node),
}

/// The data context a level's source is evaluated against.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: HashMap<String, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope for a branch: just the node it renders under.
    pub fn for_node(name: &str, node: Node) -> Self {
        let mut scope = Scope::new();
        scope.bind(name, Binding::Node(node));
        scope
    }

    pub fn bind(&mut self, name: &str, binding: Binding) {
        self.bindings.insert(name.to_string(), binding);
    }

    /// Bind (or rebind) a collection.
    pub fn set_items(&mut self, name: &str, items: Vec<Item>) {
        self.bind(name, Binding::Items(items));
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Mutable access to a bound collection, for hosts mutating data in place.
    pub fn items_mut(&mut self, name: &str) -> Option<&mut Vec<Item>> {
        match self.bindings.get_mut(name) {
            Some(Binding::Items(items)) => Some(items),
            _ => None,
        }
    }

    /// Evaluate a dotted path.
    ///
    /// `name` yields a bound collection. `name.field` yields the `field`
    /// collection of a bound node; on a group, only its children field resolves,
    /// and the group is reported as the owner of the members. Anything that does
    /// not resolve yields no members.
    pub fn lookup(&self, path: &str) -> Members {
        let mut segments = path.split('.').map(str::trim);
        let head = segments.next().unwrap_or_default();
        let field = segments.next();
        if segments.next().is_some() {
            trace!(path, "path nests deeper than one field");
            return Members::default();
        }

        match (self.bindings.get(head), field) {
            (Some(Binding::Items(items)), None) => Members::detached(items.clone()),
            (Some(Binding::Node(Node::Item(item))), Some(field)) => item
                .collection(field)
                .map(|items| Members::detached(items.to_vec()))
                .unwrap_or_default(),
            (Some(Binding::Node(Node::Group(group))), Some(field))
                if group.record().children_field() == field =>
            {
                Members::owned_by(group.clone())
            }
            _ => {
                trace!(path, "path did not resolve");
                Members::default()
            }
        }
    }
}

/// The members a source produced on one tick.
#[derive(Debug, Clone, Default)]
pub struct Members {
    pub items: Vec<Item>,
    /// The group the members were read from, if any
    pub owner: Option<Group>,
}

impl Members {
    pub fn detached(items: Vec<Item>) -> Self {
        Members { items, owner: None }
    }

    pub fn owned_by(group: Group) -> Self {
        Members {
            items: group.children(),
            owner: Some(group),
        }
    }
}

/// A resolved source: called once per change-detection tick.
#[derive(Clone)]
pub struct Accessor(Rc<dyn Fn(&Scope) -> Members>);

impl Accessor {
    pub fn new(f: impl Fn(&Scope) -> Members + 'static) -> Self {
        Accessor(Rc::new(f))
    }

    pub fn collect(&self, scope: &Scope) -> Members {
        (self.0)(scope)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Accessor(..)")
    }
}

/// How a level names its collection.
#[derive(Debug, Clone)]
pub enum NodeSource {
    /// A dotted path evaluated in the level's scope (`nodes`, `node.children`)
    NamedPath(String),
    /// A list owned by the host
    Literal(SharedItems),
    /// A host closure
    Accessor(Accessor),
}

impl NodeSource {
    pub fn path(path: impl Into<String>) -> Self {
        NodeSource::NamedPath(path.into())
    }

    /// Resolve into the single accessor the level calls on every tick.
    pub fn resolve(self) -> Accessor {
        match self {
            NodeSource::NamedPath(path) => {
                if !is_plain_path(&path) {
                    warn!(
                        path = path.as_str(),
                        "only dotted paths are evaluated; the collection will be empty"
                    );
                    return Accessor::new(|_| Members::default());
                }
                Accessor::new(move |scope| scope.lookup(&path))
            }
            NodeSource::Literal(items) => {
                Accessor::new(move |_| Members::detached(items.borrow().clone()))
            }
            NodeSource::Accessor(accessor) => accessor,
        }
    }
}

impl From<&str> for NodeSource {
    fn from(path: &str) -> Self {
        NodeSource::path(path)
    }
}

impl From<SharedItems> for NodeSource {
    fn from(items: SharedItems) -> Self {
        NodeSource::Literal(items)
    }
}

impl From<Accessor> for NodeSource {
    fn from(accessor: Accessor) -> Self {
        NodeSource::Accessor(accessor)
    }
}

/// `ident(.ident)*`, whitespace around segments allowed.
fn is_plain_path(path: &str) -> bool {
    path.split('.').all(|segment| {
        let segment = segment.trim();
        let mut chars = segment.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    })
}
