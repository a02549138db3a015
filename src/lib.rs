//! # treemendous
//!
//! Tree rendering with on-the-fly grouping.
//!
//! A tree is described by a small expression, `nodes [group by key [as field]]`.
//! Each level of the tree watches a collection and renders it either as the
//! original items or as synthetic group records, one per distinct value of
//! `key`, holding the members under `field` (`children` by default). A level
//! below a grouped level renders flat, so one expression alternates group and
//! item levels all the way down.
//!
//! Levels are change-detected: syncing compares each level's members with
//! what it saw before, by identity, and regroups only on change. Regrouping
//! merges into the group records already rendered instead of replacing them,
//! so per-node state (selection, expansion) survives data updates.
//!
//! ## Modules
//!
//! - [`expression`]: parsing the tree expression
//! - [`grouping`]: bucketing, merging and the flat/grouped alternation
//! - [`tree`]: levels and the recursive tree they form
//! - [`selection`], [`expansion`], [`interaction`], [`controller`]: UI state
//! - [`data`]: binding JSON documents into a scope
//! - [`render`]: treeviz and JSON output
//! - [`testing`]: fluent assertions for tests

pub mod controller;
pub mod data;
pub mod expansion;
pub mod expression;
pub mod grouping;
pub mod interaction;
pub mod item;
pub mod node;
pub mod render;
pub mod selection;
pub mod source;
pub mod testing;
pub mod tree;

pub use controller::{Outcome, TreeController};
pub use expansion::ExpansionState;
pub use expression::{parse, MalformedExpression, ParsedExpression, DEFAULT_CHILDREN_FIELD};
pub use grouping::{bucket, group, merge, Group, GroupKey, GroupRecord, Grouping, LevelState};
pub use interaction::{Bindings, ClickDebounce, Gesture};
pub use item::Item;
pub use node::{Node, NodeId};
pub use selection::{SelectMode, SelectState, SelectionRegistry};
pub use source::{Accessor, Members, NodeSource, Scope, SharedItems};
pub use tree::{Level, Row, SyncReport, Tree, TreeOptions};
