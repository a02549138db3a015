//! Recursive tree model
//!
//! A [`Tree`] is a root [`Level`] plus one branch level per rendered node,
//! recursively. Every branch watches the same branch source (by default
//! `node.<children field>`) evaluated in a scope that binds the node it renders
//! under, and inherits the tree's grouping expression. Because a branch under a
//! grouped level renders flat, one expression alternates group and item levels
//! all the way down.
//!
//! [`Tree::sync`] is the change-detection pass over the whole tree: levels are
//! digested top-down, branches are created for new nodes and dropped for nodes
//! that are gone. Branches are keyed by [`NodeId`], so a node that survives a
//! regroup keeps its branch (and whatever the UI attached to its id).

mod level;

pub use level::Level;

use crate::expansion::ExpansionState;
use crate::expression::ParsedExpression;
use crate::grouping::LevelState;
use crate::item::Item;
use crate::node::{Node, NodeId};
use crate::source::{Accessor, NodeSource, Scope};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::debug;

/// Name the node is bound under in a branch scope, unless configured otherwise.
pub const DEFAULT_NODE_NAME: &str = "node";

/// How branches find their members.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Source evaluated for every branch
    pub branch: NodeSource,
    /// Name the parent node is bound under when evaluating `branch`
    pub node_name: String,
}

impl TreeOptions {
    /// Branches read `node.<children field>`.
    pub fn for_expression(expression: &ParsedExpression) -> Self {
        TreeOptions {
            branch: NodeSource::path(format!(
                "{}.{}",
                DEFAULT_NODE_NAME,
                expression.children_field()
            )),
            node_name: DEFAULT_NODE_NAME.to_string(),
        }
    }
}

/// What one [`Tree::sync`] pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Nodes that got a branch in this pass
    pub added: Vec<NodeId>,
    /// Nodes whose branch was dropped, descendants included
    pub removed: Vec<NodeId>,
    /// Levels that regrouped
    pub changed_levels: usize,
}

/// A node in the depth-first flattening of the visible tree.
#[derive(Debug, Clone)]
pub struct Row {
    pub id: NodeId,
    pub node: Node,
    /// Depth in the tree (for indentation)
    pub depth: usize,
    pub has_children: bool,
    pub is_expanded: bool,
}

#[derive(Debug)]
struct BranchConfig {
    expression: Rc<ParsedExpression>,
    branch: Accessor,
    node_name: String,
}

/// A level together with the branches of its nodes.
#[derive(Debug)]
pub struct Branch {
    node: Option<Node>,
    level: Level,
    children: Vec<Branch>,
}

impl Branch {
    /// The node this branch renders under; `None` for the root.
    pub fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    pub fn id(&self) -> Option<NodeId> {
        self.node.as_ref().map(Node::id)
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn children(&self) -> &[Branch] {
        &self.children
    }

    fn sync(&mut self, scope: &Scope, config: &BranchConfig, report: &mut SyncReport) {
        if self.level.digest(scope) {
            report.changed_levels += 1;
        }
        let state = self.level.state();

        // a record listed twice renders twice; its branches are reused in order
        let mut previous: HashMap<NodeId, VecDeque<Branch>> = HashMap::new();
        for branch in self.children.drain(..) {
            if let Some(id) = branch.id() {
                previous.entry(id).or_default().push_back(branch);
            }
        }

        for node in self.level.nodes() {
            let id = node.id();
            let reused = previous.get_mut(&id).and_then(VecDeque::pop_front);
            let mut branch = match reused {
                Some(branch) => branch,
                None => {
                    report.added.push(id);
                    Branch {
                        node: Some(node.clone()),
                        level: Level::new(config.expression.clone(), config.branch.clone(), state),
                        children: Vec::new(),
                    }
                }
            };
            branch.level.set_parent_state(state);
            branch.sync(&Scope::for_node(&config.node_name, node), config, report);
            self.children.push(branch);
        }

        for branch in previous.into_values().flatten() {
            branch.collect_ids(&mut report.removed);
        }
    }

    fn collect_ids(&self, ids: &mut Vec<NodeId>) {
        ids.extend(self.id());
        for child in &self.children {
            child.collect_ids(ids);
        }
    }

    fn find(&self, id: NodeId) -> Option<&Branch> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn find_parent_mut(&mut self, id: NodeId) -> Option<&mut Branch> {
        if self.children.iter().any(|child| child.id() == Some(id)) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_parent_mut(id))
    }

    fn find_path(&self, id: NodeId, path: &mut Vec<NodeId>) -> bool {
        for child in &self.children {
            if let Some(child_id) = child.id() {
                path.push(child_id);
                if child_id == id || child.find_path(id, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    fn flatten(&self, depth: usize, expansion: &ExpansionState, rows: &mut Vec<Row>) {
        for child in &self.children {
            let Some(node) = child.node.clone() else {
                continue;
            };
            let id = node.id();
            let has_children = !child.level.is_empty();
            let is_expanded = expansion.is_expanded(id);

            rows.push(Row {
                id,
                node,
                depth,
                has_children,
                is_expanded,
            });

            if is_expanded && has_children {
                child.flatten(depth + 1, expansion, rows);
            }
        }
    }

    fn walk<F>(&self, depth: usize, visit: &mut F)
    where
        F: FnMut(&Branch, usize),
    {
        for child in &self.children {
            visit(child, depth);
            child.walk(depth + 1, visit);
        }
    }
}

/// A root level and all of its branches.
#[derive(Debug)]
pub struct Tree {
    config: BranchConfig,
    root: Branch,
}

impl Tree {
    /// A tree whose root watches `source`, with default branch options.
    pub fn new(expression: ParsedExpression, source: impl Into<NodeSource>) -> Self {
        let options = TreeOptions::for_expression(&expression);
        Tree::with_options(expression, source, options)
    }

    pub fn with_options(
        expression: ParsedExpression,
        source: impl Into<NodeSource>,
        options: TreeOptions,
    ) -> Self {
        let expression = Rc::new(expression);
        let root = Branch {
            node: None,
            level: Level::root(expression.clone(), source),
            children: Vec::new(),
        };
        Tree {
            config: BranchConfig {
                expression,
                branch: options.branch.resolve(),
                node_name: options.node_name,
            },
            root,
        }
    }

    /// A tree whose root watches the base expression of `expression`.
    pub fn from_expression(expression: ParsedExpression) -> Self {
        let source = NodeSource::path(expression.base_expression());
        Tree::new(expression, source)
    }

    pub fn expression(&self) -> &ParsedExpression {
        &self.config.expression
    }

    pub fn root(&self) -> &Branch {
        &self.root
    }

    /// Change detection over the whole tree.
    pub fn sync(&mut self, scope: &Scope) -> SyncReport {
        let mut report = SyncReport::default();
        self.root.sync(scope, &self.config, &mut report);
        if report.changed_levels > 0 {
            debug!(
                changed_levels = report.changed_levels,
                added = report.added.len(),
                removed = report.removed.len(),
                "tree synced"
            );
        }
        report
    }

    /// The branch rendered under node `id`.
    pub fn find(&self, id: NodeId) -> Option<&Branch> {
        self.root.find(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.find(id).and_then(Branch::node)
    }

    /// The ids from the top level down to `id`, `id` included.
    pub fn path_to(&self, id: NodeId) -> Option<Vec<NodeId>> {
        let mut path = Vec::new();
        self.root.find_path(id, &mut path).then_some(path)
    }

    /// Remove an item from the flat level rendering it and write the change back
    /// to the owning group.
    ///
    /// Returns the ids of the dropped branch (the node and its descendants), or
    /// `None` if `id` is not an item of a flat level.
    pub fn remove(&mut self, id: NodeId) -> Option<(Item, Vec<NodeId>)> {
        let parent = self.root.find_parent_mut(id)?;
        let item = parent.level.remove(id)?;
        parent.level.write_back();

        let mut removed = Vec::new();
        if let Some(position) = parent
            .children
            .iter()
            .position(|child| child.id() == Some(id))
        {
            parent.children.remove(position).collect_ids(&mut removed);
        }
        Some((item, removed))
    }

    /// Depth-first flattening of the visible tree.
    pub fn rows(&self, expansion: &ExpansionState) -> Vec<Row> {
        let mut rows = Vec::new();
        self.root.flatten(0, expansion, &mut rows);
        rows
    }

    /// Visit every branch depth-first, with its depth (top level is 0).
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Branch, usize),
    {
        self.root.walk(0, &mut visit);
    }

    /// Ids of every rendered node, depth-first.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.walk(|branch, _| ids.extend(branch.id()));
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parse;
    use crate::grouping::Group;
    use serde_json::json;

    fn scope() -> Scope {
        let mut scope = Scope::new();
        scope.set_items(
            "nodes",
            Item::collect(vec![
                json!({"title": "A", "type": "type1", "children": [
                    {"title": "Aa", "type": "type2", "children": [{"title": "Aaa"}]},
                    {"title": "Ab", "type": "type2"}
                ]}),
                json!({"title": "B", "type": "type1", "children": [
                    {"title": "Ba", "type": "type2", "children": [{"title": "Baa"}]},
                    {"title": "Bb", "type": "type3"}
                ]}),
            ]),
        );
        scope
    }

    #[test]
    fn test_ungrouped_tree_mirrors_nesting() {
        let mut tree = Tree::from_expression(parse("nodes").unwrap());
        let report = tree.sync(&scope());

        let top = tree.root().children();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].children().len(), 2);
        assert_eq!(top[0].children()[0].children().len(), 1);
        assert_eq!(report.added.len(), 8);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_grouping_alternates_by_depth() {
        let mut tree = Tree::from_expression(parse("nodes group by type").unwrap());
        tree.sync(&scope());

        let root = tree.root();
        assert_eq!(root.level().state(), LevelState::Grouped);
        assert_eq!(root.children().len(), 1);

        // type1 group -> A, B
        let group = &root.children()[0];
        assert!(group.node().unwrap().is_group());
        assert_eq!(group.level().state(), LevelState::Flat);
        assert_eq!(group.children().len(), 2);

        // A's children grouped again: type2 -> Aa, Ab
        let a = &group.children()[0];
        assert_eq!(a.level().state(), LevelState::Grouped);
        assert_eq!(a.children().len(), 1);

        // B's children: type2 -> Ba, type3 -> Bb
        let b = &group.children()[1];
        assert_eq!(b.children().len(), 2);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut tree = Tree::from_expression(parse("nodes group by type").unwrap());
        let scope = scope();
        tree.sync(&scope);
        let ids = tree.ids();

        let report = tree.sync(&scope);
        assert_eq!(report, SyncReport::default());
        assert_eq!(tree.ids(), ids);
    }

    #[test]
    fn test_removed_nodes_are_reported() {
        let mut tree = Tree::from_expression(parse("nodes").unwrap());
        let mut scope = scope();
        tree.sync(&scope);
        let first = tree.root().children()[0].id().unwrap();

        scope.items_mut("nodes").unwrap().remove(0);
        let report = tree.sync(&scope);

        // A, Aa, Aaa, Ab
        assert_eq!(report.removed.len(), 4);
        assert_eq!(report.removed[0], first);
        assert!(tree.find(first).is_none());
    }

    #[test]
    fn test_new_group_keeps_existing_branches() {
        let mut tree = Tree::from_expression(parse("nodes group by type").unwrap());
        let mut scope = scope();
        tree.sync(&scope);
        let group_id = tree.root().children()[0].id().unwrap();

        scope
            .items_mut("nodes")
            .unwrap()
            .push(Item::new(json!({"title": "C", "type": "type9"})));
        let report = tree.sync(&scope);

        let top = tree.root().children();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id(), Some(group_id));
        assert_eq!(report.added.len(), 2); // the type9 group and C
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_rows_follow_expansion() {
        let mut tree = Tree::from_expression(parse("nodes group by type").unwrap());
        tree.sync(&scope());
        let mut expansion = ExpansionState::new();

        let rows = tree.rows(&expansion);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].has_children);
        assert!(!rows[0].is_expanded);

        expansion.expand(rows[0].id);
        let rows = tree.rows(&expansion);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[1].node.as_item().unwrap().get("title"), Some(&json!("A")));
    }

    #[test]
    fn test_path_to() {
        let mut tree = Tree::from_expression(parse("nodes group by type").unwrap());
        tree.sync(&scope());

        let group = tree.root().children()[0].id().unwrap();
        let b = tree.root().children()[0].children()[1].id().unwrap();
        assert_eq!(tree.path_to(b), Some(vec![group, b]));
    }

    #[test]
    fn test_remove_writes_back_to_group() {
        let mut tree = Tree::from_expression(parse("nodes group by type").unwrap());
        let scope = scope();
        tree.sync(&scope);

        let group = tree.root().children()[0]
            .node()
            .and_then(Node::as_group)
            .cloned()
            .unwrap();
        let a = tree.root().children()[0].children()[0].id().unwrap();

        let (_, removed) = tree.remove(a).unwrap();
        assert_eq!(removed[0], a);
        assert_eq!(group.len(), 1);
        let rendered = tree.root().level().grouping().groups().unwrap()[0].clone();
        assert!(Group::ptr_eq(&rendered, &group));

        let report = tree.sync(&scope);
        assert!(report.removed.is_empty());
        assert_eq!(tree.root().children()[0].children().len(), 1);
    }

    #[test]
    fn test_remove_rejects_groups() {
        let mut tree = Tree::from_expression(parse("nodes group by type").unwrap());
        tree.sync(&scope());

        let group = tree.root().children()[0].id().unwrap();
        assert!(tree.remove(group).is_none());
    }

    #[test]
    fn test_custom_branch_options() {
        let options = TreeOptions {
            branch: NodeSource::path("parent.children"),
            node_name: "parent".to_string(),
        };
        let mut tree = Tree::with_options(parse("nodes").unwrap(), "nodes", options);
        tree.sync(&scope());
        assert_eq!(tree.root().children()[0].children().len(), 2);
    }

    #[test]
    fn test_duplicate_records_keep_their_branches() {
        let item = Item::new(json!({"title": "A", "children": [{"title": "Aa"}]}));
        let mut scope = Scope::new();
        scope.set_items("nodes", vec![item.clone(), item]);

        let mut tree = Tree::from_expression(parse("nodes").unwrap());
        let report = tree.sync(&scope);
        assert_eq!(report.added.len(), 4);
        assert_eq!(tree.root().children().len(), 2);
        assert_eq!(tree.root().children()[1].children().len(), 1);

        let report = tree.sync(&scope);
        assert_eq!(report, SyncReport::default());
        assert_eq!(tree.root().children().len(), 2);
    }
}
