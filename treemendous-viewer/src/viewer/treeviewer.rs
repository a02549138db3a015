//! Tree viewer - displays and navigates the grouped tree
//!
//! One line per visible node: selection marker, indentation, expander, icon
//! and label. Arrow keys move the cursor and expand/collapse, space clicks
//! (selects), enter double-clicks (expands), `d` removes the node.

use super::model::{FlattenedTreeNode, Model};
use super::viewer::{Viewer, ViewerEvent};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use treemendous::NodeId;

#[derive(Debug, Default)]
pub struct TreeViewer;

impl TreeViewer {
    pub fn new() -> Self {
        TreeViewer
    }

    /// The visible node after `current`, if any.
    pub fn get_next_visible_node(&self, current: NodeId, model: &Model) -> Option<NodeId> {
        let flattened = model.flattened_tree();
        let index = flattened.iter().position(|n| n.node_id == current)?;
        flattened.get(index + 1).map(|n| n.node_id)
    }

    /// The visible node before `current`, if any.
    pub fn get_previous_visible_node(&self, current: NodeId, model: &Model) -> Option<NodeId> {
        let flattened = model.flattened_tree();
        let index = flattened.iter().position(|n| n.node_id == current)?;
        index.checked_sub(1).map(|prev| flattened[prev].node_id)
    }
}

/// First visible row so that the cursor row stays on screen.
pub fn scroll_offset(cursor_index: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    cursor_index.saturating_sub(height - 1)
}

fn expander(node: &FlattenedTreeNode) -> &'static str {
    match (node.has_children, node.is_expanded) {
        (false, _) => "  ",
        (true, true) => "▾ ",
        (true, false) => "▸ ",
    }
}

fn line_text(node: &FlattenedTreeNode, width: usize) -> String {
    let marker = if node.is_selected { "✓" } else { " " };
    let prefix = format!("{}{}{}{} ", marker, "  ".repeat(node.depth), expander(node), node.icon);
    let label_max_width = width.saturating_sub(prefix.chars().count());
    let label: String = node.label.chars().take(label_max_width).collect();
    format!("{}{}", prefix, label)
}

impl Viewer for TreeViewer {
    fn render(&self, frame: &mut Frame, area: Rect, model: &Model) {
        let flattened = model.flattened_tree();
        let cursor = model.cursor();
        let cursor_index = flattened
            .iter()
            .position(|n| Some(n.node_id) == cursor)
            .unwrap_or(0);
        let offset = scroll_offset(cursor_index, area.height as usize);

        let lines: Vec<Line> = flattened
            .iter()
            .skip(offset)
            .take(area.height as usize)
            .map(|node| {
                let text = line_text(node, area.width as usize);
                let is_collapsed = !node.is_expanded && node.has_children;

                let mut style = Style::default();
                if node.is_selected {
                    style = style.fg(Color::Yellow);
                }
                if node.is_active {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                if Some(node.node_id) == cursor {
                    style = style.bg(Color::Blue).add_modifier(Modifier::BOLD);
                } else if is_collapsed && !node.is_selected {
                    style = style.fg(Color::Gray).add_modifier(Modifier::DIM);
                }
                Line::from(text).style(style)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn handle_key(&mut self, key: KeyEvent, model: &Model) -> Option<ViewerEvent> {
        let Some(current) = model.cursor() else {
            return Some(ViewerEvent::NoChange);
        };

        let event = match key.code {
            KeyCode::Up => self
                .get_previous_visible_node(current, model)
                .map_or(ViewerEvent::NoChange, ViewerEvent::MoveCursor),
            KeyCode::Down => self
                .get_next_visible_node(current, model)
                .map_or(ViewerEvent::NoChange, ViewerEvent::MoveCursor),
            KeyCode::Right => ViewerEvent::Expand(current),
            KeyCode::Left => ViewerEvent::Collapse(current),
            KeyCode::Char(' ') => ViewerEvent::Click(current),
            KeyCode::Enter => ViewerEvent::DoubleClick(current),
            KeyCode::Char('d') => ViewerEvent::Remove(current),
            _ => ViewerEvent::NoChange,
        };
        Some(event)
    }
}
