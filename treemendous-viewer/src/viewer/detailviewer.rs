//! Detail viewer - the record under the cursor as pretty-printed JSON
//!
//! Groups show their key and members, items their own data. Up/Down scroll
//! when the viewer has focus; moving the cursor resets the scroll.

use super::model::Model;
use super::viewer::{Viewer, ViewerEvent};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

#[derive(Debug, Default)]
pub struct DetailViewer {
    scroll_offset: usize,
}

impl DetailViewer {
    pub fn new() -> Self {
        DetailViewer { scroll_offset: 0 }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
    }

    /// Pretty-printed record of the node under the cursor.
    pub fn content(model: &Model) -> Vec<String> {
        let Some(node) = model.cursor().and_then(|id| model.node(id)) else {
            return vec!["(empty tree)".to_string()];
        };
        serde_json::to_string_pretty(&node.to_json())
            .unwrap_or_else(|e| format!("Error formatting JSON: {}", e))
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Viewer for DetailViewer {
    fn render(&self, frame: &mut Frame, area: Rect, model: &Model) {
        let lines: Vec<Line> = Self::content(model)
            .into_iter()
            .skip(self.scroll_offset())
            .map(|line| Line::from(line).style(Style::default().fg(Color::White)))
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn handle_key(&mut self, key: KeyEvent, model: &Model) -> Option<ViewerEvent> {
        match key.code {
            KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            KeyCode::Down => {
                let last = Self::content(model).len().saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + 1).min(last);
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use treemendous::data::scope_from_str;
    use treemendous::{parse, SelectMode, Tree};

    fn model(data: &str) -> Model {
        let scope = scope_from_str(data).unwrap();
        let tree = Tree::from_expression(parse("nodes group by type as items").unwrap());
        Model::new(tree, &scope, SelectMode::Single, "name")
    }

    #[test]
    fn test_content_shows_group_record() {
        let model = model(r#"[{"name": "a", "type": "X"}]"#);
        let content = DetailViewer::content(&model).join("\n");
        assert!(content.contains(r#""type": "X""#));
        assert!(content.contains(r#""items": ["#));
        assert!(content.contains(r#""name": "a""#));
    }

    #[test]
    fn test_empty_tree() {
        let model = model("[]");
        assert_eq!(DetailViewer::content(&model), vec!["(empty tree)"]);
    }

    #[test]
    fn test_scrolling_is_bounded() {
        let model = model(r#"[{"name": "a", "type": "X"}]"#);
        let mut viewer = DetailViewer::new();
        let up = KeyEvent::new(KeyCode::Up, KeyModifiers::empty());
        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::empty());

        viewer.handle_key(up, &model);
        assert_eq!(viewer.scroll_offset(), 0);

        for _ in 0..100 {
            viewer.handle_key(down, &model);
        }
        assert_eq!(
            viewer.scroll_offset(),
            DetailViewer::content(&model).len() - 1
        );

        viewer.reset_scroll();
        assert_eq!(viewer.scroll_offset(), 0);
    }
}
