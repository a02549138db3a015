//! Main application state and event handling
//!
//! The App brings together the model, the two viewers and focus management.
//! Global keys (quit, focus switching) are handled here; everything else goes
//! to the focused viewer, whose events are then applied to the model.

use super::detailviewer::DetailViewer;
use super::model::{Focus, Model};
use super::treeviewer::TreeViewer;
use super::viewer::{Viewer, ViewerEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tracing::debug;

pub struct App {
    pub model: Model,
    pub tree_viewer: TreeViewer,
    pub detail_viewer: DetailViewer,
    pub focus: Focus,
    pub should_quit: bool,
}

impl App {
    pub fn new(model: Model) -> Self {
        App {
            model,
            tree_viewer: TreeViewer::new(),
            detail_viewer: DetailViewer::new(),
            focus: Focus::default(),
            should_quit: false,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggle();
    }

    /// Handle a keyboard event
    ///
    /// Returns whether the model changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => {
                self.should_quit = true;
                return true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return true;
            }
            KeyCode::Tab => {
                self.toggle_focus();
                return true;
            }
            _ => {}
        }

        let event = match self.focus {
            Focus::TreeViewer => self.tree_viewer.handle_key(key, &self.model),
            Focus::DetailViewer => self.detail_viewer.handle_key(key, &self.model),
        };
        match event {
            Some(event) => self.process_viewer_event(event),
            None => false,
        }
    }

    fn process_viewer_event(&mut self, event: ViewerEvent) -> bool {
        match event {
            ViewerEvent::MoveCursor(id) => {
                self.model.move_cursor(id);
                self.detail_viewer.reset_scroll();
                true
            }
            ViewerEvent::Click(id) => {
                let outcome = self.model.click(id, Instant::now());
                debug!(node = %id, ?outcome, "click");
                true
            }
            ViewerEvent::DoubleClick(id) => {
                let outcome = self.model.double_click(id);
                debug!(node = %id, ?outcome, "double click");
                true
            }
            ViewerEvent::Expand(id) => {
                self.model.expand(id);
                true
            }
            ViewerEvent::Collapse(id) => {
                self.model.collapse(id);
                true
            }
            ViewerEvent::Remove(id) => {
                let removed = self.model.remove(id);
                if removed {
                    self.detail_viewer.reset_scroll();
                }
                removed
            }
            ViewerEvent::NoChange => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treemendous::data::scope_from_str;
    use treemendous::{parse, SelectMode, Tree};

    fn app() -> App {
        let scope = scope_from_str(r#"[{"name": "a", "type": "X"}]"#).unwrap();
        let tree = Tree::from_expression(parse("nodes group by type").unwrap());
        App::new(Model::new(tree, &scope, SelectMode::Single, "name"))
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert_eq!(app.focus, Focus::TreeViewer);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_focus_toggle() {
        let mut app = app();
        app.toggle_focus();
        assert_eq!(app.focus, Focus::DetailViewer);
        app.toggle_focus();
        assert_eq!(app.focus, Focus::TreeViewer);
    }

    #[test]
    fn test_focus_enum_toggle() {
        assert_eq!(Focus::TreeViewer.toggle(), Focus::DetailViewer);
        assert_eq!(Focus::DetailViewer.toggle(), Focus::TreeViewer);
    }

    #[test]
    fn test_quit_keys() {
        let mut quit_with_q = app();
        assert!(quit_with_q.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::empty())));
        assert!(quit_with_q.should_quit);

        let mut quit_with_ctrl_c = app();
        quit_with_ctrl_c.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(quit_with_ctrl_c.should_quit);
    }
}
