//! Viewer trait and event types
//!
//! A viewer renders itself from the [`Model`] and turns key presses into
//! [`ViewerEvent`]s. The [`App`](super::app::App) applies the events, so
//! viewers never mutate the model directly.

use super::model::Model;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;
use treemendous::NodeId;

/// Model changes requested by a viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    /// Move the cursor to a node
    MoveCursor(NodeId),
    /// Single click: selection
    Click(NodeId),
    /// Double click: expansion
    DoubleClick(NodeId),
    Expand(NodeId),
    Collapse(NodeId),
    /// Remove the node from the level rendering it
    Remove(NodeId),
    /// No change to model
    NoChange,
}

pub trait Viewer {
    /// Render this viewer to the given area
    fn render(&self, frame: &mut Frame, area: Rect, model: &Model);

    /// Handle a keyboard event and return the resulting event
    fn handle_key(&mut self, key: KeyEvent, model: &Model) -> Option<ViewerEvent>;
}
