//! UI rendering logic
//!
//! Layout structure:
//! - Title bar (1 line, fixed)
//! - Middle section (responsive height):
//!   - Tree viewer (60% of the width)
//!   - Detail viewer (remaining space)
//! - Status line (1 line, fixed)

use super::app::App;
use super::model::Focus;
use super::viewer::Viewer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use treemendous::Outcome;

/// Minimum terminal width required for the UI
const MIN_TERMINAL_WIDTH: u16 = 50;
/// Share of the width given to the tree viewer
const TREE_VIEWER_PERCENT: u16 = 60;
/// Height of the status line
const STATUS_LINE_HEIGHT: u16 = 1;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App, file_name: &str) {
    let size = frame.area();

    if size.width < MIN_TERMINAL_WIDTH {
        render_error_too_narrow(frame, size);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(STATUS_LINE_HEIGHT),
        ])
        .split(size);

    render_title_bar(frame, chunks[0], app, file_name);
    render_middle_section(frame, chunks[1], app);
    render_status_line(frame, chunks[2], app);
}

fn render_error_too_narrow(frame: &mut Frame, area: Rect) {
    let msg = format!(
        "Terminal too narrow: {} < {} chars",
        area.width, MIN_TERMINAL_WIDTH
    );
    let paragraph =
        Paragraph::new(msg).style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
    frame.render_widget(paragraph, area);
}

fn render_title_bar(frame: &mut Frame, area: Rect, app: &App, file_name: &str) {
    let title = format!("treemendous:: {} | {}", file_name, app.model.expression());
    let paragraph = Paragraph::new(title).style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(paragraph, area);
}

fn render_middle_section(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(TREE_VIEWER_PERCENT),
            Constraint::Min(1),
        ])
        .split(area);

    render_panel(frame, chunks[0], "Tree", app.focus == Focus::TreeViewer, |frame, inner| {
        app.tree_viewer.render(frame, inner, &app.model)
    });
    render_panel(frame, chunks[1], "Detail", app.focus == Focus::DetailViewer, |frame, inner| {
        app.detail_viewer.render(frame, inner, &app.model)
    });
}

fn render_panel<F>(frame: &mut Frame, area: Rect, name: &str, focused: bool, content: F)
where
    F: FnOnce(&mut Frame, Rect),
{
    let title = if focused {
        format!("{} [FOCUSED]", name)
    } else {
        name.to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner_area = block.inner(area);
    frame.render_widget(block, area);
    content(frame, inner_area);
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Selected => "Selected",
        Outcome::Deselected => "Deselected",
        Outcome::Expanded => "Expanded",
        Outcome::Collapsed => "Collapsed",
        Outcome::Ignored => "Ignored",
    }
}

fn render_status_line(frame: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Yellow);
    let model = &app.model;

    let mut spans = vec![
        Span::styled("Mode: ", label),
        Span::raw(model.select_mode().to_string()),
        Span::raw(" | "),
        Span::styled("Selected: ", label),
        Span::raw(model.selected_count().to_string()),
    ];

    if let Some(id) = model.cursor() {
        let depth = model.path(id).map_or(0, |path| path.len());
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("Depth: ", label));
        spans.push(Span::raw(depth.to_string()));
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("State: ", label));
        spans.push(Span::raw(if model.is_node_expanded(id) {
            "Expanded"
        } else {
            "Collapsed"
        }));
    }

    if let Some(outcome) = model.last_outcome() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("Last: ", label));
        spans.push(Span::raw(outcome_label(outcome)));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(TREE_VIEWER_PERCENT, 60);
        assert_eq!(STATUS_LINE_HEIGHT, 1);
        assert_eq!(MIN_TERMINAL_WIDTH, 50);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(Outcome::Selected), "Selected");
        assert_eq!(outcome_label(Outcome::Ignored), "Ignored");
    }
}
