//! Terminal setup and the event loop
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use treemendous::data::load_scope;
use treemendous::{NodeSource, Tree};
use treemendous_config::TreemendousConfig;

use super::app::App;
use super::model::Model;
use super::ui;

/// Run the viewer for the given data file
pub fn run_viewer(file_path: PathBuf, config: &TreemendousConfig) -> io::Result<()> {
    let scope = load_scope(&file_path)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    let expression = config.tree.nodes.clone();
    let source = NodeSource::path(expression.base_expression());
    let tree = Tree::with_options(expression, source, config.tree.tree_options());
    let model = Model::new(
        tree,
        &scope,
        config.tree.select_mode,
        config.render.label_field.clone(),
    );
    let mut app = App::new(model);
    info!(file = file_name.as_str(), "viewer started");

    enable_raw_mode()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, &file_name);

    disable_raw_mode()?;
    terminal.clear()?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    file_name: &str,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app, file_name))?;

        if event::poll(Duration::from_millis(100))? {
            // resizes are picked up by the next draw
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
