//! Standalone binary for the treemendous interactive viewer.
//! Usage:
//!   treev `<data.json>` [--nodes `<expression>`] [--select-mode none|single|active|multi]

mod viewer;

use clap::{Arg, ArgMatches, Command, ValueHint};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use treemendous_config::{Loader, TreemendousConfig};

fn main() {
    let matches = Command::new("treev")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interactive terminal viewer for grouped JSON trees")
        .arg(
            Arg::new("path")
                .help("Path to the JSON data file to open")
                .required(true)
                .index(1)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("nodes")
                .long("nodes")
                .short('n')
                .help("Tree expression, e.g. 'nodes group by type as items'"),
        )
        .arg(
            Arg::new("select-mode")
                .long("select-mode")
                .short('s')
                .help("Selection mode")
                .value_parser(["none", "single", "active", "multi"]),
        )
        .arg(
            Arg::new("label")
                .long("label")
                .short('l')
                .help("Item property used as the node label"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write logs to this file (the viewer logs nothing otherwise)")
                .value_hint(ValueHint::FilePath),
        )
        .get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    let _guard = matches
        .get_one::<String>("log-file")
        .map(|path| init_logging(Path::new(path), &config.logging.level));

    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    if let Err(err) = viewer::viewer_main::run_viewer(PathBuf::from(path), &config) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn load_config(matches: &ArgMatches) -> Result<TreemendousConfig, Box<dyn std::error::Error>> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    loader = loader.with_env();

    let overrides = [
        ("nodes", "tree.nodes"),
        ("select-mode", "tree.select_mode"),
        ("label", "render.label_field"),
    ];
    for (arg, key) in overrides {
        if let Some(value) = matches.get_one::<String>(arg) {
            loader = loader.set_override(key, value.as_str())?;
        }
    }
    Ok(loader.build()?)
}

/// Logs go to `path` only; the terminal belongs to the UI.
fn init_logging(path: &Path, level: &str) -> WorkerGuard {
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "treev.log".to_string());
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    let default_filter = format!(
        "treemendous={level},treemendous_config={level},treemendous_viewer={level}"
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    guard
}
