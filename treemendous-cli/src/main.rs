//! Command-line interface for treemendous
//! Renders a JSON document as a tree, grouped according to a tree expression.
//!
//! Usage:
//!   treemendous `<data.json>` [--nodes `<expression>`] [--format tree|json|yaml]
//!   treemendous --nodes `<expression>` --parse-only     - Show how an expression parses

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use treemendous::data::load_scope;
use treemendous::render::{to_json, to_treeviz_str};
use treemendous::{NodeSource, ParsedExpression, Tree};
use treemendous_config::{Loader, OutputFormat, TreemendousConfig};

fn main() {
    let matches = Command::new("treemendous")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render JSON data as a tree, grouped by a tree expression")
        .arg_required_else_help(true)
        .arg(
            Arg::new("data")
                .help("Path to the JSON data file")
                .required_unless_present("parse-only")
                .index(1),
        )
        .arg(
            Arg::new("nodes")
                .long("nodes")
                .short('n')
                .help("Tree expression, e.g. 'nodes group by type as items'"),
        )
        .arg(
            Arg::new("branch")
                .long("branch")
                .short('b')
                .help("Path branches read their members from (default: node.<children field>)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format")
                .value_parser(["tree", "json", "yaml"]),
        )
        .arg(
            Arg::new("label")
                .long("label")
                .short('l')
                .help("Item property used as the node label in tree output"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("parse-only")
                .long("parse-only")
                .help("Print the parsed tree expression and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });
    init_logging(&config.logging.level);

    if matches.get_flag("parse-only") {
        handle_parse_only(&config.tree.nodes);
        return;
    }

    let path = matches
        .get_one::<String>("data")
        .expect("data is required unless parsing only");
    handle_render_command(path, &config);
}

/// Defaults, then the user file, then the environment, then the flags.
fn load_config(matches: &ArgMatches) -> Result<TreemendousConfig, Box<dyn std::error::Error>> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    loader = loader.with_env();

    let overrides = [
        ("nodes", "tree.nodes"),
        ("branch", "tree.branch"),
        ("format", "render.format"),
        ("label", "render.label_field"),
    ];
    for (arg, key) in overrides {
        if let Some(value) = matches.get_one::<String>(arg) {
            loader = loader.set_override(key, value.as_str())?;
        }
    }
    Ok(loader.build()?)
}

/// Logs go to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let default_filter = format!("treemendous={},treemendous_config={}", level, level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn handle_parse_only(expression: &ParsedExpression) {
    println!("base: {}", expression.base_expression());
    println!("group key: {}", expression.group_key().unwrap_or("(none)"));
    println!("children field: {}", expression.children_field());
}

fn handle_render_command(path: &str, config: &TreemendousConfig) {
    let scope = load_scope(path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let expression = config.tree.nodes.clone();
    let source = NodeSource::path(expression.base_expression());
    let mut tree = Tree::with_options(expression, source, config.tree.tree_options());
    let report = tree.sync(&scope);
    info!(nodes = report.added.len(), "rendered {}", path);

    let formatted = match config.render.format {
        OutputFormat::Tree => to_treeviz_str(&tree, &config.render.label_field),
        OutputFormat::Json => serde_json::to_string_pretty(&to_json(&tree)).unwrap_or_else(|e| {
            eprintln!("Error formatting JSON: {}", e);
            std::process::exit(1);
        }),
        OutputFormat::Yaml => serde_yaml::to_string(&to_json(&tree)).unwrap_or_else(|e| {
            eprintln!("Error formatting YAML: {}", e);
            std::process::exit(1);
        }),
    };
    debug!(bytes = formatted.len(), "writing output");

    if formatted.ends_with('\n') {
        print!("{}", formatted);
    } else {
        println!("{}", formatted);
    }
}
