//! Shared configuration loader for the treemendous tools.
//!
//! `defaults/treemendous.default.toml` is embedded into every binary so that
//! docs and runtime behavior stay in sync. Applications layer user files,
//! environment variables and command line overrides on top of those defaults
//! via [`Loader`] before deserializing into [`TreemendousConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use treemendous::tree::TreeOptions;
use treemendous::{NodeSource, ParsedExpression, SelectMode};

const DEFAULT_TOML: &str = include_str!("../defaults/treemendous.default.toml");

/// Prefix of the environment variables read by [`Loader::with_env`]:
/// `TREEMENDOUS__TREE__NODES` overrides `tree.nodes`.
pub const ENV_PREFIX: &str = "TREEMENDOUS";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration consumed by the treemendous binaries.
#[derive(Debug, Clone, Deserialize)]
pub struct TreemendousConfig {
    pub tree: TreeConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

/// What to render and how branches find their members.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeConfig {
    pub nodes: ParsedExpression,
    #[serde(default)]
    pub branch: Option<String>,
    pub node_name: String,
    pub select_mode: SelectMode,
}

impl TreeConfig {
    /// Branch options for a [`treemendous::Tree`].
    pub fn tree_options(&self) -> TreeOptions {
        let branch = match &self.branch {
            Some(branch) => branch.clone(),
            None => format!("{}.{}", self.node_name, self.nodes.children_field()),
        };
        TreeOptions {
            branch: NodeSource::path(branch),
            node_name: self.node_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub label_field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Tree,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub level: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `TREEMENDOUS__*` variables from the process environment.
    pub fn with_env(mut self) -> Self {
        self.builder = self.builder.add_source(environment());
        self
    }

    /// Layer `TREEMENDOUS__*` variables from `vars` instead of the process
    /// environment.
    pub fn with_env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.builder = self.builder.add_source(environment().source(Some(vars)));
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<TreemendousConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR)
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<TreemendousConfig, ConfigError> {
    Loader::new().build()
}
