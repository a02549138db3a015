//! Loading host data into a [`Scope`]
//!
//! A JSON document is bound the way a host page would expose it: a top-level
//! array becomes the `nodes` collection; a top-level object binds each of its
//! array fields under the field's own name.

use crate::item::Item;
use crate::source::Scope;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name a top-level array is bound under.
pub const DEFAULT_COLLECTION: &str = "nodes";

#[derive(Debug)]
pub enum DataError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    /// The document is neither an array nor an object
    Shape(&'static str),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            DataError::Json(err) => write!(f, "Invalid JSON: {}", err),
            DataError::Shape(kind) => write!(
                f,
                "Expected a JSON array or an object of arrays, found {}",
                kind
            ),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Io { source, .. } => Some(source),
            DataError::Json(err) => Some(err),
            DataError::Shape(_) => None,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Json(err)
    }
}

/// Bind a parsed JSON document.
pub fn scope_from_json(document: Value) -> Result<Scope, DataError> {
    let mut scope = Scope::new();
    match document {
        Value::Array(values) => {
            debug!(members = values.len(), "binding top-level array");
            scope.set_items(DEFAULT_COLLECTION, Item::collect(values));
        }
        Value::Object(fields) => {
            for (name, field) in fields {
                if let Value::Array(values) = field {
                    debug!(name = name.as_str(), members = values.len(), "binding collection");
                    scope.set_items(&name, Item::collect(values));
                }
            }
        }
        Value::Null => return Err(DataError::Shape("null")),
        Value::Bool(_) => return Err(DataError::Shape("a boolean")),
        Value::Number(_) => return Err(DataError::Shape("a number")),
        Value::String(_) => return Err(DataError::Shape("a string")),
    }
    Ok(scope)
}

pub fn scope_from_str(text: &str) -> Result<Scope, DataError> {
    scope_from_json(serde_json::from_str(text)?)
}

/// Read and bind a JSON file.
pub fn load_scope(path: impl AsRef<Path>) -> Result<Scope, DataError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    scope_from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Binding;

    #[test]
    fn test_array_is_bound_as_nodes() {
        let scope = scope_from_str(r#"[{"name": "a"}, {"name": "b"}]"#).unwrap();
        assert_eq!(scope.lookup("nodes").items.len(), 2);
    }

    #[test]
    fn test_object_binds_array_fields() {
        let scope = scope_from_str(r#"{"people": [{"name": "a"}], "title": "x", "pets": []}"#)
            .unwrap();
        assert_eq!(scope.lookup("people").items.len(), 1);
        assert!(matches!(scope.get("pets"), Some(Binding::Items(items)) if items.is_empty()));
        assert!(scope.get("title").is_none());
    }

    #[test]
    fn test_scalars_are_rejected() {
        let err = scope_from_str("42").unwrap_err();
        assert!(matches!(err, DataError::Shape("a number")));
        assert_eq!(
            err.to_string(),
            "Expected a JSON array or an object of arrays, found a number"
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(scope_from_str("[1,"), Err(DataError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_scope("/nonexistent/data.json").unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert!(err.to_string().starts_with("Failed to read /nonexistent/data.json"));
    }
}
