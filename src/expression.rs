//! Tree expression grammar
//!
//! A tree is configured with a single expression string:
//!
//! ```text
//! nodes
//! nodes group by type
//! nodes | filter:f group by type as items
//! ```
//!
//! The leading part (the *base expression*) names the source collection and is
//! handed to whatever evaluates collections, unexamined. The optional trailing
//! `group by <key> (as <field>)?` clause turns on grouping: members are bucketed
//! by `key` into synthetic group records that store them under `field`
//! (`children` unless stated otherwise).
//!
//! The base expression is matched lazily, so the rightmost trailing clause that
//! parses wins. When no clause parses, the whole string is the base expression
//! and grouping stays off.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field name used for group members when the expression has no `as` clause.
pub const DEFAULT_CHILDREN_FIELD: &str = "children";

/// Captures: 1 = base expression, 2 = group key, 3 = children field
static EXPRESSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^(.+?)(?:\s+group\s+by\s+([A-Za-z_$][A-Za-z0-9_$]*)(?:\s+as\s+([A-Za-z_$][A-Za-z0-9_$]*))?)?$",
    )
    .expect("tree expression grammar must compile")
});

/// Raised when a configuration string cannot be split into a base expression
/// and an optional grouping clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedExpression {
    expression: String,
}

impl MalformedExpression {
    /// The string that failed to parse.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for MalformedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected expression in the form of '_nodes_ (group by _property_ (as _children_)?)?' but got '{}'",
            self.expression
        )
    }
}

impl std::error::Error for MalformedExpression {}

/// A parsed tree expression.
///
/// Serializes to (and deserializes from) its canonical string form, so
/// configuration files can carry expressions as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParsedExpression {
    base_expression: String,
    group_key: Option<String>,
    children_field: String,
}

impl ParsedExpression {
    /// The opaque expression naming the source collection.
    pub fn base_expression(&self) -> &str {
        &self.base_expression
    }

    /// Property to group by, if grouping is on.
    pub fn group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    /// Property under which group records keep their members.
    pub fn children_field(&self) -> &str {
        &self.children_field
    }

    pub fn is_grouped(&self) -> bool {
        self.group_key.is_some()
    }
}

/// Parse a tree expression.
///
/// Surrounding whitespace is ignored. Fails only for input with no base
/// expression at all.
pub fn parse(expression: &str) -> Result<ParsedExpression, MalformedExpression> {
    let malformed = || MalformedExpression {
        expression: expression.to_string(),
    };

    let captures = EXPRESSION_REGEX
        .captures(expression.trim())
        .ok_or_else(malformed)?;
    let base = captures.get(1).ok_or_else(malformed)?.as_str();

    Ok(ParsedExpression {
        base_expression: base.to_string(),
        group_key: captures.get(2).map(|m| m.as_str().to_string()),
        children_field: captures
            .get(3)
            .map_or(DEFAULT_CHILDREN_FIELD, |m| m.as_str())
            .to_string(),
    })
}

impl FromStr for ParsedExpression {
    type Err = MalformedExpression;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<String> for ParsedExpression {
    type Error = MalformedExpression;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}

impl From<ParsedExpression> for String {
    fn from(expression: ParsedExpression) -> Self {
        expression.to_string()
    }
}

impl fmt::Display for ParsedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_expression)?;
        if let Some(key) = &self.group_key {
            write!(f, " group by {}", key)?;
            if self.children_field != DEFAULT_CHILDREN_FIELD {
                write!(f, " as {}", self.children_field)?;
            }
        }
        Ok(())
    }
}
