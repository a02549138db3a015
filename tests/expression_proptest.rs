//! Property-based tests for tree expression parsing
//!
//! The grammar is `<nodes> [group by <key> [as <children>]]`, where `<nodes>`
//! is opaque text and `<key>`/`<children>` are identifiers.

use proptest::prelude::*;
use treemendous::expression::{parse, DEFAULT_CHILDREN_FIELD};

/// Identifiers the parser accepts as group keys and children fields
fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-zA-Z0-9_]{0,10}",
        "_[a-z0-9]{1,8}",
        "\\$[a-z]{1,8}",
    ]
}

/// Base expressions: a name, optionally piped through filters
fn base_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-zA-Z0-9]{0,10}",
        "[a-z]{1,8}\\.[a-z]{1,8}",
        "[a-z]{1,8} \\| filter:[a-z]{1,8}",
    ]
    .prop_filter("base must not mention the grouping keywords", |base| {
        !base.contains("group") && !base.contains(" as ")
    })
}

proptest! {
    #[test]
    fn test_full_form_round_trips(
        base in base_strategy(),
        key in identifier_strategy(),
        children in identifier_strategy(),
    ) {
        let text = format!("{} group by {} as {}", base, key, children);
        let parsed = parse(&text).unwrap();

        prop_assert_eq!(parsed.base_expression(), base.as_str());
        prop_assert_eq!(parsed.group_key(), Some(key.as_str()));
        prop_assert_eq!(parsed.children_field(), children.as_str());
    }

    #[test]
    fn test_children_field_defaults(base in base_strategy(), key in identifier_strategy()) {
        let parsed = parse(&format!("{} group by {}", base, key)).unwrap();

        prop_assert_eq!(parsed.base_expression(), base.as_str());
        prop_assert_eq!(parsed.group_key(), Some(key.as_str()));
        prop_assert_eq!(parsed.children_field(), DEFAULT_CHILDREN_FIELD);
    }

    #[test]
    fn test_plain_base_is_ungrouped(base in base_strategy()) {
        let parsed = parse(&base).unwrap();

        prop_assert_eq!(parsed.base_expression(), base.as_str());
        prop_assert!(!parsed.is_grouped());
        prop_assert_eq!(parsed.children_field(), DEFAULT_CHILDREN_FIELD);
    }

    #[test]
    fn test_display_reparses_to_same_expression(
        base in base_strategy(),
        key in proptest::option::of(identifier_strategy()),
    ) {
        let text = match &key {
            Some(key) => format!("{} group by {}", base, key),
            None => base.clone(),
        };
        let parsed = parse(&text).unwrap();
        let reparsed = parse(&parsed.to_string()).unwrap();

        prop_assert_eq!(parsed, reparsed);
    }

    #[test]
    fn test_whitespace_only_is_malformed(spaces in "[ \t\n]{0,5}") {
        prop_assert!(parse(&spaces).is_err());
    }
}
