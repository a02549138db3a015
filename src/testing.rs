//! Testing utilities for grouped levels
//!
//! Grouping results are nested (groups holding items holding collections) and
//! compared by identity as much as by value, which makes hand-written `match`
//! trees in tests long and hard to read. [`assert_grouping`] is a fluent API
//! over a [`Grouping`](crate::grouping::Grouping):
//!
//! ```rust-example
//! use treemendous::testing::assert_grouping;
//!
//! assert_grouping(level.grouping())
//!     .is_grouped()
//!     .group_count(2)
//!     .group(0, |group| {
//!         group
//!             .key("X")
//!             .child_count(2)
//!             .child(0, |item| item.field("name", "a"))
//!     });
//! ```
//!
//! The factories build the records and scopes most tests start from.

mod testing_assertions;
mod testing_factories;

pub use testing_assertions::{assert_grouping, GroupAssertion, GroupingAssertion, ItemAssertion};

// Public submodule path: crate::testing::factories
pub mod factories {
    pub use super::testing_factories::*;
}
