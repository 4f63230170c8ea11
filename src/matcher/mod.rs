//! Row matchers
//!
//! A [`RowMatcher`] is a predicate tree over named columns. Leaves test one
//! column or a pair of columns; inner nodes combine with AND, OR and NOT.
//! Binding a matcher to a schema yields a [`BoundMatcher`] that evaluates
//! rows without further name lookups.

mod matcher;

pub use matcher::{BoundMatcher, RowMatcher};
