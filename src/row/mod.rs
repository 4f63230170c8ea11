//! Row data model
//!
//! A [`Row`] is a positional vector of `serde_json::Value` cells; a
//! [`Schema`] names the positions. Rows never carry their own names, so
//! every operator that reads a column resolves it through the schema in
//! effect when the operator is applied.
//!
//! # Invariants
//!
//! - Schema indexes are contiguous from 0 and names are unique
//! - Every row in a pipeline has exactly as many cells as its schema has columns

mod row;
mod schema;
mod value;

pub use row::Row;
pub use schema::Schema;
pub use value::{canonical_string, compare_values, hash_value};

/// Cell value type
pub use serde_json::Value;
