//! Query pipeline for rowquery
//!
//! A [`Query`] owns a schema and a lazy row stream. Each operator consumes
//! the query and returns a new one.
//!
//! # Evaluation
//!
//! - `select`, `filter`, `limit`, `peek`, `distinct`, `union_all` and the
//!   left side of `join` stream row by row
//! - `order_by` buffers its whole input on the first pull
//! - `join`'s right side, `join_each`'s left side and `group_by` are
//!   consumed in full when the operator is called
//!
//! # Errors
//!
//! Unknown columns, schema mismatches and merge conflicts are reported by
//! the operator call. Failures inside the lazy stream (unreadable record
//! fields, malformed rows) travel in-band and surface where they are pulled.

mod errors;
mod grouping;
mod join;
mod query;
mod sorter;
mod stream;

pub use errors::{QueryError, QueryResult};
pub use join::RIGHT_PREFIX;
pub use query::Query;
pub use sorter::{by_column, RowComparator};
pub use stream::RowStream;
