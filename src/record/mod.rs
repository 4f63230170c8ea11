//! Conversion between domain values and rows
//!
//! [`RecordSource`] turns values into the initial rows of a query and
//! [`RecordSink`] turns a query's rows back into values. Both are explicit
//! capability tables built by the caller; `Query::from_serialize` and
//! `Query::deserialize` cover types that already speak serde.

mod sink;
mod source;

pub use sink::RecordSink;
pub use source::RecordSource;
