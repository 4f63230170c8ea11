//! rowquery - schema-on-read relational operators over lazy row sequences
//!
//! Rows are positional vectors of `serde_json::Value`; column names live in
//! a [`Schema`] carried alongside the data. A [`Query`] chains projection,
//! filtering, joins, grouping, ordering and union over a lazy row stream,
//! and is consumed exactly once by a terminal operation.
//!
//! ```ignore
//! use rowquery::{Aggregator, Query, QueryConfig, RowMatcher};
//!
//! let rows = Query::from_serialize(participants, &["id", "species", "speed"], QueryConfig::default())?
//!     .filter(RowMatcher::is_equal("species", "fox"))?
//!     .group_by(&["id"], [Aggregator::sum("speed")])?
//!     .order_by(&["id"])?
//!     .list()?;
//! ```

pub mod aggregate;
pub mod config;
pub mod matcher;
pub mod observability;
pub mod query;
pub mod record;
pub mod row;

pub use aggregate::Aggregator;
pub use config::{MissingFieldPolicy, QueryConfig};
pub use matcher::{BoundMatcher, RowMatcher};
pub use query::{Query, QueryError, QueryResult, RowComparator, RowStream};
pub use record::{RecordSink, RecordSource};
pub use row::{Row, Schema, Value};
