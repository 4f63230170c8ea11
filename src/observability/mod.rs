//! Observability for rowquery
//!
//! Structured, synchronous, single-line JSON logs. Queries route their
//! events through [`crate::config::QueryConfig::log`], which applies the
//! configured severity threshold before handing the line to [`Logger`].
//!
//! ```ignore
//! use rowquery::observability::Logger;
//!
//! Logger::info("QUERY_GROUP_BY_COMPLETE", &[("groups", "2")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
