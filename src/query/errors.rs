//! Query error types
//!
//! Error codes:
//! - QUERY_UNKNOWN_COLUMN
//! - QUERY_DUPLICATE_COLUMN
//! - QUERY_SCHEMA_MISMATCH
//! - QUERY_MERGE_CONFLICT
//! - QUERY_ROW_SIZE_MISMATCH
//! - QUERY_AGGREGATE_FAILED
//! - QUERY_EMPTY_MATCHER_LIST
//! - QUERY_EMPTY_INPUT
//! - RECORD_MISSING_FIELD
//! - RECORD_MISSING_SLOT
//! - RECORD_INSTANTIATION_FAILED
//! - RECORD_SERIALIZATION_FAILED
//! - RECORD_DESERIALIZATION_FAILED
//! - RECORD_SLOT_WRITE_FAILED

use thiserror::Error;

use crate::observability::Severity;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while building or consuming a query
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Column [{0}] not found")]
    UnknownColumn(String),

    #[error("Column [{0}] appears more than once")]
    DuplicateColumn(String),

    #[error("Cannot union query {left:?} with query {right:?} because column sets are different. Use select to align columns first")]
    SchemaMismatch { left: Vec<String>, right: Vec<String> },

    #[error("Cannot merge [{incoming}] from row {incoming_row} into [{accumulated}] from row {accumulated_row} without an aggregator for column [{index}]")]
    MergeConflict {
        index: usize,
        accumulated: String,
        incoming: String,
        accumulated_row: String,
        incoming_row: String,
    },

    #[error("Cannot merge rows of different size ({left} vs {right})")]
    RowSizeMismatch { left: usize, right: usize },

    #[error("Aggregator on column [{column}] failed: {reason}")]
    AggregateFailed { column: String, reason: String },

    #[error("At least one matcher is required")]
    EmptyMatcherList,

    #[error("{0} produced no input")]
    EmptyInput(String),

    #[error("Field [{field}] is unreadable for record #{record}")]
    MissingField { field: String, record: usize },

    #[error("No writable slot for column [{column}]. Cannot assign value from index {index} of row {row}")]
    MissingSlot {
        column: String,
        index: usize,
        row: String,
    },

    #[error("Target record could not be instantiated")]
    InstantiationFailed,

    #[error("Record #{record} could not be serialized: {reason}")]
    SerializationFailed { record: usize, reason: String },

    #[error("Row {row} could not be deserialized: {reason}")]
    DeserializationFailed { row: String, reason: String },

    #[error("Writing column [{column}] failed: {reason}")]
    SlotWriteFailed { column: String, reason: String },
}

impl QueryError {
    /// Returns the stable string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::UnknownColumn(_) => "QUERY_UNKNOWN_COLUMN",
            QueryError::DuplicateColumn(_) => "QUERY_DUPLICATE_COLUMN",
            QueryError::SchemaMismatch { .. } => "QUERY_SCHEMA_MISMATCH",
            QueryError::MergeConflict { .. } => "QUERY_MERGE_CONFLICT",
            QueryError::RowSizeMismatch { .. } => "QUERY_ROW_SIZE_MISMATCH",
            QueryError::AggregateFailed { .. } => "QUERY_AGGREGATE_FAILED",
            QueryError::EmptyMatcherList => "QUERY_EMPTY_MATCHER_LIST",
            QueryError::EmptyInput(_) => "QUERY_EMPTY_INPUT",
            QueryError::MissingField { .. } => "RECORD_MISSING_FIELD",
            QueryError::MissingSlot { .. } => "RECORD_MISSING_SLOT",
            QueryError::InstantiationFailed => "RECORD_INSTANTIATION_FAILED",
            QueryError::SerializationFailed { .. } => "RECORD_SERIALIZATION_FAILED",
            QueryError::DeserializationFailed { .. } => "RECORD_DESERIALIZATION_FAILED",
            QueryError::SlotWriteFailed { .. } => "RECORD_SLOT_WRITE_FAILED",
        }
    }

    /// Returns the severity level for this error.
    ///
    /// A row-size mismatch means an upstream operator broke the row/schema
    /// invariant, so it is reported as fatal.
    pub fn severity(&self) -> Severity {
        match self {
            QueryError::RowSizeMismatch { .. } => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QueryError::UnknownColumn("x".into()).code(),
            "QUERY_UNKNOWN_COLUMN"
        );
        assert_eq!(
            QueryError::SchemaMismatch {
                left: vec![],
                right: vec![]
            }
            .code(),
            "QUERY_SCHEMA_MISMATCH"
        );
        assert_eq!(
            QueryError::InstantiationFailed.code(),
            "RECORD_INSTANTIATION_FAILED"
        );
    }

    #[test]
    fn test_row_size_mismatch_is_fatal() {
        let err = QueryError::RowSizeMismatch { left: 2, right: 3 };
        assert!(err.is_fatal());
        assert!(!QueryError::UnknownColumn("a".into()).is_fatal());
    }

    #[test]
    fn test_error_display_names_column() {
        let err = QueryError::UnknownColumn("speed".into());
        assert_eq!(err.to_string(), "Column [speed] not found");

        let err = QueryError::SchemaMismatch {
            left: vec!["a".into(), "b".into()],
            right: vec!["b".into(), "a".into()],
        };
        let display = err.to_string();
        assert!(display.contains("[\"a\", \"b\"]"));
        assert!(display.contains("[\"b\", \"a\"]"));
    }
}
