//! The query pipeline
//!
//! A [`Query`] binds one [`Schema`] to one lazy [`RowStream`]. Operators
//! take the query by value and return a new one, so a pipeline can only be
//! consumed once: a second terminal call on the same query does not compile.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use super::errors::{QueryError, QueryResult};
use super::stream::{materialize, RowStream};
use crate::config::QueryConfig;
use crate::matcher::RowMatcher;
use crate::observability::Severity;
use crate::row::{Row, Schema};

/// Schema-on-read query over a lazy row sequence
pub struct Query {
    pub(crate) schema: Schema,
    pub(crate) rows: RowStream,
    pub(crate) config: QueryConfig,
}

impl Query {
    /// Query over in-memory rows.
    ///
    /// Each row must have exactly one cell per schema column; a row that
    /// does not fails with `QUERY_ROW_SIZE_MISMATCH` when it is pulled.
    pub fn from_rows<I>(schema: Schema, rows: I, config: QueryConfig) -> Query
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: 'static,
    {
        let width = schema.len();
        let rows = rows.into_iter().map(move |row| {
            if row.len() == width {
                Ok(row)
            } else {
                Err(QueryError::RowSizeMismatch {
                    left: width,
                    right: row.len(),
                })
            }
        });
        Self::from_stream(schema, Box::new(rows), config)
    }

    pub(crate) fn from_stream(schema: Schema, rows: RowStream, config: QueryConfig) -> Query {
        Query {
            schema,
            rows,
            config,
        }
    }

    /// Copy of the current schema
    pub fn schema(&self) -> Schema {
        self.schema.clone()
    }

    /// Ordered copy of the column to index mapping
    pub fn columns(&self) -> Vec<(String, usize)> {
        self.schema.to_map()
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Reads a named cell from a row produced by this query
    pub fn get<'r>(&self, row: &'r Row, column: &str) -> QueryResult<&'r Value> {
        let index = self.schema.index_of(column)?;
        row.get(index).ok_or(QueryError::RowSizeMismatch {
            left: self.schema.len(),
            right: row.len(),
        })
    }

    // select

    /// Projects onto `columns`, in the given order.
    ///
    /// The new schema is exactly `columns` at indexes `0..n`. Naming a column
    /// twice fails with `QUERY_DUPLICATE_COLUMN` so the schema stays
    /// injective; repeated projections are deliberately not supported.
    pub fn select<S: AsRef<str>>(self, columns: &[S]) -> QueryResult<Query> {
        let schema = Schema::new(columns.iter().map(|c| c.as_ref()))?;
        let indexes = self.schema.indexes_of(columns)?;

        if self.config.enabled(Severity::Trace) {
            let names = schema.names().join(",");
            self.config
                .log(Severity::Trace, "QUERY_SELECT", &[("columns", names.as_str())]);
        }

        let rows = self
            .rows
            .map(move |row| row.map(|row| row.project(&indexes)));
        Ok(Query::from_stream(schema, Box::new(rows), self.config))
    }

    // where

    /// Keeps rows matching `matcher`.
    ///
    /// The matcher is bound to the schema as it is now; later operators
    /// that change the schema do not affect it.
    pub fn filter(self, matcher: RowMatcher) -> QueryResult<Query> {
        let bound = matcher.bind(&self.schema)?;

        if self.config.enabled(Severity::Trace) {
            let shape = format!("{bound:?}");
            self.config
                .log(Severity::Trace, "QUERY_FILTER", &[("matcher", shape.as_str())]);
        }

        let rows = self.rows.filter(move |row| match row {
            Ok(row) => bound.matches(row),
            Err(_) => true,
        });
        Ok(Query::from_stream(self.schema, Box::new(rows), self.config))
    }

    /// Keeps rows matching every matcher, evaluated left to right
    pub fn filter_all<I>(self, matchers: I) -> QueryResult<Query>
    where
        I: IntoIterator<Item = RowMatcher>,
    {
        let matcher = RowMatcher::all(matchers)?;
        self.filter(matcher)
    }

    // union

    /// Appends `other`'s rows after this query's rows.
    ///
    /// Both schemas must be identical, names and positions alike.
    pub fn union_all(self, other: Query) -> QueryResult<Query> {
        if self.schema != other.schema {
            return Err(QueryError::SchemaMismatch {
                left: self.schema.names().to_vec(),
                right: other.schema.names().to_vec(),
            });
        }
        let rows = self.rows.chain(other.rows);
        Ok(Query::from_stream(self.schema, Box::new(rows), self.config))
    }

    // passthrough

    /// Truncates to the first `n` rows
    pub fn limit(self, n: usize) -> Query {
        let rows = self.rows.take(n);
        Query::from_stream(self.schema, Box::new(rows), self.config)
    }

    /// Runs `action` on each row as it is pulled
    pub fn peek(self, mut action: impl FnMut(&Row) + 'static) -> Query {
        let rows = self.rows.inspect(move |row| {
            if let Ok(row) = row {
                action(row);
            }
        });
        Query::from_stream(self.schema, Box::new(rows), self.config)
    }

    /// Same as [`Query::peek`]; reads better for logging actions
    pub fn log(self, action: impl FnMut(&Row) + 'static) -> Query {
        self.peek(action)
    }

    /// Drops rows equal to one already seen, keeping first occurrences
    pub fn distinct(self) -> Query {
        let mut seen = HashSet::new();
        let rows = self.rows.filter(move |row| match row {
            Ok(row) => seen.insert(row.clone()),
            Err(_) => true,
        });
        Query::from_stream(self.schema, Box::new(rows), self.config)
    }

    // terminals

    /// Hands the lazy row sequence to the caller
    pub fn into_rows(self) -> RowStream {
        self.rows
    }

    /// Splits into schema and lazy rows
    pub fn into_parts(self) -> (Schema, RowStream) {
        (self.schema, self.rows)
    }

    /// Collects every row, stopping at the first error
    pub fn list(self) -> QueryResult<Vec<Row>> {
        materialize(self.rows)
    }

    pub fn count(self) -> QueryResult<usize> {
        let mut rows = self.rows;
        rows.try_fold(0, |n, row| row.map(|_| n + 1))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
