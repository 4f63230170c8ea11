//! Joins
//!
//! `join` is a cartesian product: the right side is loaded into memory once,
//! the left side stays lazy. Restrict it afterwards with [`Query::on`] or
//! [`Query::using`].
//!
//! Right-hand columns whose names also exist on the left are renamed with
//! [`RIGHT_PREFIX`]. `using` relies on that rename to emulate a natural join.

use std::rc::Rc;

use super::errors::{QueryError, QueryResult};
use super::query::Query;
use super::stream::{materialize, RowStream};
use crate::matcher::RowMatcher;
use crate::observability::Severity;
use crate::row::{Row, Schema};

/// Prefix given to colliding right-hand column names
pub const RIGHT_PREFIX: &str = "right_";

impl Query {
    /// Cartesian join with `other`.
    ///
    /// Output rows are left-major: every right row for the first left row,
    /// then every right row for the second, and so on.
    pub fn join(self, other: Query) -> QueryResult<Query> {
        let schema = self.schema.concat_renaming(&other.schema, RIGHT_PREFIX)?;

        // The right side is rescanned for every left row
        let right = Rc::new(materialize(other.rows)?);

        if self.config.enabled(Severity::Trace) {
            let right_rows = right.len().to_string();
            self.config.log(
                Severity::Trace,
                "QUERY_JOIN_MATERIALIZED",
                &[("right_rows", right_rows.as_str())],
            );
        }

        let rows = self.rows.flat_map(move |left| -> RowStream {
            match left {
                Ok(left) => {
                    let right = Rc::clone(&right);
                    Box::new((0..right.len()).map(move |i| Ok(left.concat(&right[i]))))
                }
                Err(e) => Box::new(std::iter::once(Err(e))),
            }
        });
        Ok(Query::from_stream(schema, Box::new(rows), self.config))
    }

    /// Keeps pairs where `left` equals `right`
    pub fn on(self, left: &str, right: &str) -> QueryResult<Query> {
        self.filter(RowMatcher::col_equal(left, right))
    }

    /// Natural-join restriction after [`Query::join`].
    ///
    /// For each column `c`, keeps rows where `c` equals `right_c`, then drops
    /// every column whose name starts with [`RIGHT_PREFIX`].
    pub fn using<S: AsRef<str>>(self, columns: &[S]) -> QueryResult<Query> {
        let matcher = RowMatcher::all(columns.iter().map(|c| {
            let c = c.as_ref();
            RowMatcher::col_equal(c, format!("{RIGHT_PREFIX}{c}"))
        }))?;

        let kept: Vec<String> = self
            .schema
            .names()
            .iter()
            .filter(|name| !name.starts_with(RIGHT_PREFIX))
            .cloned()
            .collect();

        self.filter(matcher)?.select(&kept)
    }

    /// Builds one query per row of this query and unions them.
    ///
    /// The whole left side is consumed up front. Every generated query must
    /// share one schema; an empty left side has no schema to offer and fails
    /// with `QUERY_EMPTY_INPUT`.
    pub fn join_each<F>(self, mut generate: F) -> QueryResult<Query>
    where
        F: FnMut(&Row, &Schema) -> QueryResult<Query>,
    {
        let mut joined: Option<Query> = None;
        for row in self.rows {
            let generated = generate(&row?, &self.schema)?;
            joined = Some(match joined {
                Some(acc) => acc.union_all(generated)?,
                None => generated,
            });
        }
        joined.ok_or_else(|| QueryError::EmptyInput("join_each".to_string()))
    }
}
