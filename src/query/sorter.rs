//! Row ordering
//!
//! Sorting needs the whole input, so it is deferred until the first row is
//! pulled and then buffers everything. The sort is stable.

use std::cmp::Ordering;

use super::errors::QueryResult;
use super::query::Query;
use super::stream::Deferred;
use crate::observability::Severity;
use crate::row::{canonical_string, Row};

/// Caller-supplied row comparator
pub type RowComparator = Box<dyn Fn(&Row, &Row) -> Ordering>;

impl Query {
    /// Orders by the canonical string form of each column.
    ///
    /// Columns are tie-breakers left to right. Comparison is lexicographic on
    /// strings, so `10` sorts before `9`; use [`Query::order_by_comparators`]
    /// for numeric order.
    pub fn order_by<S: AsRef<str>>(self, columns: &[S]) -> QueryResult<Query> {
        let indexes = self.schema.indexes_of(columns)?;

        self.config.log(Severity::Trace, "QUERY_ORDER_BY", &[]);

        let rows = Deferred::new(self.rows, move |mut rows| {
            rows.sort_by_cached_key(|row| {
                indexes
                    .iter()
                    .map(|&i| row.get(i).map(canonical_string).unwrap_or_default())
                    .collect::<Vec<_>>()
            });
            rows
        });
        Ok(Query::from_stream(self.schema, Box::new(rows), self.config))
    }

    /// Orders by comparators chained left to right as tie-breakers
    pub fn order_by_comparators<I>(self, comparators: I) -> Query
    where
        I: IntoIterator<Item = RowComparator>,
    {
        let comparators: Vec<RowComparator> = comparators.into_iter().collect();

        let rows = Deferred::new(self.rows, move |mut rows| {
            rows.sort_by(|a, b| {
                comparators
                    .iter()
                    .fold(Ordering::Equal, |ord, cmp| ord.then_with(|| cmp(a, b)))
            });
            rows
        });
        Query::from_stream(self.schema, Box::new(rows), self.config)
    }
}

/// Comparator over one column's values using `cmp`
pub fn by_column(
    index: usize,
    cmp: impl Fn(&serde_json::Value, &serde_json::Value) -> Ordering + 'static,
) -> RowComparator {
    Box::new(move |a, b| match (a.get(index), b.get(index)) {
        (Some(x), Some(y)) => cmp(x, y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::row::{compare_values, Schema};
    use serde_json::json;

    fn people() -> Query {
        let schema = Schema::new(["id", "name"]).unwrap();
        let rows = vec![
            Row::of([json!(3), json!("carol")]),
            Row::of([json!(1), json!("bob")]),
            Row::of([json!(2), json!("alice")]),
            Row::of([json!(1), json!("alice")]),
        ];
        Query::from_rows(schema, rows, QueryConfig::default())
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|r| r.get(0).unwrap().as_i64().unwrap()).collect()
    }

    #[test]
    fn test_order_by_columns_with_tie_breaker() {
        let rows = people().order_by(&["id", "name"]).unwrap().list().unwrap();
        assert_eq!(ids(&rows), vec![1, 1, 2, 3]);
        assert_eq!(rows[0].get(1).unwrap(), &json!("alice"));
    }

    #[test]
    fn test_order_by_is_lexicographic() {
        let schema = Schema::new(["n"]).unwrap();
        let rows = vec![Row::of([json!(9)]), Row::of([json!(10)])];
        let sorted = Query::from_rows(schema, rows, QueryConfig::default())
            .order_by(&["n"])
            .unwrap()
            .list()
            .unwrap();
        assert_eq!(sorted, vec![Row::of([json!(10)]), Row::of([json!(9)])]);
    }

    #[test]
    fn test_order_by_stable() {
        let rows = people().order_by(&["id"]).unwrap().list().unwrap();
        // bob came before the second alice for id 1
        assert_eq!(rows[0].get(1).unwrap(), &json!("bob"));
        assert_eq!(rows[1].get(1).unwrap(), &json!("alice"));
    }

    #[test]
    fn test_order_by_unknown_column() {
        assert!(people().order_by(&["age"]).is_err());
    }

    #[test]
    fn test_order_by_comparators_chain() {
        let rows = people()
            .order_by_comparators([
                by_column(0, |a, b| compare_values(b, a)),
                by_column(1, compare_values),
            ])
            .list()
            .unwrap();
        assert_eq!(ids(&rows), vec![3, 2, 1, 1]);
        assert_eq!(rows[2].get(1).unwrap(), &json!("alice"));
    }
}
