//! Group-by with aggregation
//!
//! Grouping consumes the whole input before returning. Groups are keyed by
//! the projection onto the grouping columns; member rows are folded in
//! encounter order, so results are order-independent only for associative
//! and commutative aggregators.

use std::collections::HashMap;

use super::errors::{QueryError, QueryResult};
use super::query::Query;
use crate::aggregate::Aggregator;
use crate::observability::Severity;
use crate::row::Row;

impl Query {
    /// Collapses rows sharing the same values in `columns` into one row.
    ///
    /// Columns with an aggregator are merged through it. Every other column
    /// must hold the same value across the group, otherwise the call fails
    /// with `QUERY_MERGE_CONFLICT`. The schema is unchanged. Groups come out
    /// in the order their first member was seen.
    pub fn group_by<S, I>(self, columns: &[S], aggregators: I) -> QueryResult<Query>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = Aggregator>,
    {
        let key_indexes = self.schema.indexes_of(columns)?;

        let aggregators: Vec<Aggregator> = aggregators.into_iter().collect();
        let mut by_index: HashMap<usize, &Aggregator> = HashMap::new();
        for aggregator in &aggregators {
            let index = self.schema.index_of(aggregator.column())?;
            if by_index.insert(index, aggregator).is_some() {
                return Err(QueryError::DuplicateColumn(aggregator.column().to_string()));
            }
        }

        let mut groups: Vec<Row> = Vec::new();
        let mut positions: HashMap<Row, usize> = HashMap::new();
        let mut scanned = 0usize;

        for row in self.rows {
            let row = row?;
            scanned += 1;

            let key = row.project(&key_indexes);
            match positions.get(&key) {
                Some(&position) => groups[position].merge(&row, &by_index)?,
                None => {
                    positions.insert(key, groups.len());
                    groups.push(row);
                }
            }
        }

        let (rows_scanned, group_count) = (scanned.to_string(), groups.len().to_string());
        self.config.log(
            Severity::Info,
            "QUERY_GROUP_BY_COMPLETE",
            &[
                ("groups", group_count.as_str()),
                ("rows", rows_scanned.as_str()),
            ],
        );

        Ok(Query::from_stream(
            self.schema,
            Box::new(groups.into_iter().map(Ok)),
            self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::row::Schema;
    use serde_json::json;

    fn readings() -> Query {
        let schema = Schema::new(["id", "species", "speed"]).unwrap();
        let rows = vec![
            Row::of([json!(1), json!("fox"), json!(10)]),
            Row::of([json!(2), json!("owl"), json!(5)]),
            Row::of([json!(1), json!("fox"), json!(20)]),
        ];
        Query::from_rows(schema, rows, QueryConfig::default())
    }

    #[test]
    fn test_group_by_sum() {
        let rows = readings()
            .group_by(&["id"], [Aggregator::sum("speed")])
            .unwrap()
            .list()
            .unwrap();
        assert_eq!(
            rows,
            vec![
                Row::of([json!(1), json!("fox"), json!(30)]),
                Row::of([json!(2), json!("owl"), json!(5)]),
            ]
        );
    }

    #[test]
    fn test_group_by_conflict_without_aggregator() {
        let err = readings()
            .group_by(&["id"], Vec::new())
            .unwrap_err();
        match err {
            QueryError::MergeConflict { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_group_by_unknown_aggregator_column() {
        let err = readings()
            .group_by(&["id"], [Aggregator::sum("weight")])
            .unwrap_err();
        assert_eq!(err, QueryError::UnknownColumn("weight".into()));
    }

    #[test]
    fn test_group_by_duplicate_aggregator() {
        let err = readings()
            .group_by(&["id"], [Aggregator::sum("speed"), Aggregator::max("speed")])
            .unwrap_err();
        assert_eq!(err, QueryError::DuplicateColumn("speed".into()));
    }

    #[test]
    fn test_group_by_no_columns_is_single_group() {
        let rows = readings()
            .select(&["speed"])
            .unwrap()
            .group_by::<&str, _>(&[], [Aggregator::sum("speed")])
            .unwrap()
            .list()
            .unwrap();
        assert_eq!(rows, vec![Row::of([json!(35)])]);
    }

    #[test]
    fn test_group_by_signed_zero_keys_share_a_group() {
        let schema = Schema::new(["k", "v"]).unwrap();
        let rows = vec![
            Row::of([json!(0.0), json!(1)]),
            Row::of([json!(-0.0), json!(2)]),
        ];
        let rows = Query::from_rows(schema, rows, QueryConfig::default())
            .group_by(&["k"], [Aggregator::sum("v")])
            .unwrap()
            .list()
            .unwrap();
        assert_eq!(rows, vec![Row::of([json!(0.0), json!(3)])]);
    }
}
