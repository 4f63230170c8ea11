//! Lazy row streams and materialization boundaries
//!
//! Every stage of a pipeline is an iterator adapter over [`RowStream`], so
//! nothing runs until a terminal operation pulls rows. Operators that cannot
//! stream (sorting) wrap their input in [`Deferred`], which buffers the whole
//! upstream on the first pull.

use super::errors::QueryResult;
use crate::row::Row;

/// Lazy, single-pass sequence of rows.
///
/// Errors travel in-band so a failure in one upstream element surfaces at
/// the point the consumer pulls it.
pub type RowStream = Box<dyn Iterator<Item = QueryResult<Row>>>;

type Finish = Box<dyn FnOnce(Vec<Row>) -> Vec<Row>>;

/// Drains the stream, stopping at the first error
pub(crate) fn materialize(rows: RowStream) -> QueryResult<Vec<Row>> {
    rows.collect()
}

/// Buffers its whole input on first pull, transforms it, then replays it
pub(crate) struct Deferred {
    pending: Option<(RowStream, Finish)>,
    output: std::vec::IntoIter<Row>,
}

impl Deferred {
    pub(crate) fn new(rows: RowStream, finish: impl FnOnce(Vec<Row>) -> Vec<Row> + 'static) -> Self {
        Self {
            pending: Some((rows, Box::new(finish))),
            output: Vec::new().into_iter(),
        }
    }
}

impl Iterator for Deferred {
    type Item = QueryResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((rows, finish)) = self.pending.take() {
            match materialize(rows) {
                Ok(buffered) => self.output = finish(buffered).into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
        self.output.next().map(Ok)
    }
}
