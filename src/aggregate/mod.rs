//! Group-by aggregators
//!
//! An [`Aggregator`] names a column and a binary merge used to fold that
//! column's values when several rows fall into the same group.
//!
//! # Caller contract
//!
//! Rows are folded in encounter order. A result is independent of that
//! order only when the merge is associative and commutative; the engine
//! does not check this.

use std::cmp::Ordering;
use std::fmt;

use serde_json::{Number, Value};

use crate::query::{QueryError, QueryResult};
use crate::row::{canonical_string, compare_values};

type MergeFn = Box<dyn Fn(Value, &Value) -> QueryResult<Value>>;

/// Named, column-scoped merge function
pub struct Aggregator {
    column: String,
    merge: MergeFn,
}

impl Aggregator {
    /// Aggregator from an infallible merge
    pub fn new(
        column: impl Into<String>,
        merge: impl Fn(Value, &Value) -> Value + 'static,
    ) -> Self {
        Self {
            column: column.into(),
            merge: Box::new(move |acc, next| Ok(merge(acc, next))),
        }
    }

    /// Aggregator from a merge that may reject its inputs
    pub fn try_new(
        column: impl Into<String>,
        merge: impl Fn(Value, &Value) -> QueryResult<Value> + 'static,
    ) -> Self {
        Self {
            column: column.into(),
            merge: Box::new(merge),
        }
    }

    /// Numeric sum. Integers stay integers unless the sum overflows.
    pub fn sum(column: impl Into<String>) -> Self {
        let column = column.into();
        let name = column.clone();
        Self::try_new(column, move |acc, next| {
            add(&acc, next).ok_or_else(|| QueryError::AggregateFailed {
                column: name.clone(),
                reason: format!("cannot add [{}] and [{}]", acc, next),
            })
        })
    }

    /// Keeps the smaller value (numeric when both are numbers)
    pub fn min(column: impl Into<String>) -> Self {
        Self::new(column, |acc, next| match compare_values(next, &acc) {
            Ordering::Less => next.clone(),
            _ => acc,
        })
    }

    /// Keeps the larger value (numeric when both are numbers)
    pub fn max(column: impl Into<String>) -> Self {
        Self::new(column, |acc, next| match compare_values(next, &acc) {
            Ordering::Greater => next.clone(),
            _ => acc,
        })
    }

    /// Joins canonical strings with `separator`.
    ///
    /// Not commutative: output follows encounter order.
    pub fn concat(column: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        Self::new(column, move |acc, next| {
            Value::String(format!(
                "{}{}{}",
                canonical_string(&acc),
                separator,
                canonical_string(next)
            ))
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Merges `next` into the accumulated value
    pub fn apply(&self, accumulated: Value, next: &Value) -> QueryResult<Value> {
        (self.merge)(accumulated, next)
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

fn add(a: &Value, b: &Value) -> Option<Value> {
    let (Value::Number(x), Value::Number(y)) = (a, b) else {
        return None;
    };
    if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
        if let Some(sum) = xi.checked_add(yi) {
            return Some(Value::from(sum));
        }
    }
    let sum = x.as_f64()? + y.as_f64()?;
    Number::from_f64(sum).map(Value::Number)
}
