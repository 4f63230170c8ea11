//! Composable row predicates
//!
//! Matchers name their columns; they are resolved against a schema only
//! when evaluated or bound. No type coercion: equality is exact
//! `serde_json::Value` equality.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use serde_json::Value;

use crate::query::{QueryError, QueryResult};
use crate::row::{Row, Schema};

type UnaryPredicate = Box<dyn Fn(&Value) -> bool>;
type BinaryPredicate = Box<dyn Fn(&Value, &Value) -> bool>;

/// A boolean predicate over a row, given a schema
pub enum RowMatcher {
    /// Tests a single column
    Column { column: String, pred: UnaryPredicate },
    /// Tests a pair of columns
    Columns {
        left: String,
        right: String,
        pred: BinaryPredicate,
    },
    And(Box<RowMatcher>, Box<RowMatcher>),
    Or(Box<RowMatcher>, Box<RowMatcher>),
    Not(Box<RowMatcher>),
}

impl RowMatcher {
    /// Matcher over one column
    pub fn unary(column: impl Into<String>, pred: impl Fn(&Value) -> bool + 'static) -> Self {
        RowMatcher::Column {
            column: column.into(),
            pred: Box::new(pred),
        }
    }

    /// Matcher over two columns
    pub fn binary(
        left: impl Into<String>,
        right: impl Into<String>,
        pred: impl Fn(&Value, &Value) -> bool + 'static,
    ) -> Self {
        RowMatcher::Columns {
            left: left.into(),
            right: right.into(),
            pred: Box::new(pred),
        }
    }

    /// Column holds boolean `true`
    pub fn is_true(column: impl Into<String>) -> Self {
        Self::unary(column, |v| *v == Value::Bool(true))
    }

    /// Column holds boolean `false`
    pub fn is_false(column: impl Into<String>) -> Self {
        Self::unary(column, |v| *v == Value::Bool(false))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::unary(column, Value::is_null)
    }

    /// Column equals `value` exactly
    pub fn is_equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        let expected = value.into();
        Self::unary(column, move |v| *v == expected)
    }

    /// Two columns hold equal values
    pub fn col_equal(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::binary(left, right, |a, b| a == b)
    }

    /// Short-circuiting AND
    pub fn and(self, other: RowMatcher) -> Self {
        RowMatcher::And(Box::new(self), Box::new(other))
    }

    /// Short-circuiting OR
    pub fn or(self, other: RowMatcher) -> Self {
        RowMatcher::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        RowMatcher::Not(Box::new(self))
    }

    /// Folds matchers left-to-right with AND
    pub fn all<I: IntoIterator<Item = RowMatcher>>(matchers: I) -> QueryResult<Self> {
        matchers
            .into_iter()
            .reduce(RowMatcher::and)
            .ok_or(QueryError::EmptyMatcherList)
    }

    /// Every column name this matcher references, in evaluation order
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            RowMatcher::Column { column, .. } => out.push(column),
            RowMatcher::Columns { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            RowMatcher::And(a, b) | RowMatcher::Or(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
            RowMatcher::Not(inner) => inner.collect_columns(out),
        }
    }

    /// Evaluates against a row, resolving column names through `schema`.
    ///
    /// Names are resolved only on the branches actually evaluated.
    pub fn test(&self, row: &Row, schema: &Schema) -> QueryResult<bool> {
        match self {
            RowMatcher::Column { column, pred } => {
                let index = schema.index_of(column)?;
                Ok(row.get(index).is_some_and(|v| pred(v)))
            }
            RowMatcher::Columns { left, right, pred } => {
                let l = schema.index_of(left)?;
                let r = schema.index_of(right)?;
                Ok(match (row.get(l), row.get(r)) {
                    (Some(a), Some(b)) => pred(a, b),
                    _ => false,
                })
            }
            RowMatcher::And(a, b) => Ok(a.test(row, schema)? && b.test(row, schema)?),
            RowMatcher::Or(a, b) => Ok(a.test(row, schema)? || b.test(row, schema)?),
            RowMatcher::Not(inner) => Ok(!inner.test(row, schema)?),
        }
    }

    /// Resolves every column once against `schema`.
    ///
    /// The returned matcher keeps the indexes from this schema for the rest
    /// of its life, whatever happens to the schema afterwards.
    pub fn bind(self, schema: &Schema) -> QueryResult<BoundMatcher> {
        Ok(match self {
            RowMatcher::Column { column, pred } => BoundMatcher::Column {
                index: schema.index_of(&column)?,
                pred,
            },
            RowMatcher::Columns { left, right, pred } => BoundMatcher::Columns {
                left: schema.index_of(&left)?,
                right: schema.index_of(&right)?,
                pred,
            },
            RowMatcher::And(a, b) => {
                BoundMatcher::And(Box::new(a.bind(schema)?), Box::new(b.bind(schema)?))
            }
            RowMatcher::Or(a, b) => {
                BoundMatcher::Or(Box::new(a.bind(schema)?), Box::new(b.bind(schema)?))
            }
            RowMatcher::Not(inner) => BoundMatcher::Not(Box::new(inner.bind(schema)?)),
        })
    }
}

impl fmt::Debug for RowMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowMatcher::Column { column, .. } => write!(f, "Column({column})"),
            RowMatcher::Columns { left, right, .. } => write!(f, "Columns({left}, {right})"),
            RowMatcher::And(a, b) => write!(f, "And({a:?}, {b:?})"),
            RowMatcher::Or(a, b) => write!(f, "Or({a:?}, {b:?})"),
            RowMatcher::Not(inner) => write!(f, "Not({inner:?})"),
        }
    }
}

impl BitAnd for RowMatcher {
    type Output = RowMatcher;

    fn bitand(self, rhs: RowMatcher) -> RowMatcher {
        self.and(rhs)
    }
}

impl BitOr for RowMatcher {
    type Output = RowMatcher;

    fn bitor(self, rhs: RowMatcher) -> RowMatcher {
        self.or(rhs)
    }
}

impl Not for RowMatcher {
    type Output = RowMatcher;

    fn not(self) -> RowMatcher {
        self.negate()
    }
}

/// A matcher with column names already resolved to indexes
pub enum BoundMatcher {
    Column { index: usize, pred: UnaryPredicate },
    Columns {
        left: usize,
        right: usize,
        pred: BinaryPredicate,
    },
    And(Box<BoundMatcher>, Box<BoundMatcher>),
    Or(Box<BoundMatcher>, Box<BoundMatcher>),
    Not(Box<BoundMatcher>),
}

impl BoundMatcher {
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            BoundMatcher::Column { index, pred } => row.get(*index).is_some_and(|v| pred(v)),
            BoundMatcher::Columns { left, right, pred } => {
                match (row.get(*left), row.get(*right)) {
                    (Some(a), Some(b)) => pred(a, b),
                    _ => false,
                }
            }
            BoundMatcher::And(a, b) => a.matches(row) && b.matches(row),
            BoundMatcher::Or(a, b) => a.matches(row) || b.matches(row),
            BoundMatcher::Not(inner) => !inner.matches(row),
        }
    }
}

impl fmt::Debug for BoundMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundMatcher::Column { index, .. } => write!(f, "Column(#{index})"),
            BoundMatcher::Columns { left, right, .. } => write!(f, "Columns(#{left}, #{right})"),
            BoundMatcher::And(a, b) => write!(f, "And({a:?}, {b:?})"),
            BoundMatcher::Or(a, b) => write!(f, "Or({a:?}, {b:?})"),
            BoundMatcher::Not(inner) => write!(f, "Not({inner:?})"),
        }
    }
}
