//! Positional rows

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use super::value::{canonical_string, hash_value};
use crate::aggregate::Aggregator;
use crate::query::{QueryError, QueryResult};

/// An ordered, fixed-length vector of cell values.
///
/// Rows carry no column names; a [`super::Schema`] supplies the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Builds a row from anything convertible into cell values
    pub fn of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(values.into_iter().map(Into::into).collect())
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// New row holding the values at `indexes`, in that order.
    ///
    /// Indexes must be in bounds; callers resolve them against the schema
    /// the row was produced under.
    pub fn project(&self, indexes: &[usize]) -> Row {
        Row::new(indexes.iter().map(|&i| self.values[i].clone()).collect())
    }

    /// New row with this row's values followed by `other`'s
    pub fn concat(&self, other: &Row) -> Row {
        let mut values = Vec::with_capacity(self.len() + other.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Row::new(values)
    }

    /// Folds `other` into this row in place.
    ///
    /// Columns with an aggregator are merged through it; every other column
    /// must already be equal.
    pub(crate) fn merge(
        &mut self,
        other: &Row,
        aggregators: &HashMap<usize, &Aggregator>,
    ) -> QueryResult<()> {
        if self.len() != other.len() {
            return Err(QueryError::RowSizeMismatch {
                left: self.len(),
                right: other.len(),
            });
        }

        for i in 0..self.values.len() {
            match aggregators.get(&i) {
                Some(aggregator) => {
                    let accumulated = std::mem::take(&mut self.values[i]);
                    self.values[i] = aggregator.apply(accumulated, &other.values[i])?;
                }
                None if self.values[i] != other.values[i] => {
                    return Err(QueryError::MergeConflict {
                        index: i,
                        accumulated: canonical_string(&self.values[i]),
                        incoming: canonical_string(&other.values[i]),
                        accumulated_row: self.to_string(),
                        incoming_row: other.to_string(),
                    });
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl Hash for Row {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.len().hash(state);
        for value in &self.values {
            hash_value(value, state);
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match canonical_string(value) {
                s if s.is_empty() => write!(f, "\"\"")?,
                s => write!(f, "{}", s)?,
            }
        }
        write!(f, ")")
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}
