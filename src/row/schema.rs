//! Column schema: an ordered, injective mapping from name to position

use std::collections::HashMap;
use std::fmt;

use crate::query::{QueryError, QueryResult};

/// Ordered mapping from column name to row index.
///
/// A column's index is its position in insertion order, so indexes are
/// always contiguous from 0. Duplicate names are rejected at construction.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema from column names in order
    pub fn new<I, S>(names: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Schema::default();
        for name in names {
            schema.push(name.into())?;
        }
        Ok(schema)
    }

    fn push(&mut self, name: String) -> QueryResult<()> {
        if self.index.contains_key(&name) {
            return Err(QueryError::DuplicateColumn(name));
        }
        self.index.insert(name.clone(), self.names.len());
        self.names.push(name);
        Ok(())
    }

    /// Resolves a column name to its index
    pub fn index_of(&self, name: &str) -> QueryResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::UnknownColumn(name.to_string()))
    }

    /// Resolves several names, failing on the first unknown one
    pub fn indexes_of<S: AsRef<str>>(&self, names: &[S]) -> QueryResult<Vec<usize>> {
        names.iter().map(|n| self.index_of(n.as_ref())).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates `(name, index)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.names.iter().enumerate().map(|(i, n)| (n.as_str(), i))
    }

    /// Ordered copy of the name to index mapping
    pub fn to_map(&self) -> Vec<(String, usize)> {
        self.iter().map(|(n, i)| (n.to_string(), i)).collect()
    }

    /// Schema of a cartesian product with `right`.
    ///
    /// Left columns keep their names. A right column whose name also exists
    /// on the left is renamed to `prefix + name`; every right column is
    /// offset by the left width.
    pub fn concat_renaming(&self, right: &Schema, prefix: &str) -> QueryResult<Schema> {
        let mut joined = self.clone();
        for name in &right.names {
            if self.contains(name) {
                joined.push(format!("{prefix}{name}"))?;
            } else {
                joined.push(name.clone())?;
            }
        }
        Ok(joined)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (name, index) in self.iter() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={index}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexes_follow_insertion_order() {
        let schema = Schema::new(["id", "species", "speed"]).unwrap();
        assert_eq!(schema.index_of("id").unwrap(), 0);
        assert_eq!(schema.index_of("speed").unwrap(), 2);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.name_at(1), Some("species"));
    }

    #[test]
    fn test_unknown_column() {
        let schema = Schema::new(["id"]).unwrap();
        assert_eq!(
            schema.index_of("name").unwrap_err(),
            QueryError::UnknownColumn("name".into())
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Schema::new(["a", "b", "a"]).unwrap_err();
        assert_eq!(err, QueryError::DuplicateColumn("a".into()));
    }

    #[test]
    fn test_equality_is_ordered() {
        let ab = Schema::new(["a", "b"]).unwrap();
        let ba = Schema::new(["b", "a"]).unwrap();
        assert_ne!(ab, ba);
        assert_eq!(ab, Schema::new(["a", "b"]).unwrap());
    }

    #[test]
    fn test_concat_renaming() {
        let left = Schema::new(["species", "legs"]).unwrap();
        let right = Schema::new(["species", "color"]).unwrap();
        let joined = left.concat_renaming(&right, "right_").unwrap();

        assert_eq!(
            joined.to_map(),
            vec![
                ("species".to_string(), 0),
                ("legs".to_string(), 1),
                ("right_species".to_string(), 2),
                ("color".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_concat_renaming_collision_with_existing_prefixed_name() {
        let left = Schema::new(["a", "right_a"]).unwrap();
        let right = Schema::new(["a"]).unwrap();
        let err = left.concat_renaming(&right, "right_").unwrap_err();
        assert_eq!(err, QueryError::DuplicateColumn("right_a".into()));
    }

    #[test]
    fn test_display() {
        let schema = Schema::new(["a", "b"]).unwrap();
        assert_eq!(schema.to_string(), "{a=0, b=1}");
    }
}
