//! Record sinks: rows in, domain values out
//!
//! Every column of the query's schema must land in a writable slot of the
//! target. A column without a slot fails the row, naming the column, its
//! index and the row.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::query::{Query, QueryError, QueryResult};
use crate::row::{Row, Schema};

type Factory<T> = Box<dyn Fn() -> Option<T>>;
type Slot<T> = Box<dyn Fn(&mut T, Value) -> QueryResult<()>>;

/// Target record shape: a factory plus named writable slots
pub struct RecordSink<T> {
    factory: Factory<T>,
    slots: HashMap<String, Slot<T>>,
}

impl<T> RecordSink<T> {
    /// Sink whose records come from `factory`.
    ///
    /// A factory returning `None` fails the row with
    /// `RECORD_INSTANTIATION_FAILED`.
    pub fn new(factory: impl Fn() -> Option<T> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            slots: HashMap::new(),
        }
    }

    /// Adds a slot that receives the raw cell value
    pub fn slot(
        mut self,
        name: impl Into<String>,
        setter: impl Fn(&mut T, Value) -> QueryResult<()> + 'static,
    ) -> Self {
        self.slots.insert(name.into(), Box::new(setter));
        self
    }

    /// Adds a slot that deserializes the cell into `V` first
    pub fn typed_slot<V: DeserializeOwned>(
        self,
        name: impl Into<String>,
        setter: impl Fn(&mut T, V) + 'static,
    ) -> Self {
        let name = name.into();
        let column = name.clone();
        self.slot(name, move |target, value| {
            let value = serde_json::from_value(value).map_err(|e| QueryError::SlotWriteFailed {
                column: column.clone(),
                reason: e.to_string(),
            })?;
            setter(target, value);
            Ok(())
        })
    }

    fn build(&self, schema: &Schema, row: &Row) -> QueryResult<T> {
        let mut target = (self.factory)().ok_or(QueryError::InstantiationFailed)?;
        for (column, index) in schema.iter() {
            let slot = self.slots.get(column).ok_or_else(|| QueryError::MissingSlot {
                column: column.to_string(),
                index,
                row: row.to_string(),
            })?;
            let value = row.get(index).cloned().unwrap_or_default();
            slot(&mut target, value)?;
        }
        Ok(target)
    }
}

impl<T: Default> RecordSink<T> {
    /// Sink whose records start from `T::default()`
    pub fn with_default() -> Self {
        Self::new(|| Some(T::default()))
    }
}

fn to_object(schema: &Schema, row: Row) -> Value {
    let mut object = Map::new();
    for (name, value) in schema.names().iter().zip(row.into_values()) {
        object.insert(name.clone(), value);
    }
    Value::Object(object)
}

impl Query {
    /// Lazily routes each row into a record built by `sink`
    pub fn into_records<T: 'static>(
        self,
        sink: RecordSink<T>,
    ) -> impl Iterator<Item = QueryResult<T>> {
        let (schema, rows) = self.into_parts();
        rows.map(move |row| sink.build(&schema, &row?))
    }

    pub fn list_records<T: 'static>(self, sink: RecordSink<T>) -> QueryResult<Vec<T>> {
        self.into_records(sink).collect()
    }

    /// Lazily deserializes each row as an object keyed by column name.
    ///
    /// A column counts as having a slot when it survives a round trip
    /// through `T`: it must appear when the record is serialized again.
    pub fn deserialize<T>(self) -> impl Iterator<Item = QueryResult<T>>
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        let (schema, rows) = self.into_parts();
        rows.map(move |row| {
            let row = row?;
            let shown = row.to_string();
            let record: T = serde_json::from_value(to_object(&schema, row)).map_err(|e| {
                QueryError::DeserializationFailed {
                    row: shown.clone(),
                    reason: e.to_string(),
                }
            })?;

            let written = serde_json::to_value(&record).map_err(|e| {
                QueryError::DeserializationFailed {
                    row: shown.clone(),
                    reason: e.to_string(),
                }
            })?;
            for (column, index) in schema.iter() {
                if written.get(column).is_none() {
                    return Err(QueryError::MissingSlot {
                        column: column.to_string(),
                        index,
                        row: shown,
                    });
                }
            }
            Ok(record)
        })
    }

    pub fn list_deserialized<T>(self) -> QueryResult<Vec<T>>
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        self.deserialize().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Animal {
        id: i64,
        species: String,
    }

    fn animals() -> Query {
        let schema = Schema::new(["id", "species"]).unwrap();
        let rows = vec![
            Row::of([json!(1), json!("fox")]),
            Row::of([json!(2), json!("owl")]),
        ];
        Query::from_rows(schema, rows, QueryConfig::default())
    }

    fn sink() -> RecordSink<Animal> {
        RecordSink::with_default()
            .typed_slot("id", |a: &mut Animal, v: i64| a.id = v)
            .typed_slot("species", |a: &mut Animal, v: String| a.species = v)
    }

    #[test]
    fn test_into_records() {
        let animals = animals().list_records(sink()).unwrap();
        assert_eq!(
            animals,
            vec![
                Animal { id: 1, species: "fox".into() },
                Animal { id: 2, species: "owl".into() },
            ]
        );
    }

    #[test]
    fn test_missing_slot_names_column() {
        let sink = RecordSink::with_default().typed_slot("id", |a: &mut Animal, v: i64| a.id = v);
        let err = animals().list_records(sink).unwrap_err();
        assert_eq!(
            err,
            QueryError::MissingSlot {
                column: "species".into(),
                index: 1,
                row: "(1, fox)".into(),
            }
        );
    }

    #[test]
    fn test_instantiation_failure() {
        let sink: RecordSink<Animal> = RecordSink::new(|| None);
        let err = animals().list_records(sink).unwrap_err();
        assert_eq!(err, QueryError::InstantiationFailed);
    }

    #[test]
    fn test_typed_slot_rejects_wrong_type() {
        let sink = RecordSink::with_default()
            .typed_slot("id", |a: &mut Animal, v: i64| a.id = v)
            .typed_slot("species", |a: &mut Animal, v: i64| a.id = v);
        let err = animals().list_records(sink).unwrap_err();
        assert_eq!(err.code(), "RECORD_SLOT_WRITE_FAILED");
    }

    #[test]
    fn test_deserialize() {
        let animals: Vec<Animal> = animals().list_deserialized().unwrap();
        assert_eq!(animals[1], Animal { id: 2, species: "owl".into() });
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct OnlyId {
        id: i64,
    }

    #[test]
    fn test_deserialize_detects_missing_slot() {
        let err = animals().list_deserialized::<OnlyId>().unwrap_err();
        match err {
            QueryError::MissingSlot { column, index, .. } => {
                assert_eq!(column, "species");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
