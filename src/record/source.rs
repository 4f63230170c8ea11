//! Record sources: domain values in, rows out
//!
//! Fields are exposed through an explicit accessor table rather than
//! discovered at runtime. A serde-based source is provided for types that
//! already implement `Serialize`.

use serde::Serialize;
use serde_json::Value;

use crate::config::{MissingFieldPolicy, QueryConfig};
use crate::observability::Severity;
use crate::query::{Query, QueryError, QueryResult};
use crate::row::{Row, Schema};

type Accessor<T> = Box<dyn Fn(&T) -> Option<Value>>;

/// Ordered table of named field accessors.
///
/// An accessor returns `None` when the field cannot be read for an item;
/// the query's [`MissingFieldPolicy`] decides what happens next.
pub struct RecordSource<T> {
    fields: Vec<(String, Accessor<T>)>,
}

impl<T> RecordSource<T> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field that can fail to read
    pub fn field(
        mut self,
        name: impl Into<String>,
        accessor: impl Fn(&T) -> Option<Value> + 'static,
    ) -> Self {
        self.fields.push((name.into(), Box::new(accessor)));
        self
    }

    /// Adds a field that always reads
    pub fn column<V: Into<Value>>(
        self,
        name: impl Into<String>,
        accessor: impl Fn(&T) -> V + 'static,
    ) -> Self {
        self.field(name, move |item| Some(accessor(item).into()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl<T> Default for RecordSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the missing-field policy to one unreadable cell
fn unreadable(config: &QueryConfig, field: &str, record: usize) -> QueryResult<Value> {
    match config.missing_field {
        MissingFieldPolicy::Fail => Err(QueryError::MissingField {
            field: field.to_string(),
            record,
        }),
        MissingFieldPolicy::WarnAndNull => {
            let record = record.to_string();
            config.log(
                Severity::Warn,
                "ROW_SOURCE_NULL_FIELD",
                &[("field", field), ("record", record.as_str())],
            );
            Ok(Value::Null)
        }
    }
}

impl Query {
    /// Query over domain values read through `source`.
    ///
    /// Items are read lazily; an unreadable field fails (or warns) when its
    /// row is pulled.
    pub fn from_records<T, I>(
        items: I,
        source: RecordSource<T>,
        config: QueryConfig,
    ) -> QueryResult<Query>
    where
        T: 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let schema = Schema::new(source.names())?;
        let row_config = config.clone();

        let rows = items.into_iter().enumerate().map(move |(record, item)| {
            source
                .fields
                .iter()
                .map(|(name, accessor)| match accessor(&item) {
                    Some(value) => Ok(value),
                    None => unreadable(&row_config, name, record),
                })
                .collect::<QueryResult<Vec<Value>>>()
                .map(Row::new)
        });
        Ok(Query::from_stream(schema, Box::new(rows), config))
    }

    /// Query over serializable values, exposing `fields` in order.
    ///
    /// Each item must serialize to a JSON object. A field absent from that
    /// object follows the missing-field policy.
    pub fn from_serialize<T, I, S>(
        items: I,
        fields: &[S],
        config: QueryConfig,
    ) -> QueryResult<Query>
    where
        T: Serialize + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
        S: AsRef<str>,
    {
        let schema = Schema::new(fields.iter().map(|f| f.as_ref()))?;
        let names = schema.names().to_vec();
        let row_config = config.clone();

        let rows = items.into_iter().enumerate().map(move |(record, item)| {
            let mut object = match serde_json::to_value(&item) {
                Ok(Value::Object(object)) => object,
                Ok(other) => {
                    return Err(QueryError::SerializationFailed {
                        record,
                        reason: format!("expected an object, got {other}"),
                    })
                }
                Err(e) => {
                    return Err(QueryError::SerializationFailed {
                        record,
                        reason: e.to_string(),
                    })
                }
            };
            names
                .iter()
                .map(|name| match object.remove(name) {
                    Some(value) => Ok(value),
                    None => unreadable(&row_config, name, record),
                })
                .collect::<QueryResult<Vec<Value>>>()
                .map(Row::new)
        });
        Ok(Query::from_stream(schema, Box::new(rows), config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Participant {
        id: i64,
        species: &'static str,
        nickname: Option<&'static str>,
    }

    fn source() -> RecordSource<Participant> {
        RecordSource::new()
            .column("id", |p: &Participant| p.id)
            .column("species", |p: &Participant| p.species)
            .field("nickname", |p: &Participant| p.nickname.map(Value::from))
    }

    fn participants() -> Vec<Participant> {
        vec![
            Participant { id: 1, species: "fox", nickname: Some("red") },
            Participant { id: 2, species: "owl", nickname: None },
        ]
    }

    #[test]
    fn test_from_records_schema() {
        let query = Query::from_records(participants(), source(), QueryConfig::default()).unwrap();
        assert_eq!(query.schema().names(), &["id", "species", "nickname"]);
    }

    #[test]
    fn test_missing_field_fails_by_default() {
        let query = Query::from_records(participants(), source(), QueryConfig::default()).unwrap();
        let mut rows = query.into_rows();
        assert_eq!(
            rows.next().unwrap().unwrap(),
            Row::of([json!(1), json!("fox"), json!("red")])
        );
        assert_eq!(
            rows.next().unwrap().unwrap_err(),
            QueryError::MissingField { field: "nickname".into(), record: 1 }
        );
    }

    #[test]
    fn test_missing_field_warn_and_null() {
        let config = QueryConfig::default()
            .with_missing_field(MissingFieldPolicy::WarnAndNull)
            .with_log_level(Severity::Error);
        let rows = Query::from_records(participants(), source(), config)
            .unwrap()
            .list()
            .unwrap();
        assert_eq!(rows[1], Row::of([json!(2), json!("owl"), Value::Null]));
    }

    #[test]
    fn test_duplicate_field_names() {
        let source = RecordSource::new()
            .column("id", |p: &Participant| p.id)
            .column("id", |p: &Participant| p.id);
        let err = Query::from_records(participants(), source, QueryConfig::default()).unwrap_err();
        assert_eq!(err.code(), "QUERY_DUPLICATE_COLUMN");
    }

    #[derive(Serialize)]
    struct Species {
        species: String,
        color: String,
    }

    #[test]
    fn test_from_serialize() {
        let items = vec![Species { species: "fox".into(), color: "red".into() }];
        let query = Query::from_serialize(items, &["color", "species"], QueryConfig::default()).unwrap();
        assert_eq!(query.list().unwrap(), vec![Row::of(["red", "fox"])]);
    }

    #[test]
    fn test_from_serialize_missing_field() {
        let items = vec![Species { species: "fox".into(), color: "red".into() }];
        let err = Query::from_serialize(items, &["legs"], QueryConfig::default())
            .unwrap()
            .list()
            .unwrap_err();
        assert_eq!(err.code(), "RECORD_MISSING_FIELD");
    }

    #[test]
    fn test_from_serialize_rejects_scalars() {
        let err = Query::from_serialize(vec![1, 2], &["x"], QueryConfig::default())
            .unwrap()
            .list()
            .unwrap_err();
        assert_eq!(err.code(), "RECORD_SERIALIZATION_FAILED");
    }
}
