//! Firestore REST API wire types: document values and structured queries.
//!
//! Mirrors the shapes documented for `projects.databases.documents` — `Value`,
//! `Document`, and the `runQuery` request body (`StructuredQuery` and friends).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A Firestore typed value. Only the variants this platform's models actually produce
/// are implemented; Firestore's wire format has more (geo points, references, bytes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "nullValue")]
    Null(()),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "integerValue")]
    Integer(String),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "timestampValue")]
    Timestamp(String),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "mapValue")]
    Map(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

/// A Firestore document as returned by `get`/`list`/`runQuery`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(rename = "createTime", default)]
    pub create_time: Option<String>,
    #[serde(rename = "updateTime", default)]
    pub update_time: Option<String>,
}

/// Converts a Rust type into a Firestore field map, via an intermediate `serde_json::Value`.
pub trait ToFirestoreFields {
    fn to_firestore_fields(&self) -> Result<BTreeMap<String, Value>, serde_json::Error>;
}

impl<T: Serialize> ToFirestoreFields for T {
    fn to_firestore_fields(&self) -> Result<BTreeMap<String, Value>, serde_json::Error> {
        let json = serde_json::to_value(self)?;
        Ok(json_to_map(json))
    }
}

/// Converts a Firestore document's field map back into a Rust type, via `serde_json::Value`.
pub fn fields_to_type<T: for<'de> Deserialize<'de>>(
    fields: &BTreeMap<String, Value>,
) -> Result<T, serde_json::Error> {
    let json = map_to_json(fields);
    serde_json::from_value(json)
}

fn json_to_value(json: Json) -> Value {
    match json {
        Json::Null => Value::Null(()),
        Json::Bool(b) => Value::Boolean(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i.to_string())
            } else {
                Value::Double(n.as_f64().unwrap_or(0.0))
            }
        }
        Json::String(s) => {
            // RFC3339 timestamps round-trip as Firestore timestampValue; everything
            // else (including plain strings that merely look numeric) stays a string.
            if DateTime::parse_from_rfc3339(&s).is_ok() {
                Value::Timestamp(s)
            } else {
                Value::String(s)
            }
        }
        Json::Array(items) => Value::Array(ArrayValue {
            values: items.into_iter().map(json_to_value).collect(),
        }),
        Json::Object(map) => Value::Map(MapValue {
            fields: map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect(),
        }),
    }
}

fn json_to_map(json: Json) -> BTreeMap<String, Value> {
    match json {
        Json::Object(map) => map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect(),
        _ => BTreeMap::new(),
    }
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null(()) => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Integer(s) => s
            .parse::<i64>()
            .map(|i| Json::Number(i.into()))
            .unwrap_or(Json::Null),
        Value::Double(d) => serde_json::Number::from_f64(*d)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::Timestamp(s) => Json::String(s.clone()),
        Value::Array(a) => Json::Array(a.values.iter().map(value_to_json).collect()),
        Value::Map(m) => Json::Object(m.fields.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect()),
    }
}

fn map_to_json(fields: &BTreeMap<String, Value>) -> Json {
    Json::Object(fields.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect())
}

pub fn timestamp_to_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

// --- `runQuery` request body -------------------------------------------------------
//
// The retrieved `sorting.rs` and `credit_transaction_repo.rs` call `client.run_query`
// against these types, but neither the types nor the method were present anywhere in
// this snapshot. Authored here against Firestore's published `StructuredQuery` schema
// so those two existing call sites (and the new due-for-scan queries) have somewhere
// real to land.

#[derive(Debug, Clone, Serialize)]
pub struct RunQueryRequest {
    #[serde(rename = "structuredQuery")]
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Filter>,
    #[serde(rename = "orderBy", skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<Order>,
    #[serde(rename = "startAt", skip_serializing_if = "Option::is_none")]
    pub start_at: Option<Cursor>,
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionSelector {
    #[serde(rename = "collectionId")]
    pub collection_id: String,
    #[serde(rename = "allDescendants", skip_serializing_if = "is_false")]
    pub all_descendants: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldReference {
    #[serde(rename = "fieldPath")]
    pub field_path: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldOp {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: FieldOp,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompositeFilter {
    pub op: CompositeOp,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositeOp {
    And,
}

#[derive(Debug, Clone, Serialize)]
pub enum Filter {
    #[serde(rename = "fieldFilter")]
    Field(FieldFilter),
    #[serde(rename = "compositeFilter")]
    Composite(CompositeFilter),
}

impl Filter {
    pub fn field(path: impl Into<String>, op: FieldOp, value: Value) -> Self {
        Filter::Field(FieldFilter {
            field: FieldReference { field_path: path.into() },
            op,
            value,
        })
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::Composite(CompositeFilter {
            op: CompositeOp::And,
            filters,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub field: FieldReference,
    pub direction: Direction,
}

impl Order {
    pub fn by(path: impl Into<String>, direction: Direction) -> Self {
        Order {
            field: FieldReference { field_path: path.into() },
            direction,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Cursor {
    pub values: Vec<Value>,
    pub before: bool,
}

/// One row of a `runQuery` streamed response.
#[derive(Debug, Clone, Deserialize)]
pub struct RunQueryResponseItem {
    pub document: Option<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        count: u32,
        active: bool,
    }

    #[test]
    fn round_trips_through_firestore_fields() {
        let sample = Sample {
            name: "x".into(),
            count: 7,
            active: true,
        };
        let fields = sample.to_firestore_fields().unwrap();
        let back: Sample = fields_to_type(&fields).unwrap();
        assert_eq!(sample, back);
    }

    #[test]
    fn query_serializes_field_path_not_snake_struct_name() {
        let query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: "channels".into(),
                all_descendants: false,
            }],
            r#where: Some(Filter::field("next_scan_at", FieldOp::LessThanOrEqual, Value::Timestamp("2024-01-01T00:00:00Z".into()))),
            order_by: vec![Order::by("next_scan_at", Direction::Ascending)],
            start_at: None,
            limit: Some(50),
        };
        let json = serde_json::to_string(&RunQueryRequest { structured_query: query }).unwrap();
        assert!(json.contains("\"fieldPath\":\"next_scan_at\""));
        assert!(json.contains("\"LESS_THAN_OR_EQUAL\""));
    }
}
