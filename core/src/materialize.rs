//! Response materialization.
//!
//! # Design
//! The set of response shapes is closed, so `Shape` is a plain enum and
//! `materialize` is one match. Every decoder first parses the body into a
//! `serde_json::Value` and only builds the typed result once the whole
//! payload has been checked, so a failure never yields a half-filled value.
//! `serde_json` is built with `preserve_order`, which keeps object key order
//! from the payload all the way into the `IndexMap`s of a nested mapping.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::trace;

use crate::cursor::CursorPage;
use crate::dispatch::RawResponse;
use crate::error::ApiError;

/// Item keys tried, in order, when a cursor page does not name its own.
pub const CURSOR_ITEM_KEYS: [&str; 4] = ["ids", "users", "lists", "events"];

/// How a response body is turned into a typed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// The whole body is one `T`.
    Entity,
    /// The body is a JSON array of `T`.
    Sequence,
    /// `name -> name -> T`, optionally found under a top-level field.
    NestedMapping { unwrap: Option<String> },
    /// One top-level field, coerced to `T`.
    ScalarField(String),
    /// A cursored list of `T` with `previous_cursor` / `next_cursor`.
    CursorPage { items: Option<String> },
}

impl Shape {
    pub fn scalar_field(name: &str) -> Self {
        Shape::ScalarField(name.to_string())
    }

    pub fn nested() -> Self {
        Shape::NestedMapping { unwrap: None }
    }

    pub fn nested_under(field: &str) -> Self {
        Shape::NestedMapping {
            unwrap: Some(field.to_string()),
        }
    }

    pub fn cursor_page() -> Self {
        Shape::CursorPage { items: None }
    }

    pub fn cursor_page_of(items: &str) -> Self {
        Shape::CursorPage {
            items: Some(items.to_string()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Shape::Entity => "entity",
            Shape::Sequence => "sequence",
            Shape::NestedMapping { .. } => "nested mapping",
            Shape::ScalarField(_) => "scalar field",
            Shape::CursorPage { .. } => "cursor page",
        }
    }
}

/// A decoded response, one variant per `Shape`.
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized<T> {
    Entity(T),
    Sequence(Vec<T>),
    NestedMapping(IndexMap<String, IndexMap<String, T>>),
    Scalar(T),
    Page(CursorPage<T>),
}

impl<T> Materialized<T> {
    fn kind(&self) -> &'static str {
        match self {
            Materialized::Entity(_) => "entity",
            Materialized::Sequence(_) => "sequence",
            Materialized::NestedMapping(_) => "nested mapping",
            Materialized::Scalar(_) => "scalar field",
            Materialized::Page(_) => "cursor page",
        }
    }

    fn mismatch(self, wanted: &str) -> ApiError {
        ApiError::Decode(format!("expected {wanted}, materialized {}", self.kind()))
    }

    pub fn into_entity(self) -> Result<T, ApiError> {
        match self {
            Materialized::Entity(v) => Ok(v),
            other => Err(other.mismatch("entity")),
        }
    }

    pub fn into_sequence(self) -> Result<Vec<T>, ApiError> {
        match self {
            Materialized::Sequence(v) => Ok(v),
            other => Err(other.mismatch("sequence")),
        }
    }

    pub fn into_nested(self) -> Result<IndexMap<String, IndexMap<String, T>>, ApiError> {
        match self {
            Materialized::NestedMapping(v) => Ok(v),
            other => Err(other.mismatch("nested mapping")),
        }
    }

    pub fn into_scalar(self) -> Result<T, ApiError> {
        match self {
            Materialized::Scalar(v) => Ok(v),
            other => Err(other.mismatch("scalar field")),
        }
    }

    pub fn into_page(self) -> Result<CursorPage<T>, ApiError> {
        match self {
            Materialized::Page(v) => Ok(v),
            other => Err(other.mismatch("cursor page")),
        }
    }
}

/// Decode `raw` according to `shape`.
pub fn materialize<T: DeserializeOwned>(raw: &RawResponse, shape: &Shape) -> Result<Materialized<T>, ApiError> {
    let body = raw.body.trim();
    if body.is_empty() {
        return Err(ApiError::Decode(format!("empty body for {} response", shape.name())));
    }
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    trace!(shape = shape.name(), "materialize");

    match shape {
        Shape::Entity => decode(value).map(Materialized::Entity),
        Shape::Sequence => decode_sequence(value).map(Materialized::Sequence),
        Shape::NestedMapping { unwrap } => decode_nested(value, unwrap.as_deref()).map(Materialized::NestedMapping),
        Shape::ScalarField(field) => decode_scalar(value, field).map(Materialized::Scalar),
        Shape::CursorPage { items } => decode_page(value, items.as_deref()).map(Materialized::Page),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode_sequence<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    if !value.is_array() {
        return Err(ApiError::Decode("expected a JSON array".to_string()));
    }
    decode(value)
}

fn top_level_object(value: Value) -> Result<Map<String, Value>, ApiError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::Decode("expected a JSON object at top level".to_string())),
    }
}

fn decode_nested<T: DeserializeOwned>(
    value: Value,
    unwrap: Option<&str>,
) -> Result<IndexMap<String, IndexMap<String, T>>, ApiError> {
    let inner = match unwrap {
        Some(field) => top_level_object(value)?
            .remove(field)
            .ok_or_else(|| ApiError::MissingField(field.to_string()))?,
        None => value,
    };
    if !inner.is_object() {
        return Err(ApiError::Decode("expected a JSON object of objects".to_string()));
    }
    decode(inner)
}

fn decode_scalar<T: DeserializeOwned>(value: Value, field: &str) -> Result<T, ApiError> {
    let field_value = top_level_object(value)?
        .remove(field)
        .ok_or_else(|| ApiError::MissingField(field.to_string()))?;

    match serde_json::from_value::<T>(field_value.clone()) {
        Ok(v) => Ok(v),
        // Scalars may arrive quoted, or unquoted where text is wanted.
        Err(first) => {
            let retry = match field_value {
                Value::String(text) => serde_json::from_str(&text).ok(),
                Value::Number(_) | Value::Bool(_) => {
                    serde_json::from_value(Value::String(field_value.to_string())).ok()
                }
                _ => None,
            };
            retry.ok_or_else(|| ApiError::Decode(format!("field `{field}`: {first}")))
        }
    }
}

fn cursor_value(map: &Map<String, Value>, name: &str) -> Result<i64, ApiError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| ApiError::Decode(format!("`{name}` is not a signed 64-bit integer"))),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| ApiError::Decode(format!("`{name}` is not a signed 64-bit integer"))),
        Some(_) => Err(ApiError::Decode(format!("`{name}` is not a signed 64-bit integer"))),
    }
}

fn decode_page<T: DeserializeOwned>(value: Value, items: Option<&str>) -> Result<CursorPage<T>, ApiError> {
    let mut map = top_level_object(value)?;
    let previous_cursor = cursor_value(&map, "previous_cursor")?;
    let next_cursor = cursor_value(&map, "next_cursor")?;

    let key = match items {
        Some(key) => key.to_string(),
        None => CURSOR_ITEM_KEYS
            .iter()
            .find(|k| map.contains_key(**k))
            .map(|k| k.to_string())
            .ok_or_else(|| ApiError::Decode("cursor page has no item array".to_string()))?,
    };
    let items_value = map
        .remove(&key)
        .ok_or_else(|| ApiError::Decode(format!("cursor page has no `{key}` array")))?;

    Ok(CursorPage {
        items: decode_sequence(items_value)?,
        previous_cursor,
        next_cursor,
    })
}
