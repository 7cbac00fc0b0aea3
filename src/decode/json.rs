//! JSON probing and decoding.
//!
//! Shape rules per representation:
//! - mapping: an object is returned as is, a top-level array is wrapped as `{"data": [...]}`
//! - sequence: an array is returned as is, a top-level object is wrapped as `[{...}]`
//! - table: an object is one row, an array of objects one row per element; nested objects
//!   flatten into dot-path columns (`user.name`) and nested arrays are kept as JSON text; two
//!   keys that flatten to the same column are a shape error

use std::collections::HashSet;

use serde_json::{Map, Value as JsonValue};

use crate::error::{DecodeError, DecodeResult};
use crate::resource::ResourceDescriptor;
use crate::types::{DataSet, Representation, Value};

use super::table::TableBuilder;

/// Key used when a top-level array is wrapped into a mapping.
pub const WRAPPED_ARRAY_KEY: &str = "data";

/// Admissible iff the whole text parses as one JSON document.
pub fn probe_json(resource: &ResourceDescriptor) -> DecodeResult<()> {
    parse_json(resource).map(|_| ())
}

fn parse_json(resource: &ResourceDescriptor) -> DecodeResult<JsonValue> {
    let text = resource.text().ok_or(DecodeError::NotText)?;
    Ok(serde_json::from_str::<JsonValue>(text)?)
}

/// Decode into [`Representation::Mapping`].
pub fn decode_json_mapping(resource: &mut ResourceDescriptor) -> DecodeResult<Representation> {
    json_to_mapping(parse_json(resource)?).map(Representation::Mapping)
}

/// Decode into [`Representation::Sequence`].
pub fn decode_json_sequence(resource: &mut ResourceDescriptor) -> DecodeResult<Representation> {
    json_to_sequence(parse_json(resource)?).map(Representation::Sequence)
}

/// Decode into [`Representation::Table`].
pub fn decode_json_table(resource: &mut ResourceDescriptor) -> DecodeResult<Representation> {
    json_to_table(&parse_json(resource)?).map(Representation::Table)
}

pub fn json_to_mapping(value: JsonValue) -> DecodeResult<Map<String, JsonValue>> {
    match value {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Array(items) => {
            let mut map = Map::new();
            map.insert(WRAPPED_ARRAY_KEY.to_string(), JsonValue::Array(items));
            Ok(map)
        }
        other => Err(DecodeError::shape(format!(
            "json scalar {other} cannot be represented as a mapping"
        ))),
    }
}

pub fn json_to_sequence(value: JsonValue) -> DecodeResult<Vec<JsonValue>> {
    match value {
        JsonValue::Array(items) => Ok(items),
        obj @ JsonValue::Object(_) => Ok(vec![obj]),
        other => Err(DecodeError::shape(format!(
            "json scalar {other} cannot be represented as a sequence"
        ))),
    }
}

pub fn json_to_table(value: &JsonValue) -> DecodeResult<DataSet> {
    let mut builder = TableBuilder::new();
    match value {
        JsonValue::Object(obj) => builder.push_row(flatten_record(obj)?),
        JsonValue::Array(items) => {
            for (idx0, item) in items.iter().enumerate() {
                let obj = item.as_object().ok_or_else(|| {
                    DecodeError::shape(format!("row {} is not a json object", idx0 + 1))
                })?;
                builder.push_row(flatten_record(obj)?);
            }
        }
        other => {
            return Err(DecodeError::shape(format!(
                "json scalar {other} cannot be represented as a table"
            )));
        }
    }
    Ok(builder.finish())
}

/// Flatten one record into `(dot.path, cell)` pairs.
///
/// A literal key that spells an existing dot path (`{"a.b": 1, "a": {"b": 2}}`) is a shape
/// error; the record has no single-column reading.
fn flatten_record(obj: &Map<String, JsonValue>) -> DecodeResult<Vec<(String, Value)>> {
    let mut out = Vec::with_capacity(obj.len());
    let mut seen = HashSet::with_capacity(obj.len());
    flatten_into(&mut out, &mut seen, None, obj)?;
    Ok(out)
}

fn flatten_into(
    out: &mut Vec<(String, Value)>,
    seen: &mut HashSet<String>,
    prefix: Option<&str>,
    obj: &Map<String, JsonValue>,
) -> DecodeResult<()> {
    for (key, v) in obj {
        let path = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match v {
            JsonValue::Object(child) => flatten_into(out, seen, Some(&path), child)?,
            other => {
                if !seen.insert(path.clone()) {
                    return Err(DecodeError::shape(format!(
                        "column '{path}' is produced by more than one key"
                    )));
                }
                out.push((path, json_cell(other)));
            }
        }
    }
    Ok(())
}

fn json_cell(v: &JsonValue) -> Value {
    match v {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int64(i),
            None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::Utf8(s.clone()),
        // Arrays have no columnar projection; keep them as their JSON text.
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Utf8(v.to_string()),
    }
}
