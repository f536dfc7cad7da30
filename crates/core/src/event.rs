//! Validated log events and their record encoding.

use serde_json::{Map, Number, Value as Json};

use crate::error::{EncodeErrorCode, Error, Result};
use crate::limits::MAX_ENCODE_DEPTH;
use crate::validation::validate;
use crate::value::{Fields, Value};

/// A log event: a non-empty mapping that passed validation.
#[derive(Debug, Clone)]
pub struct Event(Value);

impl Event {
    /// Validates a candidate and wraps it.
    pub fn new(candidate: impl Into<Value>) -> Result<Self> {
        let value = candidate.into();
        validate(&value)?;
        Ok(Self(value))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn field_count(&self) -> usize {
        self.0.field_count().unwrap_or(0)
    }
}

impl TryFrom<Value> for Event {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<serde_json::Value> for Event {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        Self::new(value)
    }
}

/// Encodes an event as one compact UTF-8 JSON document.
///
/// Keys keep their insertion order and non-ASCII text is written verbatim.
/// The record separator is not included.
pub fn encode_record(event: &Event) -> Result<Vec<u8>> {
    let mut encoder = Encoder::default();
    let json = encoder.encode(event.value(), 0)?;
    Ok(serde_json::to_vec(&json)?)
}

/// Tracks the shared maps on the current path to detect cycles.
#[derive(Default)]
struct Encoder {
    path: Vec<usize>,
}

impl Encoder {
    /// `depth` counts the containers enclosing `value`.
    fn encode(&mut self, value: &Value, depth: usize) -> Result<Json> {
        if matches!(value, Value::List(_) | Value::Map(_) | Value::Shared(_))
            && depth + 1 >= MAX_ENCODE_DEPTH
        {
            return Err(Error::encode(
                EncodeErrorCode::TooDeep,
                format!("nesting reaches {} levels", MAX_ENCODE_DEPTH),
            ));
        }

        Ok(match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::Number((*i).into()),
            Value::UInt(u) => Json::Number((*u).into()),
            Value::Float(f) => Number::from_f64(*f).map(Json::Number).ok_or_else(|| {
                Error::encode(
                    EncodeErrorCode::NonFinite,
                    format!("{} has no JSON representation", f),
                )
            })?,
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(
                items
                    .iter()
                    .map(|item| self.encode(item, depth + 1))
                    .collect::<Result<_>>()?,
            ),
            Value::Map(fields) => self.encode_fields(fields, depth)?,
            Value::Shared(map) => {
                let addr = map.addr();
                if self.path.contains(&addr) {
                    return Err(Error::encode(
                        EncodeErrorCode::Cyclic,
                        "mapping contains a reference to itself",
                    ));
                }
                self.path.push(addr);
                let encoded = self.encode_fields(&map.read(), depth);
                self.path.pop();
                encoded?
            }
        })
    }

    fn encode_fields(&mut self, fields: &Fields, depth: usize) -> Result<Json> {
        let mut out = Map::with_capacity(fields.len());
        for (key, value) in fields.iter() {
            out.insert(key.to_string(), self.encode(value, depth + 1)?);
        }
        Ok(Json::Object(out))
    }
}
