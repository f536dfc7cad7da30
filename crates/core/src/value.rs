//! Dynamic values carried by log events.
//!
//! Events are schemaless: any string-keyed mapping is accepted, with values
//! of arbitrary shape. `SharedMap` lets producers alias a mapping from
//! several places, including from inside itself, so values are not
//! guaranteed to be encodable. Encodability is checked at flush time.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

/// A dynamically typed event value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// May be non-finite; such values fail to encode.
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Fields),
    Shared(SharedMap),
}

impl Value {
    /// Short name of the value's kind, used in validation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) | Self::Shared(_) => "mapping",
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Map(_) | Self::Shared(_))
    }

    /// Number of entries if this is a mapping.
    pub fn field_count(&self) -> Option<usize> {
        match self {
            Self::Map(fields) => Some(fields.len()),
            Self::Shared(map) => Some(map.len()),
            _ => None,
        }
    }
}

/// Insertion-ordered string-keyed mapping.
#[derive(Debug, Clone, Default)]
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Inserts a field. An existing key keeps its position and has its
    /// value replaced; the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// A mapping shared by reference.
///
/// Clones alias the same underlying fields. A map inserted into itself
/// forms a cycle that is never reclaimed and can never be encoded.
#[derive(Clone, Default)]
pub struct SharedMap(Arc<RwLock<Fields>>);

impl SharedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Fields) -> Self {
        Self(Arc::new(RwLock::new(fields)))
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.write().insert(key, value)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Fields> {
        self.0.read()
    }

    /// Stable identity used for cycle detection.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

// Printing the contents could recurse forever on a cycle.
impl fmt::Debug for SharedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.0.try_read().map(|fields| fields.len());
        f.debug_struct("SharedMap")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("len", &len)
            .finish()
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Fields> for Value {
    fn from(v: Fields) -> Self {
        Self::Map(v)
    }
}

impl From<SharedMap> for Value {
    fn from(v: SharedMap) -> Self {
        Self::Shared(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Map(map.into_iter().collect()),
        }
    }
}
