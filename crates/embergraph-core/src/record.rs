//! # Result Records
//!
//! Output rows shaped like a remote driver's records: an ordered list of
//! named values with name→position lookup. Field names are fixed per query
//! shape, so they are carried as `&'static` slices.

use crate::{Node, PropertyValue, Relationship};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

// =============================================================================
// DRIVER INTEGER
// =============================================================================

/// A 64-bit integer split into two signed 32-bit halves, the way remote graph
/// drivers hand integers to callers that lack a native 64-bit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriverInteger {
    pub low: i32,
    pub high: i32,
}

impl DriverInteger {
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        Self {
            low: value as i32,
            high: (value >> 32) as i32,
        }
    }

    #[must_use]
    pub const fn to_i64(self) -> i64 {
        ((self.high as i64) << 32) | (self.low as u32 as i64)
    }
}

impl From<usize> for DriverInteger {
    fn from(value: usize) -> Self {
        Self::from_i64(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

// =============================================================================
// RECORD VALUE
// =============================================================================

/// A single value in a result record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// Explicit blank (e.g. no relationship in an expansion row).
    Null,
    Node(Node),
    Relationship(Relationship),
    Integer(DriverInteger),
    /// A plain scalar such as an identifier or a constant.
    Value(PropertyValue),
}

impl RecordValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Self::Relationship(rel) => Some(rel),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<DriverInteger> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(v) => v.as_str(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Value(v) => v.as_i64(),
            Self::Integer(i) => Some(i.to_i64()),
            _ => None,
        }
    }
}

impl From<Option<String>> for RecordValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, |s| Self::Value(PropertyValue::String(s)))
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// One result row. Serializes as an object of field name to value, in
/// field order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    keys: &'static [&'static str],
    values: Vec<RecordValue>,
}

impl Record {
    /// Build a record. `values` is positional against `keys`; missing
    /// trailing values read as absent.
    #[must_use]
    pub fn new(keys: &'static [&'static str], values: Vec<RecordValue>) -> Self {
        Self { keys, values }
    }

    /// Field names in output order.
    #[must_use]
    pub fn keys(&self) -> &'static [&'static str] {
        self.keys
    }

    /// Values in output order.
    #[must_use]
    pub fn values(&self) -> &[RecordValue] {
        &self.values
    }

    /// Position of a field, if the record has it.
    #[must_use]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| *k == key)
    }

    /// Value of a field by name. Unknown names yield `None`, never an error.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.index_of(key).and_then(|pos| self.values.get(pos))
    }

    /// Number of fields, counting fields whose value is absent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the record has no fields at all, populated or not.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for (pos, key) in self.keys.iter().enumerate() {
            map.serialize_entry(key, self.values.get(pos).unwrap_or(&RecordValue::Null))?;
        }
        map.end()
    }
}

/// The `{records}` envelope returned by every query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub records: Vec<Record>,
}

impl QueryResult {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// First record, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
