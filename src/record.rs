// src/record.rs
//! Records and the per-source schema they are conformed to.
//!
//! A `Record` is an ordered list of named cells. Field order inside a record
//! is only cosmetic (it is what the JSON store shows); export order always
//! comes from the `Schema`.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s!(s)) }
}
impl From<String> for Value {
    fn from(s: String) -> Self { Value::Text(s) }
}
impl From<&String> for Value {
    fn from(s: &String) -> Self { Value::Text(s.clone()) }
}
impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}
impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Number(n as f64) }
}
impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Number(n as f64) }
}
impl From<u32> for Value {
    fn from(n: u32) -> Self { Value::Number(n as f64) }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    cells: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Insert or replace in place (position of an existing field is kept).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.cells.push((name, value)),
        }
    }

    /// Rendered cell text; missing fields render empty.
    pub fn cell(&self, name: &str) -> String {
        self.get(name).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of text/number fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut record = Record::new();
        // a `null` cell (how serde_json writes a non-finite number) is dropped
        while let Some((name, value)) = access.next_entry::<String, Option<Value>>()? {
            if let Some(value) = value {
                record.set(name, value);
            }
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

/* ---------------- Schema ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

#[derive(Clone, Copy, Debug)]
pub enum Fallback {
    Text(&'static str),
    Number(f64),
}

impl Fallback {
    fn value(&self) -> Value {
        match *self {
            Fallback::Text(s) => Value::Text(s!(s)),
            Fallback::Number(n) => Value::Number(n),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub header: &'static str,
    pub kind: FieldKind,
    pub fallback: Fallback,
}

impl Field {
    pub const fn text(name: &'static str, header: &'static str) -> Self {
        Self { name, header, kind: FieldKind::Text, fallback: Fallback::Text("") }
    }

    pub const fn number(name: &'static str, header: &'static str) -> Self {
        Self { name, header, kind: FieldKind::Number, fallback: Fallback::Number(0.0) }
    }

    pub const fn or(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Ordered, typed field list of one source; doubles as the ledger namespace.
#[derive(Clone, Copy, Debug)]
pub struct Schema {
    pub namespace: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| s!(f.header)).collect()
    }

    pub fn field_order(&self) -> Vec<String> {
        self.fields.iter().map(|f| s!(f.name)).collect()
    }

    /// Schema-shaped copy: every declared field present, in declared order,
    /// typed per its kind. Absent or unusable values get the field fallback.
    /// Undeclared fields are dropped.
    pub fn conform(&self, record: &Record) -> Record {
        let mut out = Record::new();
        for field in self.fields {
            let value = match (field.kind, record.get(field.name)) {
                (FieldKind::Text, Some(Value::Text(s))) if !s.is_empty() => Value::Text(s.clone()),
                (FieldKind::Text, Some(Value::Number(n))) => Value::Text(n.to_string()),
                // NaN and infinities have no JSON form
                (FieldKind::Number, Some(Value::Number(n))) if n.is_finite() => Value::Number(*n),
                (FieldKind::Number, Some(Value::Text(s))) => match s.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => Value::Number(n),
                    _ => field.fallback.value(),
                },
                _ => field.fallback.value(),
            };
            out.set(field.name, value);
        }
        out
    }
}
