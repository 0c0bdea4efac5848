//! Server value conventions.
//!
//! The ORM serializes relational fields as `[id, "Display Name"]` pairs
//! and unset scalars as the literal `false`, so plain derives do not fit.
//! The helpers here absorb both quirks at the deserialization boundary.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Record identifier on the server side.
pub type OdooId = i64;

/// A many2one reference.
///
/// On the wire this arrives as `[id, "Display Name"]`, a bare id, or
/// `false` when unset. Use [`many2one_opt`] for fields that may be unset.
/// Serializing writes the bare id, which is what `create`/`write` expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Many2One {
    pub id: OdooId,
    pub name: Option<String>,
}

impl Many2One {
    pub fn new(id: OdooId) -> Self {
        Self { id, name: None }
    }

    /// Display name, falling back to the id.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Many2One {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        many2one_from_value(&value)
            .ok_or_else(|| de::Error::custom("expected [id, name] pair or integer id"))
    }
}

impl Serialize for Many2One {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.id)
    }
}

fn many2one_from_value(value: &Value) -> Option<Many2One> {
    match value {
        Value::Array(pair) => {
            let id = pair.first()?.as_i64()?;
            let name = pair.get(1).and_then(Value::as_str).map(str::to_string);
            Some(Many2One { id, name })
        }
        Value::Number(n) => n.as_i64().map(Many2One::new),
        _ => None,
    }
}

/// Deserialize a many2one field that may be `false`.
pub fn many2one_opt<'de, D>(deserializer: D) -> Result<Option<Many2One>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Bool(false) | Value::Null => Ok(None),
        other => many2one_from_value(&other)
            .map(Some)
            .ok_or_else(|| de::Error::custom("expected [id, name] pair, integer id, or false")),
    }
}

/// Deserialize a text field where the server sends `false` for empty.
pub fn string_or_false<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Bool(false) | Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(de::Error::custom(format!(
            "expected string or false, got {other}"
        ))),
    }
}

/// Deserialize a float field where the server sends `false` for empty.
pub fn f64_or_false<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Bool(false) | Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        other => Err(de::Error::custom(format!(
            "expected number or false, got {other}"
        ))),
    }
}

/// Deserialize an integer field where the server sends `false` for empty.
/// Numeric strings are accepted too; char columns holding sequence
/// numbers come back as text.
pub fn i64_or_false<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Bool(false) | Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_i64()),
        Value::String(s) => Ok(s.trim().parse().ok()),
        other => Err(de::Error::custom(format!(
            "expected integer or false, got {other}"
        ))),
    }
}
