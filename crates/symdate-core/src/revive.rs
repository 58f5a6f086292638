//! # JSON Revival: Typed Dates Out of Plain JSON
//!
//! JSON has no date type, so a `SymbolicDate` travels as its `YYYY-MM-DD`
//! string. This module turns such strings back into dates in a single pass
//! over parsed JSON.
//!
//! ## Walk Order
//!
//! The reviver is called once per key/value pair, depth first, with every
//! child revived before its parent is handed to the reviver. Array elements
//! are keyed by their decimal index and the root by the empty string. A
//! reviver returning `None` drops the pair from its object; in an array, or
//! at the root, the slot becomes `null`.
//!
//! Nothing is registered implicitly. Callers pass
//! [`revive_symbolic_date`] (or their own reviver) to [`parse_with_reviver`].

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::date::SymbolicDate;
use crate::error::DateError;

/// A parsed JSON value whose leaves may be symbolic dates.
///
/// Object members keep the order they had in the source text.
#[derive(Debug, Clone, PartialEq)]
pub enum RevivedValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(SymbolicDate),
    Array(Vec<RevivedValue>),
    Object(Vec<(String, RevivedValue)>),
}

impl RevivedValue {
    /// Look up an object member by key.
    pub fn get(&self, key: &str) -> Option<&RevivedValue> {
        match self {
            Self::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up an array element by index.
    pub fn at(&self, index: usize) -> Option<&RevivedValue> {
        match self {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// The date, if this value is one.
    pub fn as_date(&self) -> Option<&SymbolicDate> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }

    /// The string, if this value is a plain string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Every date in the tree with its JSON pointer (RFC 6901), in
    /// document order.
    pub fn dates(&self) -> Vec<(String, &SymbolicDate)> {
        let mut out = Vec::new();
        collect_dates(self, String::new(), &mut out);
        out
    }

    /// JSON pointers of every date in the tree, in document order.
    pub fn date_pointers(&self) -> Vec<String> {
        self.dates().into_iter().map(|(pointer, _)| pointer).collect()
    }

    /// Convert back to plain JSON, writing dates in their canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::InvalidDate`] if the tree holds an invalid date.
    pub fn into_json(self) -> Result<Value, DateError> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Number(n) => Value::Number(n),
            Self::String(s) => Value::String(s),
            Self::Date(date) => Value::String(date.to_json()?),
            Self::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(RevivedValue::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            Self::Object(members) => {
                let mut map = serde_json::Map::with_capacity(members.len());
                for (k, v) in members {
                    map.insert(k, v.into_json()?);
                }
                Value::Object(map)
            }
        })
    }
}

/// Wrap plain JSON without reviving anything.
impl From<Value> for RevivedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<SymbolicDate> for RevivedValue {
    fn from(date: SymbolicDate) -> Self {
        Self::Date(date)
    }
}

impl Serialize for RevivedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Date(date) => date.serialize(serializer),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (k, v) in members {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Reviver that upgrades calendar-date strings to [`SymbolicDate`].
///
/// A string becomes a date only if [`SymbolicDate::parse`] accepts it;
/// every other value, including strings like `20221201`, passes through
/// unchanged. Never drops a value.
pub fn revive_symbolic_date(key: &str, value: RevivedValue) -> Option<RevivedValue> {
    match value {
        RevivedValue::String(text) => {
            let date = SymbolicDate::parse(&text);
            if date.is_valid() {
                tracing::trace!(key, date = %text, "revived calendar date");
                Some(RevivedValue::Date(date))
            } else {
                Some(RevivedValue::String(text))
            }
        }
        other => Some(other),
    }
}

/// Parse JSON text, passing every key/value pair through `reviver`.
///
/// # Errors
///
/// Returns [`DateError::Json`] if `text` is not valid JSON.
pub fn parse_with_reviver<F>(text: &str, reviver: F) -> Result<RevivedValue, DateError>
where
    F: FnMut(&str, RevivedValue) -> Option<RevivedValue>,
{
    let value: Value = serde_json::from_str(text)?;
    Ok(revive_value(value, reviver))
}

/// Parse JSON text, reviving every calendar-date string.
pub fn parse_reviving_dates(text: &str) -> Result<RevivedValue, DateError> {
    parse_with_reviver(text, revive_symbolic_date)
}

/// Run the revival walk over already-parsed JSON.
pub fn revive_value<F>(value: Value, mut reviver: F) -> RevivedValue
where
    F: FnMut(&str, RevivedValue) -> Option<RevivedValue>,
{
    walk("", value, &mut reviver).unwrap_or(RevivedValue::Null)
}

fn walk<F>(key: &str, value: Value, reviver: &mut F) -> Option<RevivedValue>
where
    F: FnMut(&str, RevivedValue) -> Option<RevivedValue>,
{
    let holder = match value {
        Value::Array(items) => {
            let mut revived = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let slot = walk(&index.to_string(), item, &mut *reviver);
                revived.push(slot.unwrap_or(RevivedValue::Null));
            }
            RevivedValue::Array(revived)
        }
        Value::Object(map) => {
            let mut revived = Vec::with_capacity(map.len());
            for (k, v) in map {
                if let Some(member) = walk(&k, v, &mut *reviver) {
                    revived.push((k, member));
                }
            }
            RevivedValue::Object(revived)
        }
        leaf => RevivedValue::from(leaf),
    };
    reviver(key, holder)
}

fn collect_dates<'a>(
    value: &'a RevivedValue,
    pointer: String,
    out: &mut Vec<(String, &'a SymbolicDate)>,
) {
    match value {
        RevivedValue::Date(date) => out.push((pointer, date)),
        RevivedValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_dates(item, format!("{pointer}/{index}"), out);
            }
        }
        RevivedValue::Object(members) => {
            for (k, v) in members {
                let escaped = k.replace('~', "~0").replace('/', "~1");
                collect_dates(v, format!("{pointer}/{escaped}"), out);
            }
        }
        _ => {}
    }
}
