//! Tagged build-file values.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::origin::Origin;

/// Payload of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    None,
    Boolean(bool),
    Integer(i64),
    String(String),
    List(Vec<Value>),
    Scope(BTreeMap<String, Value>),
}

/// A build-file value together with the location that produced it.
///
/// Equality, ordering and hashing look at the payload only. Two values with
/// identical contents but different origins compare equal.
#[derive(Debug, Clone)]
pub struct Value {
    kind: ValueKind,
    origin: Option<Origin>,
}

impl Value {
    pub fn new(kind: ValueKind, origin: Option<Origin>) -> Self {
        Self { kind, origin }
    }

    pub fn none() -> Self {
        Self::new(ValueKind::None, None)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ValueKind::Boolean(value), None)
    }

    pub fn integer(value: i64) -> Self {
        Self::new(ValueKind::Integer(value), None)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ValueKind::String(value.into()), None)
    }

    pub fn list(items: Vec<Value>) -> Self {
        Self::new(ValueKind::List(items), None)
    }

    pub fn scope(values: BTreeMap<String, Value>) -> Self {
        Self::new(ValueKind::Scope(values), None)
    }

    /// Returns this value re-attributed to `origin`.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn set_origin(&mut self, origin: Option<Origin>) {
        self.origin = origin;
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ValueKind::None => "none",
            ValueKind::Boolean(_) => "boolean",
            ValueKind::Integer(_) => "integer",
            ValueKind::String(_) => "string",
            ValueKind::List(_) => "list",
            ValueKind::Scope(_) => "scope",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            ValueKind::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match &self.kind {
            ValueKind::List(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind.cmp(&other.kind)
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

/// Escapes a string the way it would be written inside a build file literal.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' | '$' | '\\' => write!(f, "\\{}", c)?,
            _ => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::None => write!(f, "<void>"),
            ValueKind::Boolean(b) => write!(f, "{}", b),
            ValueKind::Integer(i) => write!(f, "{}", i),
            ValueKind::String(s) => write_quoted(f, s),
            ValueKind::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ValueKind::Scope(values) => {
                if values.is_empty() {
                    return write!(f, "{{ }}");
                }
                write!(f, "{{ ")?;
                for (idx, (name, value)) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", name, value)?;
                }
                write!(f, " }}")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.kind {
            ValueKind::None => serializer.serialize_unit(),
            ValueKind::Boolean(b) => serializer.serialize_bool(*b),
            ValueKind::Integer(i) => serializer.serialize_i64(*i),
            ValueKind::String(s) => serializer.serialize_str(s),
            ValueKind::List(items) => serializer.collect_seq(items),
            ValueKind::Scope(values) => serializer.collect_map(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_origin() {
        let a = Value::string("avalue").with_origin(Origin::at("//BUILD.gn", 1));
        let b = Value::string("avalue").with_origin(Origin::at("//other.gni", 9));
        assert_eq!(a, b);
        assert_ne!(a, Value::string("bvalue"));
        assert_ne!(Value::integer(1), Value::boolean(true));
    }

    #[test]
    fn test_display_quotes_strings() {
        assert_eq!(Value::string("linux").to_string(), "\"linux\"");
        assert_eq!(Value::string("a\"$b").to_string(), "\"a\\\"\\$b\"");
        assert_eq!(Value::boolean(false).to_string(), "false");
        assert_eq!(Value::integer(-3).to_string(), "-3");
    }

    #[test]
    fn test_display_nested() {
        let list = Value::list(vec![Value::integer(1), Value::string("x")]);
        assert_eq!(list.to_string(), "[1, \"x\"]");

        let mut inner = BTreeMap::new();
        inner.insert("b".to_string(), Value::boolean(true));
        inner.insert("a".to_string(), Value::integer(2));
        assert_eq!(Value::scope(inner).to_string(), "{ a = 2, b = true }");
        assert_eq!(Value::scope(BTreeMap::new()).to_string(), "{ }");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::boolean(true).as_bool(), Some(true));
        assert_eq!(Value::integer(7).as_int(), Some(7));
        assert_eq!(Value::string("x").as_str(), Some("x"));
        assert!(Value::string("x").as_bool().is_none());
        assert_eq!(Value::none().type_name(), "none");
    }

    #[test]
    fn test_serialize_json() {
        let mut inner = BTreeMap::new();
        inner.insert("enabled".to_string(), Value::boolean(true));
        let value = Value::list(vec![
            Value::string("a"),
            Value::integer(2),
            Value::scope(inner),
            Value::none(),
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!(["a", 2, {"enabled": true}, null]));
    }
}
