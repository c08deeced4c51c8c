use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Structured payload attached to an event (input/output summaries, metadata).
///
/// Keys are kept sorted so rendering and serialization are deterministic.
pub type Payload = BTreeMap<String, Value>;

/// Build a payload from key/value pairs.
pub fn payload<K, V, I>(entries: I) -> Payload
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Tagged value carried in payloads.
///
/// A closed set of primitive and nested kinds instead of an arbitrary
/// dynamic type. Integers and floats are kept apart so counts round-trip
/// exactly through JSON.
///
/// JSON integers outside the `i64` range load as a lossy `Float`. JSON has
/// no NaN or infinity, so events carrying a non-finite `Float` are rejected
/// when logged (see [`Value::is_finite`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// False if this value or anything nested in it is a NaN or infinite
    /// float.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Float(x) => x.is_finite(),
            Value::List(items) => items.iter().all(Value::is_finite),
            Value::Map(entries) => entries.values().all(Value::is_finite),
            _ => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Payload> for Value {
    fn from(map: Payload) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_and_float_stay_distinct() {
        let values = vec![Value::Int(0), Value::Float(0.5), Value::Float(2.0)];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_nested_payload() {
        let inner = payload([("title", "Result 1")]);
        let p = payload([
            ("results", Value::from(vec![Value::from(inner)])),
            ("results_count", Value::from(1)),
            ("partial", Value::Null),
        ]);

        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(
            json,
            r#"{"partial":null,"results":[{"title":"Result 1"}],"results_count":1}"#
        );
        let back: Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_display() {
        let v = Value::from(vec!["a", "b"]);
        assert_eq!(v.to_string(), "[a, b]");

        let m = Value::from(payload([("k", 1), ("j", 2)]));
        assert_eq!(m.to_string(), "{j: 2, k: 1}");
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"count": 3, "ratio": 0.25, "tags": ["x"]});
        let value = Value::from(json);
        let map = value.as_map().unwrap();
        assert_eq!(map["count"], Value::Int(3));
        assert_eq!(map["ratio"], Value::Float(0.25));
        assert_eq!(map["tags"].as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_is_finite_looks_inside_nested_values() {
        assert!(Value::from(payload([("score", 0.5)])).is_finite());
        assert!(!Value::Float(f64::NAN).is_finite());
        assert!(!Value::from(vec![Value::Int(1), Value::Float(f64::INFINITY)]).is_finite());
        assert!(!Value::from(payload([("ratio", f64::NEG_INFINITY)])).is_finite());
    }

    #[test]
    fn test_integer_beyond_i64_loads_as_float() {
        let back: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(back, Value::Float(u64::MAX as f64));

        let back: Value = serde_json::from_str("9223372036854775807").unwrap();
        assert_eq!(back, Value::Int(i64::MAX));
    }
}
