//! Scalar literals that can be bound to a placeholder.

use serde::{Deserialize, Serialize};

/// A scalar value stored in a record field or bound to a `?` placeholder.
///
/// Serialized untagged, so a `Value` reads and writes as a plain JSON
/// scalar. JSON arrays and objects have no `Value` representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL` / JSON `null`.
    Null,
    /// Boolean flag. `SQLite` stores it as the integer 0 or 1.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
}

impl Value {
    /// Convert a JSON scalar into a `Value`.
    ///
    /// Returns `None` for arrays and objects. Integers that do not fit an
    /// `i64` fall back to `Real`.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Real)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_convert() {
        assert_eq!(Value::from_json(&json!(null)), Some(Value::Null));
        assert_eq!(Value::from_json(&json!(true)), Some(Value::Boolean(true)));
        assert_eq!(Value::from_json(&json!(18)), Some(Value::Integer(18)));
        assert_eq!(Value::from_json(&json!(1.5)), Some(Value::Real(1.5)));
        assert_eq!(
            Value::from_json(&json!("alice")),
            Some(Value::Text("alice".to_string()))
        );
    }

    #[test]
    fn json_containers_are_not_values() {
        assert_eq!(Value::from_json(&json!([1, 2])), None);
        assert_eq!(Value::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn huge_unsigned_falls_back_to_real() {
        let value = Value::from_json(&json!(u64::MAX)).unwrap();
        assert_eq!(value.kind(), "real");
    }

    #[test]
    fn serde_is_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, false, 7, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Boolean(false),
                Value::Integer(7),
                Value::Real(2.5),
                Value::Text("x".to_string()),
            ]
        );
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[null,false,7,2.5,"x"]"#
        );
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".to_string()));
    }
}
