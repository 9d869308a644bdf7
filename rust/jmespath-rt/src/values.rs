//! Value representation for the JMESPath tree interpreter.

use indexmap::IndexMap;
use jmespath_compiler::compiler::ast::Node;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// The seven JMESPath value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Expref,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Null => write!(f, "null"),
            Kind::Boolean => write!(f, "boolean"),
            Kind::Number => write!(f, "number"),
            Kind::String => write!(f, "string"),
            Kind::Array => write!(f, "array"),
            Kind::Object => write!(f, "object"),
            Kind::Expref => write!(f, "expref"),
        }
    }
}

/// Runtime values flowing through the evaluator.
///
/// Container variants are wrapped in `Rc` for cheap cloning via reference
/// counting; values are never mutated after construction. Objects use an
/// insertion-ordered map so key iteration reproduces the order in which the
/// producer introduced the keys.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Rc<Vec<Value>>),
    Object(Rc<IndexMap<String, Value>>),
    /// A first-class reference to an unevaluated AST subtree, produced
    /// only by the `&` operator
    Expref(Arc<Node>),
}

impl Value {
    pub fn new_array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    pub fn new_object(map: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(map))
    }

    pub fn from_entries(entries: Vec<(String, Value)>) -> Self {
        Value::Object(Rc::new(entries.into_iter().collect()))
    }

    /// Wrap a float, collapsing whole values in i64 range to integers.
    pub fn from_f64(f: f64) -> Self {
        if f.is_finite() && f == f.trunc() && f.abs() < (i64::MAX as f64) {
            Value::Int(f as i64)
        } else {
            Value::Float(f)
        }
    }

    /// Convert a decoded JSON value, preserving object key order.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::new_array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(Rc::new(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            )),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Int(_) | Value::Float(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Expref(_) => Kind::Expref,
        }
    }

    /// JMESPath truthiness: null, false, the empty string, the empty
    /// array, and the empty object are falsy. Numbers are always truthy,
    /// including zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            _ => true,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_expref(&self) -> Option<Arc<Node>> {
        match self {
            Value::Expref(node) => Some(Arc::clone(node)),
            _ => None,
        }
    }

    /// Ordering is defined only between two numbers or two strings; any
    /// other combination is unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (a, b) if a.kind() == Kind::Number && b.kind() == Kind::Number => {
                let (x, y) = (a.as_float()?, b.as_float()?);
                x.partial_cmp(&y)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Compact JSON serialization.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_string())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            // Numbers compare numerically regardless of representation.
            (Value::Int(a), Value::Float(b)) => (*a as f64) == *b,
            (Value::Float(a), Value::Int(b)) => *a == (*b as f64),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => **a == **b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, va)| b.get(k).is_some_and(|vb| va == vb))
            }
            (Value::Expref(a), Value::Expref(b)) => Arc::ptr_eq(a, b) || **a == **b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            // Expression references are not data; they serialize as null.
            Value::Expref(_) => serializer.serialize_unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_jmespath_rules() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::String("".into()).is_truthy());
        assert!(Value::String("x".into()).is_truthy());
        assert!(!Value::new_array(vec![]).is_truthy());
        assert!(Value::new_array(vec![Value::Null]).is_truthy());
        assert!(!Value::new_object(IndexMap::new()).is_truthy());
        // Numbers are always truthy, zero included.
        assert!(Value::Int(0).is_truthy());
        assert!(Value::Float(0.0).is_truthy());
    }

    #[test]
    fn numbers_compare_numerically_across_representations() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Float(2.0), Value::Int(2));
        assert_ne!(Value::Int(1), Value::Float(1.5));
    }

    #[test]
    fn object_equality_ignores_key_order() {
        let a = Value::from_entries(vec![
            ("x".to_string(), Value::Int(1)),
            ("y".to_string(), Value::Int(2)),
        ]);
        let b = Value::from_entries(vec![
            ("y".to_string(), Value::Int(2)),
            ("x".to_string(), Value::Int(1)),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn object_iteration_preserves_insertion_order() {
        let v = Value::from_entries(vec![
            ("z".to_string(), Value::Int(1)),
            ("a".to_string(), Value::Int(2)),
        ]);
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(v.to_json_string(), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn compare_is_defined_for_same_kind_numbers_and_strings() {
        assert_eq!(
            Value::Int(1).compare(&Value::Float(2.0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::String("b".into()).compare(&Value::String("a".into())),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Int(1).compare(&Value::String("1".into())), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn from_f64_collapses_whole_floats() {
        assert_eq!(Value::from_f64(3.0), Value::Int(3));
        assert_eq!(Value::from_f64(-2.0), Value::Int(-2));
        assert_eq!(Value::from_f64(2.5), Value::Float(2.5));
    }

    #[test]
    fn from_json_keeps_numbers_and_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": 1, "a": 2.5}"#).unwrap();
        let value = Value::from_json(&json);
        assert_eq!(value.to_json_string(), r#"{"b":1,"a":2.5}"#);
    }

    #[test]
    fn serializes_to_compact_json() {
        let v = Value::new_array(vec![
            Value::Null,
            Value::Bool(true),
            Value::String("hi".into()),
        ]);
        assert_eq!(v.to_json_string(), r#"[null,true,"hi"]"#);
    }
}
