//! Runtime abstraction decoupling the evaluator from the concrete value
//! representation.
//!
//! The tree interpreter and every built-in function reach values only
//! through this trait, so the same engine runs against any in-memory JSON
//! representation. Implementations must keep read-only operations safe
//! under concurrent use; constructors must not mutate shared state.

use crate::functions::FunctionRegistry;
use crate::values::{Kind, Value};
use jmespath_compiler::compiler::ast::Node;
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub trait Runtime: Sized {
    type Value: Clone + PartialEq + fmt::Debug;

    /// Kind discrimination.
    fn kind(&self, value: &Self::Value) -> Kind;

    fn is_null(&self, value: &Self::Value) -> bool {
        self.kind(value) == Kind::Null
    }
    fn is_boolean(&self, value: &Self::Value) -> bool {
        self.kind(value) == Kind::Boolean
    }
    fn is_number(&self, value: &Self::Value) -> bool {
        self.kind(value) == Kind::Number
    }
    fn is_string(&self, value: &Self::Value) -> bool {
        self.kind(value) == Kind::String
    }
    fn is_array(&self, value: &Self::Value) -> bool {
        self.kind(value) == Kind::Array
    }
    fn is_object(&self, value: &Self::Value) -> bool {
        self.kind(value) == Kind::Object
    }
    fn is_expref(&self, value: &Self::Value) -> bool {
        self.kind(value) == Kind::Expref
    }

    // -- Constructors --

    fn create_null(&self) -> Self::Value;
    fn create_bool(&self, value: bool) -> Self::Value;
    fn create_int(&self, value: i64) -> Self::Value;
    /// Whole values in integer range come back integer-typed.
    fn create_number(&self, value: f64) -> Self::Value;
    fn create_string(&self, value: String) -> Self::Value;
    fn create_array(&self, items: Vec<Self::Value>) -> Self::Value;
    fn create_object(&self, entries: Vec<(String, Self::Value)>) -> Self::Value;
    fn create_expref(&self, ast: Arc<Node>) -> Self::Value;
    fn create_from_json(&self, json: &serde_json::Value) -> Self::Value;

    // -- Accessors --

    fn as_boolean(&self, value: &Self::Value) -> Option<bool>;
    fn as_number(&self, value: &Self::Value) -> Option<f64>;
    fn as_integer(&self, value: &Self::Value) -> Option<i64>;
    fn as_string(&self, value: &Self::Value) -> Option<String>;
    fn as_expref(&self, value: &Self::Value) -> Option<Arc<Node>>;
    /// The elements of an array, or `None` when the value is not an array.
    fn array_elements(&self, value: &Self::Value) -> Option<Vec<Self::Value>>;
    /// The entries of an object in insertion order, or `None` when the
    /// value is not an object.
    fn object_entries(&self, value: &Self::Value) -> Option<Vec<(String, Self::Value)>>;

    /// Field lookup; null when absent or when the value is not an object.
    fn get_field(&self, value: &Self::Value, name: &str) -> Self::Value;
    /// Index lookup with negative-index semantics; null when out of range
    /// or when the value is not an array.
    fn get_index(&self, value: &Self::Value, index: i64) -> Self::Value;

    // -- Semantics --

    fn is_truthy(&self, value: &Self::Value) -> bool;
    /// Defined only for same-kind numbers and same-kind strings.
    fn compare(&self, a: &Self::Value, b: &Self::Value) -> Option<Ordering>;
    fn to_json_string(&self, value: &Self::Value) -> String;

    /// The function registry consulted by `FunctionCall` nodes.
    fn functions(&self) -> &FunctionRegistry<Self>;
}

/// The default runtime over [`Value`].
pub struct DefaultRuntime {
    functions: FunctionRegistry<DefaultRuntime>,
}

impl DefaultRuntime {
    pub fn new() -> Self {
        Self {
            functions: FunctionRegistry::core(),
        }
    }

    /// Build a runtime around a custom registry (for example, the core
    /// set extended with user functions).
    pub fn with_functions(functions: FunctionRegistry<DefaultRuntime>) -> Self {
        Self { functions }
    }
}

impl Default for DefaultRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime for DefaultRuntime {
    type Value = Value;

    fn kind(&self, value: &Value) -> Kind {
        value.kind()
    }

    fn create_null(&self) -> Value {
        Value::Null
    }

    fn create_bool(&self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn create_int(&self, value: i64) -> Value {
        Value::Int(value)
    }

    fn create_number(&self, value: f64) -> Value {
        Value::from_f64(value)
    }

    fn create_string(&self, value: String) -> Value {
        Value::String(value)
    }

    fn create_array(&self, items: Vec<Value>) -> Value {
        Value::new_array(items)
    }

    fn create_object(&self, entries: Vec<(String, Value)>) -> Value {
        Value::from_entries(entries)
    }

    fn create_expref(&self, ast: Arc<Node>) -> Value {
        Value::Expref(ast)
    }

    fn create_from_json(&self, json: &serde_json::Value) -> Value {
        Value::from_json(json)
    }

    fn as_boolean(&self, value: &Value) -> Option<bool> {
        value.as_bool()
    }

    fn as_number(&self, value: &Value) -> Option<f64> {
        value.as_float()
    }

    fn as_integer(&self, value: &Value) -> Option<i64> {
        value.as_int()
    }

    fn as_string(&self, value: &Value) -> Option<String> {
        value.as_str().map(|s| s.to_string())
    }

    fn as_expref(&self, value: &Value) -> Option<Arc<Node>> {
        value.as_expref()
    }

    fn array_elements(&self, value: &Value) -> Option<Vec<Value>> {
        value.as_array().map(|items| items.to_vec())
    }

    fn object_entries(&self, value: &Value) -> Option<Vec<(String, Value)>> {
        value
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn get_field(&self, value: &Value, name: &str) -> Value {
        match value.as_object() {
            Some(map) => map.get(name).cloned().unwrap_or(Value::Null),
            None => Value::Null,
        }
    }

    fn get_index(&self, value: &Value, index: i64) -> Value {
        let Some(items) = value.as_array() else {
            return Value::Null;
        };
        let len = items.len() as i64;
        let adjusted = if index < 0 { len + index } else { index };
        if adjusted < 0 || adjusted >= len {
            Value::Null
        } else {
            items[adjusted as usize].clone()
        }
    }

    fn is_truthy(&self, value: &Value) -> bool {
        value.is_truthy()
    }

    fn compare(&self, a: &Value, b: &Value) -> Option<Ordering> {
        a.compare(b)
    }

    fn to_json_string(&self, value: &Value) -> String {
        value.to_json_string()
    }

    fn functions(&self) -> &FunctionRegistry<DefaultRuntime> {
        &self.functions
    }
}

/// Process-wide default runtime, constructed once and immutable after.
pub fn default_runtime() -> &'static DefaultRuntime {
    static RUNTIME: Lazy<DefaultRuntime> = Lazy::new(DefaultRuntime::new);
    &RUNTIME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_field_is_null_forgiving() {
        let rt = DefaultRuntime::new();
        let obj = Value::from_entries(vec![("a".to_string(), Value::Int(1))]);
        assert_eq!(rt.get_field(&obj, "a"), Value::Int(1));
        assert_eq!(rt.get_field(&obj, "missing"), Value::Null);
        assert_eq!(rt.get_field(&Value::Int(3), "a"), Value::Null);
    }

    #[test]
    fn get_index_supports_negative_indexes() {
        let rt = DefaultRuntime::new();
        let arr = Value::new_array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(rt.get_index(&arr, 0), Value::Int(1));
        assert_eq!(rt.get_index(&arr, -1), Value::Int(3));
        assert_eq!(rt.get_index(&arr, 3), Value::Null);
        assert_eq!(rt.get_index(&arr, -4), Value::Null);
        assert_eq!(rt.get_index(&Value::Null, 0), Value::Null);
    }

    #[test]
    fn default_runtime_is_shared() {
        let a = default_runtime() as *const DefaultRuntime;
        let b = default_runtime() as *const DefaultRuntime;
        assert_eq!(a, b);
    }
}
