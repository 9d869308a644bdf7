//! Function registry, signature validation, and the built-in library.

use crate::interpreter::TreeInterpreter;
use crate::runtime::Runtime;
use crate::values::Kind;
use crate::EvalError;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Parameter types used when validating function arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamType {
    /// Any value is acceptable, but something must be present
    Any,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    /// Must be an `&expr` argument
    Expref,
    /// An array whose elements are all of one kind, where the kind may be
    /// any of the provided types
    TypedArray(Vec<ParamType>),
    /// Accepts one of a number of types
    OneOf(Vec<ParamType>),
}

impl ParamType {
    fn matches<R: Runtime>(&self, rt: &R, value: &R::Value) -> bool {
        match self {
            ParamType::Any => true,
            ParamType::Null => rt.is_null(value),
            ParamType::Bool => rt.is_boolean(value),
            ParamType::Number => rt.is_number(value),
            ParamType::String => rt.is_string(value),
            ParamType::Array => rt.is_array(value),
            ParamType::Object => rt.is_object(value),
            ParamType::Expref => rt.is_expref(value),
            ParamType::OneOf(types) => types.iter().any(|t| t.matches(rt, value)),
            ParamType::TypedArray(types) => {
                let Some(items) = rt.array_elements(value) else {
                    return false;
                };
                if items.is_empty() {
                    return true;
                }
                let first = rt.kind(&items[0]);
                items
                    .iter()
                    .all(|v| rt.kind(v) == first && types.iter().any(|t| t.matches(rt, v)))
            }
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Any => write!(f, "any"),
            ParamType::Null => write!(f, "null"),
            ParamType::Bool => write!(f, "boolean"),
            ParamType::Number => write!(f, "number"),
            ParamType::String => write!(f, "string"),
            ParamType::Array => write!(f, "array"),
            ParamType::Object => write!(f, "object"),
            ParamType::Expref => write!(f, "expression"),
            ParamType::OneOf(types) => {
                let names: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", names.join("|"))
            }
            ParamType::TypedArray(types) => {
                let names: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                write!(f, "array[{}]", names.join("|"))
            }
        }
    }
}

/// An ordered list of parameter specs, with an optional variadic tail.
#[derive(Clone, Debug)]
pub struct Signature {
    params: Vec<ParamType>,
    variadic: Option<ParamType>,
}

impl Signature {
    pub fn new(params: Vec<ParamType>) -> Self {
        Self {
            params,
            variadic: None,
        }
    }

    pub fn variadic(params: Vec<ParamType>, tail: ParamType) -> Self {
        Self {
            params,
            variadic: Some(tail),
        }
    }

    /// Validate arity, then each argument against its spec.
    pub fn validate<R: Runtime>(
        &self,
        function: &str,
        rt: &R,
        args: &[R::Value],
    ) -> Result<(), EvalError> {
        let arity_ok = match self.variadic {
            Some(_) => args.len() >= self.params.len(),
            None => args.len() == self.params.len(),
        };
        if !arity_ok {
            let expected = match self.variadic {
                Some(_) => format!("at least {}", self.params.len()),
                None => self.params.len().to_string(),
            };
            return Err(EvalError::InvalidArity {
                function: function.to_string(),
                expected,
                actual: args.len(),
            });
        }
        for (position, arg) in args.iter().enumerate() {
            let spec = self
                .params
                .get(position)
                .or(self.variadic.as_ref())
                .expect("arity was validated");
            if !spec.matches(rt, arg) {
                return Err(EvalError::InvalidType {
                    function: function.to_string(),
                    expected: spec.to_string(),
                    actual: rt.kind(arg).to_string(),
                    position,
                });
            }
        }
        Ok(())
    }
}

/// A JMESPath function: a signature plus an evaluation body. Bodies reach
/// values only through the runtime carried by the interpreter.
pub trait Function<R: Runtime>: Send + Sync {
    fn signature(&self) -> Signature;

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError>;
}

/// Name-to-function lookup, populated at construction and read-only after.
pub struct FunctionRegistry<R: Runtime> {
    functions: HashMap<String, Box<dyn Function<R>>>,
}

impl<R: Runtime> FunctionRegistry<R> {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// A registry holding the standard JMESPath function library.
    pub fn core() -> Self {
        let mut registry = Self::new();
        register_core_functions(&mut registry);
        registry
    }

    pub fn register(&mut self, name: &str, function: Box<dyn Function<R>>) {
        self.functions.insert(name.to_string(), function);
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Function<R>> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    /// Look a function up, validate the arguments, and invoke it.
    pub fn call(
        &self,
        name: &str,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let function = self.lookup(name).ok_or_else(|| EvalError::UnknownFunction {
            name: name.to_string(),
        })?;
        function
            .signature()
            .validate(name, interpreter.runtime(), &args)?;
        function.call(args, interpreter)
    }
}

impl<R: Runtime> Default for FunctionRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers the standard JMESPath functions.
pub fn register_core_functions<R: Runtime>(registry: &mut FunctionRegistry<R>) {
    registry.register("abs", Box::new(Abs));
    registry.register("avg", Box::new(Avg));
    registry.register("ceil", Box::new(Ceil));
    registry.register("contains", Box::new(Contains));
    registry.register("ends_with", Box::new(EndsWith));
    registry.register("floor", Box::new(Floor));
    registry.register("join", Box::new(Join));
    registry.register("keys", Box::new(Keys));
    registry.register("length", Box::new(Length));
    registry.register("map", Box::new(Map));
    registry.register("max", Box::new(Max));
    registry.register("max_by", Box::new(MaxBy));
    registry.register("merge", Box::new(Merge));
    registry.register("min", Box::new(Min));
    registry.register("min_by", Box::new(MinBy));
    registry.register("not_null", Box::new(NotNull));
    registry.register("reverse", Box::new(Reverse));
    registry.register("sort", Box::new(Sort));
    registry.register("sort_by", Box::new(SortBy));
    registry.register("starts_with", Box::new(StartsWith));
    registry.register("sum", Box::new(Sum));
    registry.register("to_array", Box::new(ToArray));
    registry.register("to_number", Box::new(ToNumber));
    registry.register("to_string", Box::new(ToString));
    registry.register("type", Box::new(Type));
    registry.register("values", Box::new(Values));
}

// -- Accessor helpers --
//
// Signatures are validated before call, so these mismatches indicate a
// registry bug; they still propagate as typed errors rather than panic.

fn invalid_type<R: Runtime>(
    rt: &R,
    function: &str,
    expected: &str,
    value: &R::Value,
    position: usize,
) -> EvalError {
    EvalError::InvalidType {
        function: function.to_string(),
        expected: expected.to_string(),
        actual: rt.kind(value).to_string(),
        position,
    }
}

fn expect_number<R: Runtime>(
    rt: &R,
    function: &str,
    args: &[R::Value],
    position: usize,
) -> Result<f64, EvalError> {
    rt.as_number(&args[position])
        .ok_or_else(|| invalid_type(rt, function, "number", &args[position], position))
}

fn expect_string<R: Runtime>(
    rt: &R,
    function: &str,
    args: &[R::Value],
    position: usize,
) -> Result<String, EvalError> {
    rt.as_string(&args[position])
        .ok_or_else(|| invalid_type(rt, function, "string", &args[position], position))
}

fn expect_array<R: Runtime>(
    rt: &R,
    function: &str,
    args: &[R::Value],
    position: usize,
) -> Result<Vec<R::Value>, EvalError> {
    rt.array_elements(&args[position])
        .ok_or_else(|| invalid_type(rt, function, "array", &args[position], position))
}

fn expect_object<R: Runtime>(
    rt: &R,
    function: &str,
    args: &[R::Value],
    position: usize,
) -> Result<Vec<(String, R::Value)>, EvalError> {
    rt.object_entries(&args[position])
        .ok_or_else(|| invalid_type(rt, function, "object", &args[position], position))
}

fn expect_expref<R: Runtime>(
    rt: &R,
    function: &str,
    args: &[R::Value],
    position: usize,
) -> Result<std::sync::Arc<jmespath_compiler::compiler::ast::Node>, EvalError> {
    rt.as_expref(&args[position])
        .ok_or_else(|| invalid_type(rt, function, "expression", &args[position], position))
}

/// Evaluate an expref against every element, requiring all projected keys
/// to be of one orderable kind (number or string). Shared by `sort_by`,
/// `min_by`, and `max_by`.
fn projected_keys<R: Runtime>(
    function: &str,
    items: &[R::Value],
    ast: &jmespath_compiler::compiler::ast::Node,
    interpreter: &TreeInterpreter<'_, R>,
) -> Result<Vec<R::Value>, EvalError> {
    let rt = interpreter.runtime();
    let mut keys = Vec::with_capacity(items.len());
    let mut key_kind: Option<Kind> = None;
    for item in items {
        let key = interpreter.evaluate(ast, item)?;
        let kind = rt.kind(&key);
        match key_kind {
            None => {
                if kind != Kind::Number && kind != Kind::String {
                    return Err(EvalError::InvalidType {
                        function: function.to_string(),
                        expected: "expression->number|expression->string".to_string(),
                        actual: kind.to_string(),
                        position: 1,
                    });
                }
                key_kind = Some(kind);
            }
            Some(expected) if kind != expected => {
                return Err(EvalError::InvalidType {
                    function: function.to_string(),
                    expected: format!("expression->{}", expected),
                    actual: kind.to_string(),
                    position: 1,
                });
            }
            Some(_) => {}
        }
        keys.push(key);
    }
    Ok(keys)
}

fn orderable_array() -> ParamType {
    ParamType::TypedArray(vec![ParamType::Number, ParamType::String])
}

// -- Built-in functions --

struct Abs;

impl<R: Runtime> Function<R> for Abs {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Number])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let n = expect_number(rt, "abs", &args, 0)?;
        Ok(rt.create_number(n.abs()))
    }
}

struct Avg;

impl<R: Runtime> Function<R> for Avg {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::TypedArray(vec![ParamType::Number])])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let items = expect_array(rt, "avg", &args, 0)?;
        if items.is_empty() {
            return Ok(rt.create_null());
        }
        let mut sum = 0.0;
        for (i, item) in items.iter().enumerate() {
            sum += rt
                .as_number(item)
                .ok_or_else(|| invalid_type(rt, "avg", "number", item, i))?;
        }
        Ok(rt.create_number(sum / items.len() as f64))
    }
}

struct Ceil;

impl<R: Runtime> Function<R> for Ceil {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Number])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let n = expect_number(rt, "ceil", &args, 0)?;
        Ok(rt.create_number(n.ceil()))
    }
}

struct Contains;

impl<R: Runtime> Function<R> for Contains {
    fn signature(&self) -> Signature {
        Signature::new(vec![
            ParamType::OneOf(vec![ParamType::String, ParamType::Array]),
            ParamType::Any,
        ])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let found = if let Some(items) = rt.array_elements(&args[0]) {
            items.iter().any(|item| item == &args[1])
        } else {
            let subject = expect_string(rt, "contains", &args, 0)?;
            match rt.as_string(&args[1]) {
                Some(needle) => subject.contains(&needle),
                None => false,
            }
        };
        Ok(rt.create_bool(found))
    }
}

struct EndsWith;

impl<R: Runtime> Function<R> for EndsWith {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::String, ParamType::String])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let subject = expect_string(rt, "ends_with", &args, 0)?;
        let suffix = expect_string(rt, "ends_with", &args, 1)?;
        Ok(rt.create_bool(subject.ends_with(&suffix)))
    }
}

struct Floor;

impl<R: Runtime> Function<R> for Floor {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Number])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let n = expect_number(rt, "floor", &args, 0)?;
        Ok(rt.create_number(n.floor()))
    }
}

struct Join;

impl<R: Runtime> Function<R> for Join {
    fn signature(&self) -> Signature {
        Signature::new(vec![
            ParamType::String,
            ParamType::TypedArray(vec![ParamType::String]),
        ])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let glue = expect_string(rt, "join", &args, 0)?;
        let items = expect_array(rt, "join", &args, 1)?;
        let mut parts = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            parts.push(
                rt.as_string(item)
                    .ok_or_else(|| invalid_type(rt, "join", "string", item, i))?,
            );
        }
        Ok(rt.create_string(parts.join(&glue)))
    }
}

struct Keys;

impl<R: Runtime> Function<R> for Keys {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Object])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let entries = expect_object(rt, "keys", &args, 0)?;
        let keys = entries
            .into_iter()
            .map(|(k, _)| rt.create_string(k))
            .collect();
        Ok(rt.create_array(keys))
    }
}

struct Length;

impl<R: Runtime> Function<R> for Length {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::OneOf(vec![
            ParamType::String,
            ParamType::Array,
            ParamType::Object,
        ])])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let count = if let Some(items) = rt.array_elements(&args[0]) {
            items.len()
        } else if let Some(entries) = rt.object_entries(&args[0]) {
            entries.len()
        } else {
            // Strings count code points, not bytes.
            expect_string(rt, "length", &args, 0)?.chars().count()
        };
        Ok(rt.create_int(count as i64))
    }
}

struct Map;

impl<R: Runtime> Function<R> for Map {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Expref, ParamType::Array])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let ast = expect_expref(rt, "map", &args, 0)?;
        let items = expect_array(rt, "map", &args, 1)?;
        let mut mapped = Vec::with_capacity(items.len());
        // Unlike a projection, map keeps null results.
        for item in &items {
            mapped.push(interpreter.evaluate(&ast, item)?);
        }
        Ok(rt.create_array(mapped))
    }
}

struct Max;

impl<R: Runtime> Function<R> for Max {
    fn signature(&self) -> Signature {
        Signature::new(vec![orderable_array()])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let items = expect_array(rt, "max", &args, 0)?;
        let mut best: Option<R::Value> = None;
        for item in items {
            best = Some(match best {
                None => item,
                Some(current) => match rt.compare(&item, &current) {
                    Some(Ordering::Greater) => item,
                    _ => current,
                },
            });
        }
        Ok(best.unwrap_or_else(|| rt.create_null()))
    }
}

struct MaxBy;

impl<R: Runtime> Function<R> for MaxBy {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Array, ParamType::Expref])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let items = expect_array(rt, "max_by", &args, 0)?;
        if items.is_empty() {
            return Ok(rt.create_null());
        }
        let ast = expect_expref(rt, "max_by", &args, 1)?;
        let keys = projected_keys("max_by", &items, &ast, interpreter)?;
        let mut best = 0;
        for i in 1..items.len() {
            if rt.compare(&keys[i], &keys[best]) == Some(Ordering::Greater) {
                best = i;
            }
        }
        Ok(items.into_iter().nth(best).unwrap_or_else(|| rt.create_null()))
    }
}

struct Merge;

impl<R: Runtime> Function<R> for Merge {
    fn signature(&self) -> Signature {
        Signature::variadic(vec![ParamType::Object], ParamType::Object)
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let mut merged: Vec<(String, R::Value)> = Vec::new();
        for position in 0..args.len() {
            for (key, value) in expect_object(rt, "merge", &args, position)? {
                match merged.iter_mut().find(|(k, _)| *k == key) {
                    // Later arguments overwrite, keeping first-seen order.
                    Some(entry) => entry.1 = value,
                    None => merged.push((key, value)),
                }
            }
        }
        Ok(rt.create_object(merged))
    }
}

struct Min;

impl<R: Runtime> Function<R> for Min {
    fn signature(&self) -> Signature {
        Signature::new(vec![orderable_array()])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let items = expect_array(rt, "min", &args, 0)?;
        let mut best: Option<R::Value> = None;
        for item in items {
            best = Some(match best {
                None => item,
                Some(current) => match rt.compare(&item, &current) {
                    Some(Ordering::Less) => item,
                    _ => current,
                },
            });
        }
        Ok(best.unwrap_or_else(|| rt.create_null()))
    }
}

struct MinBy;

impl<R: Runtime> Function<R> for MinBy {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Array, ParamType::Expref])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let items = expect_array(rt, "min_by", &args, 0)?;
        if items.is_empty() {
            return Ok(rt.create_null());
        }
        let ast = expect_expref(rt, "min_by", &args, 1)?;
        let keys = projected_keys("min_by", &items, &ast, interpreter)?;
        let mut best = 0;
        for i in 1..items.len() {
            if rt.compare(&keys[i], &keys[best]) == Some(Ordering::Less) {
                best = i;
            }
        }
        Ok(items.into_iter().nth(best).unwrap_or_else(|| rt.create_null()))
    }
}

struct NotNull;

impl<R: Runtime> Function<R> for NotNull {
    fn signature(&self) -> Signature {
        Signature::variadic(vec![ParamType::Any], ParamType::Any)
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        for arg in args {
            if !rt.is_null(&arg) {
                return Ok(arg);
            }
        }
        Ok(rt.create_null())
    }
}

struct Reverse;

impl<R: Runtime> Function<R> for Reverse {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::OneOf(vec![
            ParamType::Array,
            ParamType::String,
        ])])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        if let Some(mut items) = rt.array_elements(&args[0]) {
            items.reverse();
            Ok(rt.create_array(items))
        } else {
            let s = expect_string(rt, "reverse", &args, 0)?;
            Ok(rt.create_string(s.chars().rev().collect()))
        }
    }
}

struct Sort;

impl<R: Runtime> Function<R> for Sort {
    fn signature(&self) -> Signature {
        Signature::new(vec![orderable_array()])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let mut items = expect_array(rt, "sort", &args, 0)?;
        // Vec::sort_by is stable; equal keys keep their input order.
        items.sort_by(|a, b| rt.compare(a, b).unwrap_or(Ordering::Equal));
        Ok(rt.create_array(items))
    }
}

struct SortBy;

impl<R: Runtime> Function<R> for SortBy {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Array, ParamType::Expref])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let items = expect_array(rt, "sort_by", &args, 0)?;
        if items.is_empty() {
            return Ok(rt.create_array(items));
        }
        let ast = expect_expref(rt, "sort_by", &args, 1)?;
        let keys = projected_keys("sort_by", &items, &ast, interpreter)?;
        let mut paired: Vec<(R::Value, R::Value)> =
            keys.into_iter().zip(items).collect();
        paired.sort_by(|a, b| rt.compare(&a.0, &b.0).unwrap_or(Ordering::Equal));
        Ok(rt.create_array(paired.into_iter().map(|(_, v)| v).collect()))
    }
}

struct StartsWith;

impl<R: Runtime> Function<R> for StartsWith {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::String, ParamType::String])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let subject = expect_string(rt, "starts_with", &args, 0)?;
        let prefix = expect_string(rt, "starts_with", &args, 1)?;
        Ok(rt.create_bool(subject.starts_with(&prefix)))
    }
}

struct Sum;

impl<R: Runtime> Function<R> for Sum {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::TypedArray(vec![ParamType::Number])])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let items = expect_array(rt, "sum", &args, 0)?;
        let mut sum = 0.0;
        for (i, item) in items.iter().enumerate() {
            sum += rt
                .as_number(item)
                .ok_or_else(|| invalid_type(rt, "sum", "number", item, i))?;
        }
        Ok(rt.create_number(sum))
    }
}

struct ToArray;

impl<R: Runtime> Function<R> for ToArray {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Any])
    }

    fn call(
        &self,
        mut args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let value = args.remove(0);
        if rt.is_array(&value) {
            Ok(value)
        } else {
            Ok(rt.create_array(vec![value]))
        }
    }
}

struct ToNumber;

impl<R: Runtime> Function<R> for ToNumber {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Any])
    }

    fn call(
        &self,
        mut args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let value = args.remove(0);
        if rt.is_number(&value) {
            return Ok(value);
        }
        // An unparseable string is not an error; it yields null. Parsing
        // follows the JSON number grammar, so "NaN" and "inf" are rejected.
        match rt.as_string(&value) {
            Some(s) => match serde_json::from_str::<f64>(s.trim()) {
                Ok(n) => Ok(rt.create_number(n)),
                Err(_) => Ok(rt.create_null()),
            },
            None => Ok(rt.create_null()),
        }
    }
}

struct ToString;

impl<R: Runtime> Function<R> for ToString {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Any])
    }

    fn call(
        &self,
        mut args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let value = args.remove(0);
        if rt.is_string(&value) {
            Ok(value)
        } else {
            Ok(rt.create_string(rt.to_json_string(&value)))
        }
    }
}

struct Type;

impl<R: Runtime> Function<R> for Type {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Any])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        Ok(rt.create_string(rt.kind(&args[0]).to_string()))
    }
}

struct Values;

impl<R: Runtime> Function<R> for Values {
    fn signature(&self) -> Signature {
        Signature::new(vec![ParamType::Object])
    }

    fn call(
        &self,
        args: Vec<R::Value>,
        interpreter: &TreeInterpreter<'_, R>,
    ) -> Result<R::Value, EvalError> {
        let rt = interpreter.runtime();
        let entries = expect_object(rt, "values", &args, 0)?;
        Ok(rt.create_array(entries.into_iter().map(|(_, v)| v).collect()))
    }
}
