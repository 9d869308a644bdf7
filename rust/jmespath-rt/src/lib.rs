//! JMESPath Runtime
//!
//! Tree-walking evaluation of compiled JMESPath expressions: the value
//! model, the runtime abstraction, the interpreter, and the built-in
//! function library. `compile` plus [`Expression::evaluate`] is the
//! primary surface; [`search`] is the one-shot convenience that compiles,
//! evaluates against the default runtime, and discards the compiled form.

pub mod functions;
pub mod interpreter;
pub mod json_parser;
pub mod runtime;
pub mod values;

pub use jmespath_compiler::compiler::ast::Node;
pub use jmespath_compiler::CompileError;
pub use json_parser::{parse_json, JsonParseError};
pub use runtime::{default_runtime, DefaultRuntime, Runtime};
pub use values::{Kind, Value};

use interpreter::TreeInterpreter;
use std::sync::Arc;
use thiserror::Error;

/// Evaluation failures. Parse errors never arise here; they are raised at
/// compile time. Missing fields and out-of-range access yield null rather
/// than erroring — only function-level violations fail hard.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("unknown function: {name}")]
    UnknownFunction { name: String },
    #[error("invalid arity calling {function}: expected {expected} arguments, got {actual}")]
    InvalidArity {
        function: String,
        expected: String,
        actual: usize,
    },
    #[error("invalid type for argument {position} of {function}: expected {expected}, got {actual}")]
    InvalidType {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },
    #[error("invalid value: {message}")]
    InvalidValue { message: String },
}

/// Any failure from the one-shot [`search`] surface.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("{0}")]
    Compile(#[from] CompileError),
    #[error("{0}")]
    Eval(#[from] EvalError),
}

/// A compiled JMESPath expression: the AST root plus the original source.
///
/// Immutable after compilation and safe to share across threads for
/// concurrent evaluation.
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    ast: Arc<Node>,
}

impl Expression {
    /// The original expression text, for diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Node {
        &self.ast
    }

    /// Evaluate against the process-wide default runtime.
    pub fn evaluate(&self, data: &Value) -> Result<Value, EvalError> {
        self.evaluate_with(default_runtime(), data)
    }

    /// Evaluate against a caller-supplied runtime.
    pub fn evaluate_with<R: Runtime>(
        &self,
        runtime: &R,
        data: &R::Value,
    ) -> Result<R::Value, EvalError> {
        TreeInterpreter::new(runtime).evaluate(&self.ast, data)
    }
}

/// Compile an expression for repeated evaluation.
pub fn compile(expression: &str) -> Result<Expression, CompileError> {
    let ast = jmespath_compiler::compile(expression)?;
    Ok(Expression {
        source: expression.to_string(),
        ast: Arc::new(ast),
    })
}

/// Compile and evaluate in one shot against the default runtime.
pub fn search(expression: &str, data: &Value) -> Result<Value, SearchError> {
    let compiled = compile(expression)?;
    Ok(compiled.evaluate(data)?)
}

/// Compile and evaluate in one shot against a caller-supplied runtime.
pub fn search_with<R: Runtime>(
    expression: &str,
    runtime: &R,
    data: &R::Value,
) -> Result<R::Value, SearchError> {
    let compiled = compile(expression)?;
    Ok(compiled.evaluate_with(runtime, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_evaluates() {
        let expr = compile("foo.bar").unwrap();
        let data = parse_json(r#"{"foo": {"bar": 42}}"#).unwrap();
        assert_eq!(expr.evaluate(&data).unwrap(), Value::Int(42));
        assert_eq!(expr.source(), "foo.bar");
    }

    #[test]
    fn search_compiles_and_discards() {
        let data = parse_json(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(
            search("a[1]", &data).unwrap(),
            Value::Int(2)
        );
        assert!(matches!(
            search("a[", &data).unwrap_err(),
            SearchError::Compile(_)
        ));
        assert!(matches!(
            search("nope(a)", &data).unwrap_err(),
            SearchError::Eval(EvalError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn repeated_evaluation_is_pure() {
        let expr = compile("a[?b > `1`].b").unwrap();
        let data = parse_json(r#"{"a": [{"b": 1}, {"b": 2}]}"#).unwrap();
        let first = expr.evaluate(&data).unwrap();
        let second = expr.evaluate(&data).unwrap();
        assert_eq!(first, second);
        assert_eq!(data.to_json_string(), r#"{"a":[{"b":1},{"b":2}]}"#);
    }

    #[test]
    fn compiled_expressions_are_shareable_across_threads() {
        let expr = compile("people[*].name | [0]").unwrap();
        std::thread::scope(|scope| {
            let mut handles = Vec::new();
            for _ in 0..4 {
                let expr = &expr;
                handles.push(scope.spawn(move || {
                    let rt = DefaultRuntime::new();
                    let data = parse_json(r#"{"people": [{"name": "A"}]}"#).unwrap();
                    expr.evaluate_with(&rt, &data).unwrap()
                }));
            }
            for handle in handles {
                assert_eq!(handle.join().unwrap(), Value::String("A".into()));
            }
        });
    }
}
