//! Tree-walking evaluator over AST nodes.
//!
//! Evaluation is a pure function of (node, current value, scope); inputs
//! are never mutated and there are no suspension points. Every value
//! operation goes through the [`Runtime`] trait.

use crate::runtime::Runtime;
use crate::EvalError;
use jmespath_compiler::compiler::ast::{Comparator, Node};
use std::collections::HashMap;
use std::sync::Arc;

/// Lexical scope threaded through evaluation.
///
/// The grammar has no binding form yet; the scope exists so let-style
/// expressions and callback captures slot in without changing evaluator
/// signatures. `@` always resolves from the evaluator's current value,
/// never from here.
pub struct Scope<'a, V> {
    vars: HashMap<String, V>,
    parent: Option<&'a Scope<'a, V>>,
}

impl<'a, V> Scope<'a, V> {
    pub fn root() -> Self {
        Self {
            vars: HashMap::new(),
            parent: None,
        }
    }

    pub fn child(&'a self) -> Scope<'a, V> {
        Scope {
            vars: HashMap::new(),
            parent: Some(self),
        }
    }

    pub fn bind(&mut self, name: String, value: V) {
        self.vars.insert(name, value);
    }

    pub fn lookup(&self, name: &str) -> Option<&V> {
        match self.vars.get(name) {
            Some(value) => Some(value),
            None => self.parent.and_then(|p| p.lookup(name)),
        }
    }
}

pub struct TreeInterpreter<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> TreeInterpreter<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &R {
        self.runtime
    }

    pub fn evaluate(&self, node: &Node, current: &R::Value) -> Result<R::Value, EvalError> {
        self.evaluate_in(node, current, &Scope::root())
    }

    pub fn evaluate_in(
        &self,
        node: &Node,
        current: &R::Value,
        scope: &Scope<'_, R::Value>,
    ) -> Result<R::Value, EvalError> {
        let rt = self.runtime;
        match node {
            Node::Current => Ok(current.clone()),
            Node::Field(name) => Ok(rt.get_field(current, name)),
            Node::Index(index) => Ok(rt.get_index(current, *index)),
            Node::Slice { start, stop, step } => self.eval_slice(current, *start, *stop, *step),
            Node::Flatten(inner) => {
                let base = self.evaluate_in(inner, current, scope)?;
                let Some(items) = rt.array_elements(&base) else {
                    return Ok(rt.create_null());
                };
                let mut flattened = Vec::with_capacity(items.len());
                for item in items {
                    match rt.array_elements(&item) {
                        Some(nested) => flattened.extend(nested),
                        None => flattened.push(item),
                    }
                }
                Ok(rt.create_array(flattened))
            }
            Node::ObjectValues(inner) => {
                let base = self.evaluate_in(inner, current, scope)?;
                match rt.object_entries(&base) {
                    Some(entries) => {
                        Ok(rt.create_array(entries.into_iter().map(|(_, v)| v).collect()))
                    }
                    None => Ok(rt.create_null()),
                }
            }
            Node::Projection { left, right } => {
                let base = self.evaluate_in(left, current, scope)?;
                let Some(items) = rt.array_elements(&base) else {
                    return Ok(rt.create_null());
                };
                let mut collected = Vec::with_capacity(items.len());
                for item in items {
                    let projected = self.evaluate_in(right, &item, scope)?;
                    if !rt.is_null(&projected) {
                        collected.push(projected);
                    }
                }
                Ok(rt.create_array(collected))
            }
            Node::FilterProjection {
                left,
                predicate,
                right,
            } => {
                let base = self.evaluate_in(left, current, scope)?;
                let Some(items) = rt.array_elements(&base) else {
                    return Ok(rt.create_null());
                };
                let mut collected = Vec::new();
                for item in items {
                    let keep = self.evaluate_in(predicate, &item, scope)?;
                    if !rt.is_truthy(&keep) {
                        continue;
                    }
                    let projected = self.evaluate_in(right, &item, scope)?;
                    if !rt.is_null(&projected) {
                        collected.push(projected);
                    }
                }
                Ok(rt.create_array(collected))
            }
            Node::Subexpression { left, right } | Node::Pipe { left, right } => {
                let intermediate = self.evaluate_in(left, current, scope)?;
                self.evaluate_in(right, &intermediate, scope)
            }
            Node::Comparison { op, left, right } => {
                let lhs = self.evaluate_in(left, current, scope)?;
                let rhs = self.evaluate_in(right, current, scope)?;
                match op {
                    Comparator::Eq => Ok(rt.create_bool(lhs == rhs)),
                    Comparator::NotEq => Ok(rt.create_bool(lhs != rhs)),
                    ordered => match rt.compare(&lhs, &rhs) {
                        // Incomparable kinds yield null, not false.
                        None => Ok(rt.create_null()),
                        Some(ordering) => {
                            let holds = match ordered {
                                Comparator::Lt => ordering.is_lt(),
                                Comparator::LtEq => ordering.is_le(),
                                Comparator::Gt => ordering.is_gt(),
                                Comparator::GtEq => ordering.is_ge(),
                                _ => unreachable!("equality handled above"),
                            };
                            Ok(rt.create_bool(holds))
                        }
                    },
                }
            }
            Node::And { left, right } => {
                let lhs = self.evaluate_in(left, current, scope)?;
                if rt.is_truthy(&lhs) {
                    self.evaluate_in(right, current, scope)
                } else {
                    Ok(lhs)
                }
            }
            Node::Or { left, right } => {
                let lhs = self.evaluate_in(left, current, scope)?;
                if rt.is_truthy(&lhs) {
                    Ok(lhs)
                } else {
                    self.evaluate_in(right, current, scope)
                }
            }
            Node::Not(inner) => {
                let value = self.evaluate_in(inner, current, scope)?;
                Ok(rt.create_bool(!rt.is_truthy(&value)))
            }
            Node::MultiSelectList(items) => {
                if rt.is_null(current) {
                    return Ok(rt.create_null());
                }
                let mut collected = Vec::with_capacity(items.len());
                for item in items {
                    collected.push(self.evaluate_in(item, current, scope)?);
                }
                Ok(rt.create_array(collected))
            }
            Node::MultiSelectHash(entries) => {
                if rt.is_null(current) {
                    return Ok(rt.create_null());
                }
                let mut collected = Vec::with_capacity(entries.len());
                for (key, expr) in entries {
                    collected.push((key.clone(), self.evaluate_in(expr, current, scope)?));
                }
                Ok(rt.create_object(collected))
            }
            Node::Literal(json) => Ok(rt.create_from_json(json)),
            Node::RawString(s) => Ok(rt.create_string(s.clone())),
            Node::FunctionCall { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate_in(arg, current, scope)?);
                }
                rt.functions().call(name, values, self)
            }
            Node::ExpressionRef(inner) => Ok(rt.create_expref(Arc::clone(inner))),
        }
    }

    /// Python-style slicing. The result is always an array; a zero step is
    /// an invalid-value error.
    fn eval_slice(
        &self,
        current: &R::Value,
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Result<R::Value, EvalError> {
        let rt = self.runtime;
        let Some(items) = rt.array_elements(current) else {
            return Ok(rt.create_null());
        };
        let step = step.unwrap_or(1);
        if step == 0 {
            return Err(EvalError::InvalidValue {
                message: "slice step cannot be zero".to_string(),
            });
        }
        let len = items.len() as i64;
        let adjust = |endpoint: i64| -> i64 {
            if endpoint < 0 {
                let shifted = endpoint + len;
                if shifted < 0 {
                    if step < 0 {
                        -1
                    } else {
                        0
                    }
                } else {
                    shifted
                }
            } else if endpoint >= len {
                if step < 0 {
                    len - 1
                } else {
                    len
                }
            } else {
                endpoint
            }
        };
        let start = match start {
            Some(s) => adjust(s),
            None if step < 0 => len - 1,
            None => 0,
        };
        let stop = match stop {
            Some(s) => adjust(s),
            None if step < 0 => -1,
            None => len,
        };
        let mut collected = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            collected.push(items[i as usize].clone());
            i += step;
        }
        Ok(rt.create_array(collected))
    }
}
