use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Abstract syntax tree of a parsed JMESPath expression.
///
/// Nodes are immutable after parse. Subtrees referenced by `ExpressionRef`
/// are shared via `Arc` so that a compiled expression and the expression
/// values it produces at runtime point at the same data, and so compiled
/// expressions stay shareable across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// The `@` self-reference
    Current,
    /// Unquoted or quoted identifier: `foo`, `"foo bar"`
    Field(String),
    /// Concrete index: `[0]`, `[-1]`; negative counts from the end
    Index(i64),
    /// Python-style slice: `[start:stop:step]`
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    /// `[]` — one level of array flattening; the base for a projection
    Flatten(Box<Node>),
    /// Object `*` — the values of an object, in insertion order
    ObjectValues(Box<Node>),
    /// Result of projection rewiring: apply `right` to every element of
    /// the array produced by `left`, dropping null results
    Projection {
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `[?predicate]` — retain elements whose predicate is truthy, then
    /// apply `right` like a projection
    FilterProjection {
        left: Box<Node>,
        predicate: Box<Node>,
        right: Box<Node>,
    },
    /// `left.right` composition
    Subexpression {
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `left | right`; the right side evaluates in a fresh context
    Pipe {
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `==`, `!=`, `<`, `<=`, `>`, `>=`
    Comparison {
        op: Comparator,
        left: Box<Node>,
        right: Box<Node>,
    },
    And {
        left: Box<Node>,
        right: Box<Node>,
    },
    Or {
        left: Box<Node>,
        right: Box<Node>,
    },
    Not(Box<Node>),
    /// `[a, b, c]`
    MultiSelectList(Vec<Node>),
    /// `{k1: e1, k2: e2}`; insertion-ordered
    MultiSelectHash(Vec<(String, Node)>),
    /// Decoded backtick JSON literal
    Literal(serde_json::Value),
    /// Single-quoted raw string
    RawString(String),
    /// `name(arg, ...)`
    FunctionCall {
        name: String,
        args: Vec<Node>,
    },
    /// `&expr` — a first-class reference to an unevaluated subtree
    ExpressionRef(Arc<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Eq => write!(f, "=="),
            Comparator::NotEq => write!(f, "!="),
            Comparator::Lt => write!(f, "<"),
            Comparator::LtEq => write!(f, "<="),
            Comparator::Gt => write!(f, ">"),
            Comparator::GtEq => write!(f, ">="),
        }
    }
}
