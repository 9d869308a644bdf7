//! Grammar coverage through the public compile surface.

use jmespath_compiler::compiler::ast::{Comparator, Node};
use jmespath_compiler::{compile, CompileError};

fn field(name: &str) -> Node {
    Node::Field(name.to_string())
}

#[test]
fn accepts_all_literal_forms() {
    assert_eq!(
        compile("`\"text\"`").unwrap(),
        Node::Literal(serde_json::json!("text"))
    );
    assert_eq!(
        compile("`{\"a\": [1, true, null]}`").unwrap(),
        Node::Literal(serde_json::json!({"a": [1, true, null]}))
    );
    assert_eq!(
        compile("'raw'").unwrap(),
        Node::RawString("raw".to_string())
    );
    assert_eq!(compile("\"quoted id\"").unwrap(), field("quoted id"));
}

#[test]
fn escaped_backtick_stays_inside_literal() {
    assert_eq!(
        compile(r#"`"a\`b"`"#).unwrap(),
        Node::Literal(serde_json::json!("a`b"))
    );
}

#[test]
fn precedence_pipe_or_and_comparator() {
    // a || b | c parses as (a || b) | c: pipe binds loosest.
    assert_eq!(
        compile("a || b | c").unwrap(),
        Node::Pipe {
            left: Box::new(Node::Or {
                left: Box::new(field("a")),
                right: Box::new(field("b")),
            }),
            right: Box::new(field("c")),
        }
    );
    // a == b && c == d parses as (a == b) && (c == d).
    assert_eq!(
        compile("a == b && c == d").unwrap(),
        Node::And {
            left: Box::new(Node::Comparison {
                op: Comparator::Eq,
                left: Box::new(field("a")),
                right: Box::new(field("b")),
            }),
            right: Box::new(Node::Comparison {
                op: Comparator::Eq,
                left: Box::new(field("c")),
                right: Box::new(field("d")),
            }),
        }
    );
}

#[test]
fn comparators_bind_tighter_than_not() {
    // !a == b applies the comparison to !a's operand result: !(a) == b.
    assert_eq!(
        compile("!a == b").unwrap(),
        Node::Comparison {
            op: Comparator::Eq,
            left: Box::new(Node::Not(Box::new(field("a")))),
            right: Box::new(field("b")),
        }
    );
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(
        compile("a | (b || c)").unwrap(),
        Node::Pipe {
            left: Box::new(field("a")),
            right: Box::new(Node::Or {
                left: Box::new(field("b")),
                right: Box::new(field("c")),
            }),
        }
    );
}

#[test]
fn projection_chains_attach_dots_and_filters() {
    assert_eq!(
        compile("a[*].b[?c].d").unwrap(),
        Node::Projection {
            left: Box::new(field("a")),
            right: Box::new(Node::FilterProjection {
                left: Box::new(field("b")),
                predicate: Box::new(field("c")),
                right: Box::new(field("d")),
            }),
        }
    );
}

#[test]
fn flatten_chains_through_projections() {
    // a[].b[].c: the second flatten applies to the first projection's
    // output, then projects .c over the merged array.
    assert_eq!(
        compile("a[].b[].c").unwrap(),
        Node::Projection {
            left: Box::new(Node::Flatten(Box::new(Node::Projection {
                left: Box::new(Node::Flatten(Box::new(field("a")))),
                right: Box::new(field("b")),
            }))),
            right: Box::new(field("c")),
        }
    );
}

#[test]
fn slices_allow_all_omission_patterns() {
    let cases = [
        ("a[:]", None, None, None),
        ("a[1:]", Some(1), None, None),
        ("a[:2]", None, Some(2), None),
        ("a[1:2:3]", Some(1), Some(2), Some(3)),
        ("a[::-1]", None, None, Some(-1)),
    ];
    for (expr, start, stop, step) in cases {
        match compile(expr).unwrap() {
            Node::Projection { left, .. } => match *left {
                Node::Subexpression { right, .. } => {
                    assert_eq!(
                        *right,
                        Node::Slice { start, stop, step },
                        "slice fields for {}",
                        expr
                    );
                }
                other => panic!("expected slice subexpression for {}, got {:?}", expr, other),
            },
            other => panic!("expected projection for {}, got {:?}", expr, other),
        }
    }
}

#[test]
fn function_calls_nest() {
    assert_eq!(
        compile("sort(keys(a))").unwrap(),
        Node::FunctionCall {
            name: "sort".to_string(),
            args: vec![Node::FunctionCall {
                name: "keys".to_string(),
                args: vec![field("a")],
            }],
        }
    );
}

#[test]
fn filter_can_stand_alone() {
    assert_eq!(
        compile("[?a]").unwrap(),
        Node::FilterProjection {
            left: Box::new(Node::Current),
            predicate: Box::new(field("a")),
            right: Box::new(Node::Current),
        }
    );
}

#[test]
fn rejects_malformed_expressions() {
    for expr in [
        "",
        ".",
        "foo.",
        "foo..bar",
        "[",
        "a[}",
        "a ||",
        "a == ",
        "{a}",
        "{a: }",
        "foo(",
        "a.b)",
        "&",
        "a[1:2:3:4]",
        "a[b]",
    ] {
        assert!(
            matches!(compile(expr), Err(CompileError::Parse(_))),
            "expected parse error for {:?}",
            expr
        );
    }
}

#[test]
fn rejects_malformed_tokens() {
    for expr in ["a = b", "'unterminated", "\"open", "`{`", "a # b", "-x"] {
        assert!(
            matches!(compile(expr), Err(CompileError::Lex(_))),
            "expected lex error for {:?}",
            expr
        );
    }
}

#[test]
fn error_positions_point_at_the_offending_token() {
    let err = compile("foo.bar ~").unwrap_err();
    assert_eq!(err.offset(), 8);
    assert_eq!(err.position(), (1, 9));

    let err = compile("a.b ==").unwrap_err();
    assert_eq!(err.offset(), 6);
    assert_eq!(err.position(), (1, 7));
}
