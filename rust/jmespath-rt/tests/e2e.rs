//! End-to-end evaluation through the public `search` surface.

use jmespath_rt::{parse_json, search, EvalError, SearchError, Value};

/// Helper: parse the data, run the expression, return the result.
fn run(expr: &str, data: &str) -> Value {
    let input = parse_json(data).expect("input should be valid JSON");
    search(expr, &input).expect("expression should evaluate")
}

fn run_json(expr: &str, data: &str) -> String {
    run(expr, data).to_json_string()
}

// ─── Core scenarios ───

#[test]
fn projects_field_over_list_wildcard() {
    assert_eq!(
        run_json(
            "people[*].name",
            r#"{"people": [{"name": "Alice"}, {"name": "Bob"}]}"#
        ),
        r#"["Alice","Bob"]"#
    );
}

#[test]
fn filters_by_comparison() {
    assert_eq!(
        run_json(
            "people[?age > `25`].name",
            r#"{"people": [{"name": "A", "age": 25}, {"name": "B", "age": 30}]}"#
        ),
        r#"["B"]"#
    );
}

#[test]
fn flatten_projection_and_nested_flatten() {
    let data = r#"{"groups": [{"members": ["A", "B"]}, {"members": ["C"]}]}"#;
    assert_eq!(run_json("groups[].members", data), r#"[["A","B"],["C"]]"#);
    assert_eq!(run_json("groups[].members[]", data), r#"["A","B","C"]"#);
}

#[test]
fn index_applies_per_element_inside_projection() {
    assert_eq!(
        run_json("items[*][0]", r#"{"items": [[1, 2], [3, 4], [5, 6]]}"#),
        "[1,3,5]"
    );
}

#[test]
fn pipe_applies_to_the_projected_array() {
    assert_eq!(
        run_json("items[*] | [0]", r#"{"items": [[1, 2], [3, 4], [5, 6]]}"#),
        "[1,2]"
    );
}

#[test]
fn sorts_then_indexes_then_projects() {
    assert_eq!(
        run(
            "sort_by(p, &age)[0].name",
            r#"{"p": [{"name": "A", "age": 30}, {"name": "B", "age": 20}]}"#
        ),
        Value::String("B".into())
    );
}

#[test]
fn multi_select_hash_inside_projection() {
    assert_eq!(
        run_json(
            "users[*].{n: firstName, y: age}",
            r#"{"users": [{"firstName": "A", "age": 1}]}"#
        ),
        r#"[{"n":"A","y":1}]"#
    );
}

// ─── Boundary behaviors ───

#[test]
fn negative_and_out_of_range_indexes() {
    let data = r#"{"a": [1, 2, 3]}"#;
    assert_eq!(run("a[-1]", data), Value::Int(3));
    assert_eq!(run("a[-3]", data), Value::Int(1));
    assert_eq!(run("a[-4]", data), Value::Null);
    assert_eq!(run("a[3]", data), Value::Null);
}

#[test]
fn slice_boundaries() {
    let data = "[0, 1, 2, 3, 4]";
    assert_eq!(run_json("[3:1]", data), "[]");
    assert_eq!(run_json("[3:1:-1]", data), "[3,2]");
    assert_eq!(run_json("[::-2]", data), "[4,2,0]");
    assert_eq!(run_json("[:100]", data), "[0,1,2,3,4]");
    assert_eq!(run("[0:3]", r#"{"not": "an array"}"#), Value::Null);
}

#[test]
fn null_propagates_through_access_chains() {
    assert_eq!(run("a.b.c.d", "{}"), Value::Null);
    assert_eq!(run("a[0].b", "{}"), Value::Null);
    assert_eq!(run("*.a", "[1, 2]"), Value::Null);
    assert_eq!(run("a[*]", r#"{"a": {"not": "array"}}"#), Value::Null);
}

#[test]
fn mixed_kind_ordering_comparison_yields_null() {
    assert_eq!(run("`1` < `\"a\"`", "{}"), Value::Null);
    assert_eq!(run("`[]` >= `{}`", "{}"), Value::Null);
    // Equality is defined across kinds and is simply false.
    assert_eq!(run("`1` == `\"1\"`", "{}"), Value::Bool(false));
}

#[test]
fn equality_is_deep_and_numeric() {
    assert_eq!(run("`{\"a\": [1]}` == `{\"a\": [1.0]}`", "{}"), Value::Bool(true));
    assert_eq!(run("`[1, 2]` != `[1, 2]`", "{}"), Value::Bool(false));
}

#[test]
fn filter_keeps_elements_unchanged() {
    let data = r#"{"xs": [{"a": 1, "b": 2}, {"a": 0}]}"#;
    // Numbers are truthy, zero included; both elements pass `a` existence.
    assert_eq!(run_json("xs[?a]", data), r#"[{"a":1,"b":2},{"a":0}]"#);
    assert_eq!(run_json("xs[?b]", data), r#"[{"a":1,"b":2}]"#);
}

#[test]
fn truthiness_drives_boolean_operators() {
    let data = r#"{"empty_list": [], "empty_hash": {}, "zero": 0, "word": "x"}"#;
    assert_eq!(run("empty_list || word", data), Value::String("x".into()));
    assert_eq!(run("empty_hash || word", data), Value::String("x".into()));
    assert_eq!(run("zero || word", data), Value::Int(0));
    assert_eq!(run("!empty_list", data), Value::Bool(true));
    assert_eq!(run("!word", data), Value::Bool(false));
}

#[test]
fn raw_strings_and_literals() {
    assert_eq!(run("'raw value'", "{}"), Value::String("raw value".into()));
    assert_eq!(run("`{\"a\": 1}`.a", "{}"), Value::Int(1));
    assert_eq!(run_json("`[1, 2]`", "{}"), "[1,2]");
}

#[test]
fn quoted_identifiers_reach_awkward_keys() {
    assert_eq!(
        run("\"key with spaces\"", r#"{"key with spaces": 7}"#),
        Value::Int(7)
    );
    assert_eq!(run("\"a.b\"", r#"{"a.b": 1, "a": {"b": 2}}"#), Value::Int(1));
}

#[test]
fn object_wildcard_values_keep_insertion_order() {
    assert_eq!(
        run_json("*.v", r#"{"z": {"v": 1}, "m": {"v": 2}, "a": {"v": 3}}"#),
        "[1,2,3]"
    );
}

#[test]
fn current_node_is_the_input() {
    assert_eq!(run_json("@", "[1, 2]"), "[1,2]");
    assert_eq!(run_json("@ | @", r#"{"a": 1}"#), r#"{"a":1}"#);
}

#[test]
fn multi_select_on_null_input_is_null() {
    assert_eq!(run("missing.[a, b]", "{}"), Value::Null);
    assert_eq!(run("missing.{a: b}", "{}"), Value::Null);
}

#[test]
fn projection_results_drop_nulls_but_multi_select_keeps_them() {
    let data = r#"{"xs": [{"a": 1}, {"b": 2}]}"#;
    assert_eq!(run_json("xs[*].a", data), "[1]");
    assert_eq!(run_json("xs[*].[a]", data), "[[1],[null]]");
}

// ─── Error surfaces ───

#[test]
fn parse_errors_carry_positions() {
    let data = parse_json("{}").unwrap();
    match search("foo.[bar", &data).unwrap_err() {
        SearchError::Compile(err) => {
            let (line, col) = err.position();
            assert_eq!(line, 1);
            assert_eq!(col, 9);
            assert_eq!(err.offset(), 8);
        }
        other => panic!("expected compile error, got {:?}", other),
    }
}

#[test]
fn unknown_function_is_reported_by_name() {
    let data = parse_json("{}").unwrap();
    match search("no_such_fn(@)", &data).unwrap_err() {
        SearchError::Eval(EvalError::UnknownFunction { name }) => {
            assert_eq!(name, "no_such_fn");
        }
        other => panic!("expected unknown function, got {:?}", other),
    }
}

#[test]
fn slice_step_zero_is_invalid_value() {
    let data = parse_json("[1, 2, 3]").unwrap();
    assert!(matches!(
        search("[::0]", &data).unwrap_err(),
        SearchError::Eval(EvalError::InvalidValue { .. })
    ));
}

#[test]
fn expref_outside_function_arguments_is_inert_data() {
    // The parser accepts `&expr` anywhere; only functions consume it.
    let data = parse_json("{}").unwrap();
    let result = search("&a", &data).unwrap();
    assert_eq!(result.kind(), jmespath_rt::Kind::Expref);
}
