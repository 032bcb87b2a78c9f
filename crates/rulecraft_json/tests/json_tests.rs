//! End-to-end tests of the JSON grammar, its derived grammars and actions

use rulecraft::error::ParseError;
use rulecraft::parser::{MatchConfig, parse};
use rulecraft::syntax::Match;
use rulecraft_json::grammar::{self, TOP, VALUE};
use rulecraft_json::{JsonError, JsonParser, JsonValue, MAX_DEPTH, parse_json};

#[test]
fn test_number_alternative() {
    let grammar = grammar::grammar().expect("valid grammar");
    let node: Match = parse(&grammar, VALUE, "42", true).expect("number");
    assert_eq!(node.alt_tag(), Some("number"));
    assert_eq!((node.span().start(), node.span().end()), (0, 2));
}

#[test]
fn test_object_tree_shape() {
    let grammar = grammar::grammar().expect("valid grammar");
    let input = r#"{"a":1}"#;
    let tree: Match = parse(&grammar, TOP, input, true).expect("object");
    assert_eq!(tree.span().len(), input.len());

    let object = tree.one("object").expect("object capture");
    let pairlist = object.one("pairlist").expect("pairlist capture");
    let pairs = pairlist.all("pair");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].one("string").map(|s| s.text(input)), Some("\"a\""));
    let value = pairs[0].one("value").expect("value capture");
    assert_eq!(value.text(input), "1");
    assert_eq!(value.alt_tag(), Some("number"));

    let parsed = parse_json(input).expect("valid JSON");
    assert_eq!(parsed, JsonValue::Object(vec![("a".into(), JsonValue::Number(1.0))]));
}

#[test]
fn test_trailing_comma_is_rejected() {
    let input = r#"{"a":1,}"#;
    let err = parse_json(input).expect_err("trailing comma");
    let failure = err.failure().expect("syntactic failure");
    // The separator matched, the pair after it did not
    assert_eq!(failure.position(), 7);
    assert!(!failure.is_goal());
    assert!(parse_json("[1,]").is_err());
    assert!(parse_json("[,1]").is_err());
}

#[test]
fn test_comments_only_in_derived_grammar() {
    let input = "{ \"x\": 1 // note\n}";
    assert!(parse_json(input).is_err());

    let commented = JsonParser::commented().expect("valid grammar");
    let value = commented.parse(input).expect("comment is whitespace");
    assert_eq!(value.get("x"), Some(&JsonValue::Number(1.0)));
    assert_eq!(commented.grammar().parent().map(|p| p.name()), Some("JSON"));
}

#[test]
fn test_nan_only_in_derived_grammar() {
    let base = JsonParser::new().expect("valid grammar");
    let nan = JsonParser::with_nan().expect("valid grammar");

    assert!(base.parse_value("nan").is_err());
    assert!(base.parse("[NaN]").is_err());

    let value = nan.parse_value("nan").expect("nan literal");
    assert!(value.as_f64().is_some_and(f64::is_nan));
    let value = nan.parse("[1, NaN]").expect("array with NaN");
    assert!(value.at(1).and_then(JsonValue::as_f64).is_some_and(f64::is_nan));

    let grammar = grammar::with_nan().expect("valid grammar");
    let node: Match = parse(&grammar, VALUE, "NaN", true).expect("NaN literal");
    assert_eq!(node.alt_tag(), Some("NaN"));
}

#[test]
fn test_full_document() {
    let input = r#"
        {
            "name": "rulecraft",
            "version": 0.1,
            "tags": ["peg", "grammar"],
            "nested": {"empty": {}, "list": [], "flag": true, "none": null},
            "escaped": "line\nbreak é"
        }
    "#;
    let value = parse_json(input).expect("valid JSON");
    assert_eq!(value.kind(), "object");
    assert_eq!(value.get("version").and_then(JsonValue::as_f64), Some(0.1));
    assert_eq!(value.get("tags").and_then(JsonValue::as_array).map(<[_]>::len), Some(2));
    let nested = value.get("nested").expect("nested object");
    assert_eq!(nested.get("empty"), Some(&JsonValue::Object(Vec::new())));
    assert_eq!(nested.get("list"), Some(&JsonValue::Array(Vec::new())));
    assert_eq!(nested.get("flag"), Some(&JsonValue::Bool(true)));
    assert!(nested.get("none").is_some_and(JsonValue::is_null));
    assert_eq!(
        value.get("escaped").and_then(JsonValue::as_str),
        Some("line\nbreak é")
    );
}

#[test]
fn test_top_level_must_be_container() {
    assert!(parse_json("42").is_err());
    assert!(parse_json("\"text\"").is_err());
    assert!(parse_json("").is_err());
    assert!(parse_json("  []  ").is_ok());
}

#[test]
fn test_unterminated_string_reports_goal() {
    let input = r#"{"a": "open}"#;
    let err = parse_json(input).expect_err("unterminated");
    let failure = err.failure().expect("syntactic failure");
    assert!(failure.is_goal());
    assert_eq!(failure.goal.as_deref(), Some("'\"'"));
    assert_eq!(failure.rule.as_deref(), Some("string"));
    assert_eq!(failure.position(), input.len());
}

#[test]
fn test_unclosed_array_reports_goal() {
    let err = parse_json("[1, 2").expect_err("unclosed");
    assert_eq!(
        err.to_string(),
        "couldn't find final ']' at offset 5 while matching `array`"
    );
}

#[test]
fn test_nesting_depth_is_bounded() {
    let parser = JsonParser::new().expect("valid grammar").with_config(MatchConfig {
        max_depth: 64,
        ..MatchConfig::default()
    });
    let shallow = format!("{}{}", "[".repeat(10), "]".repeat(10));
    assert!(parser.parse(&shallow).is_ok());

    let deep = format!("{}{}", "[".repeat(40), "]".repeat(40));
    let err = parser.parse(&deep).expect_err("too deep");
    assert!(matches!(
        err,
        JsonError::Parse(ParseError::StackExhausted { depth: 64, .. })
    ));
}

fn nested_arrays(levels: usize) -> String {
    format!("{}1{}", "[".repeat(levels), "]".repeat(levels))
}

#[test]
fn test_default_depth_handles_deep_nesting() {
    let levels = MAX_DEPTH / 3 - 2;
    let mut value = &parse_json(&nested_arrays(levels)).expect("nested arrays");
    let mut depth = 0;
    while let Some(inner) = value.at(0) {
        value = inner;
        depth += 1;
    }
    assert_eq!(depth, levels);
    assert_eq!(value, &JsonValue::Number(1.0));
}

#[test]
fn test_default_depth_rejects_deeper_nesting() {
    let err = parse_json(&nested_arrays(MAX_DEPTH / 3 + 2)).expect_err("too deep");
    assert!(matches!(
        err,
        JsonError::Parse(ParseError::StackExhausted { depth: MAX_DEPTH, .. })
    ));

    let objects = format!("{}1{}", "{\"k\":".repeat(MAX_DEPTH), "}".repeat(MAX_DEPTH));
    let err = parse_json(&objects).expect_err("too deep");
    assert!(matches!(
        err,
        JsonError::Parse(ParseError::StackExhausted { .. })
    ));
}

#[test]
fn test_display_reparses() {
    let input = r#"{"k": [1.5, "two\t\"quoted\"", false, null, {"x": -3e2}]}"#;
    let value = parse_json(input).expect("valid JSON");
    let text = value.to_string();
    assert_eq!(text, r#"{"k":[1.5,"two\t\"quoted\"",false,null,{"x":-300}]}"#);
    assert_eq!(parse_json(&text).expect("display output is JSON"), value);
}
