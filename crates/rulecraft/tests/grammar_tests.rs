//! Grammar registry, inheritance and validation

use rulecraft::grammar::{
    CharClass, Expr, Grammar, GrammarBuilder, GrammarError, ProtoGroup, Resolved, Rule,
    RuleKind, RuleOrigin, SimpleRule, ValidationOptions,
};
use rulecraft::parser::parse;
use rulecraft::syntax::Match;
use std::sync::Arc;

fn base() -> Arc<Grammar> {
    GrammarBuilder::new("Base")
        .rule("list", Expr::separated(Expr::call("item"), Expr::literal(","), 1))
        .token("item", Expr::call("value"))
        .proto("value")
        .token_alt("value", "num", Expr::plus(Expr::class(CharClass::digit())))
        .token_alt("value", "word", Expr::plus(Expr::class(CharClass::alpha())))
        .build_shared()
        .expect("valid grammar")
}

#[test]
fn test_resolve_simple_and_proto() {
    let grammar = base();
    assert!(matches!(grammar.resolve("list"), Ok(Resolved::Simple(_))));
    let value = grammar.resolve("value").expect("proto group");
    assert!(value.is_proto());
    assert_eq!(value.tags(), ["num", "word"]);
}

#[test]
fn test_resolve_unknown() {
    let grammar = base();
    let err = grammar.resolve("nope").expect_err("unknown");
    assert!(matches!(err, GrammarError::UnknownRule { ref rule, .. } if rule == "nope"));
    assert!(!grammar.contains("nope"));
}

#[test]
fn test_derive_without_overrides_resolves_identically() {
    let parent = base();
    let child = Grammar::derive("Child", &parent);
    for name in parent.names() {
        assert_eq!(
            child.resolve(name).expect("inherited"),
            parent.resolve(name).expect("defined")
        );
    }
    assert_eq!(child.names(), parent.names());
    assert_eq!(child.depth(), 1);
    assert_eq!(child.parent().map(|p| p.name()), Some("Base"));
}

#[test]
fn test_override_only_affects_child() {
    let parent = base();
    let mut child = Grammar::derive("Child", &parent);
    child.register("item", SimpleRule::token(Expr::literal("x")));

    assert!(matches!(child.lookup("item"), RuleOrigin::Own(_)));
    assert!(matches!(
        child.lookup("list"),
        RuleOrigin::Inherited { grammar, .. } if grammar.name() == "Base"
    ));
    assert!(matches!(child.lookup("missing"), RuleOrigin::NotFound));

    assert!(parse::<()>(&child, "list", "x,x", true).is_ok());
    assert!(parse::<()>(&child, "list", "1,2", true).is_err());
    assert!(parse::<()>(&parent, "list", "1,2", true).is_ok());
}

#[test]
fn test_proto_merge_across_three_levels() {
    let root = base();
    let middle = GrammarBuilder::derive("Middle", &root)
        .token_alt("value", "word", Expr::literal("WORD"))
        .token_alt("value", "hex", Expr::seq([
            Expr::literal("0x"),
            Expr::plus(Expr::class(CharClass::xdigit())),
        ]))
        .build_shared()
        .expect("valid grammar");
    let leaf = GrammarBuilder::derive("Leaf", &middle)
        .token_alt("value", "bool", Expr::longest([Expr::literal("true"), Expr::literal("false")]))
        .build()
        .expect("valid grammar");

    let resolved = leaf.resolve("value").expect("proto group");
    assert_eq!(resolved.tags(), ["num", "word", "hex", "bool"]);

    let node: Match = parse(&leaf, "value", "WORD", true).expect("replaced alternative");
    assert_eq!(node.alt_tag(), Some("word"));
    assert!(parse::<()>(&leaf, "value", "abc", true).is_err());
    assert!(parse::<()>(&root, "value", "abc", true).is_ok());

    let node: Match = parse(&leaf, "value", "0x1f", true).expect("inherited from middle");
    assert_eq!(node.alt_tag(), Some("hex"));
}

#[test]
fn test_simple_rule_ends_proto_merge() {
    let root = base();
    let middle = GrammarBuilder::derive("Middle", &root)
        .token("value", Expr::literal("only"))
        .build_shared()
        .expect("valid grammar");
    let leaf = GrammarBuilder::derive("Leaf", &middle)
        .token_alt("value", "extra", Expr::literal("extra"))
        .build()
        .expect("valid grammar");

    assert_eq!(leaf.resolve("value").expect("group").tags(), ["extra"]);
    assert!(matches!(middle.resolve("value"), Ok(Resolved::Simple(_))));
}

#[test]
fn test_ws_override_reaches_inherited_rules() {
    let parent = GrammarBuilder::new("Words")
        .rule("words", Expr::plus(Expr::call("word")))
        .token("word", Expr::plus(Expr::class(CharClass::alpha())))
        .build_shared()
        .expect("valid grammar");
    let child = GrammarBuilder::derive("Dashed", &parent)
        .token("ws", Expr::star(Expr::class(CharClass::any_of("- "))))
        .build()
        .expect("valid grammar");

    assert!(parse::<()>(&parent, "words", "ab cd", true).is_ok());
    assert!(parse::<()>(&parent, "words", "ab-cd", true).is_err());
    let node: Match = parse(&child, "words", "ab-cd - ef", true).expect("dashes are whitespace");
    assert_eq!(node.all("word").len(), 3);
}

#[test]
fn test_register_alternative_on_simple_rule() {
    let mut grammar = Grammar::new("G");
    grammar.register("value", SimpleRule::token(Expr::literal("x")));
    let err = grammar
        .register_alternative("value", "y", SimpleRule::token(Expr::literal("y")))
        .expect_err("simple rule");
    assert!(matches!(err, GrammarError::NotAProtoGroup { .. }));
}

#[test]
fn test_register_replaces_own_entry() {
    let mut grammar = Grammar::new("G");
    assert!(grammar.register("a", SimpleRule::token(Expr::literal("a"))).is_none());
    let previous = grammar.register("a", ProtoGroup::new().with("x", SimpleRule::token(Expr::literal("x"))));
    assert!(matches!(previous, Some(Rule::Simple(_))));
    assert_eq!(grammar.own_names().collect::<Vec<_>>(), ["a"]);
}

#[test]
fn test_builder_duplicate_alternative() {
    let err = GrammarBuilder::new("G")
        .token_alt("value", "a", Expr::literal("a"))
        .token_alt("value", "a", Expr::literal("b"))
        .build()
        .expect_err("duplicate tag");
    assert_eq!(
        err,
        GrammarError::DuplicateAlternative {
            group: "value".into(),
            tag: "a".into()
        }
    );
}

#[test]
fn test_validation_reports_unknown_reference() {
    let err = GrammarBuilder::new("G")
        .rule("pair", Expr::seq([Expr::call("strng"), Expr::literal(":")]))
        .token("string", Expr::literal("\"\""))
        .build()
        .expect_err("unknown rule");
    let message = err.to_string();
    assert!(message.contains("strng"), "{message}");
    assert!(message.contains("string"), "{message}");
}

#[test]
fn test_validation_reports_empty_proto() {
    let err = GrammarBuilder::new("G")
        .proto("value")
        .build()
        .expect_err("no alternatives");
    assert!(matches!(err, GrammarError::EmptyProtoGroup { .. }));
}

#[test]
fn test_validation_reports_left_recursion() {
    let err = GrammarBuilder::new("Expr")
        .rule(
            "expr",
            Expr::choice([
                Expr::seq([Expr::call("expr"), Expr::literal("+"), Expr::call("term")]),
                Expr::call("term"),
            ]),
        )
        .token("term", Expr::plus(Expr::class(CharClass::digit())))
        .build()
        .expect_err("left recursive");
    assert!(matches!(err, GrammarError::LeftRecursion(_)));
    assert_eq!(err.to_string(), "left recursion: expr -> expr");

    let unchecked = GrammarBuilder::new("Expr")
        .validation(ValidationOptions {
            check_left_recursion: false,
            ..ValidationOptions::default()
        })
        .rule("expr", Expr::seq([Expr::call("expr"), Expr::literal("+")]))
        .build();
    assert!(unchecked.is_ok());
}

#[test]
fn test_rule_kinds() {
    assert!(RuleKind::Rule.default_sigspace());
    assert!(!RuleKind::Token.default_sigspace());
    assert!(!RuleKind::Regex.default_sigspace());

    let grammar = GrammarBuilder::new("G")
        .define(
            "spaced",
            SimpleRule::token(Expr::seq([Expr::literal("a"), Expr::literal("b")])).with_sigspace(true),
        )
        .build()
        .expect("valid grammar");
    assert!(parse::<()>(&grammar, "spaced", "a  b", true).is_ok());
}
