//! Goal-directed bracket matching (`open ~ goal inner`)

use rulecraft::grammar::{CharClass, Expr, Grammar, GrammarBuilder};
use rulecraft::parser::parse;
use rulecraft::syntax::Match;

/// rule block { '{' ~ '}' <items> }
/// rule items { <item>* % ',' }
/// token item { <[a..z]>+ | <block> }
fn blocks() -> Grammar {
    GrammarBuilder::new("Blocks")
        .rule(
            "block",
            Expr::goal(Expr::literal("{"), Expr::literal("}"), Expr::call("items")),
        )
        .rule("items", Expr::separated(Expr::call("item"), Expr::literal(","), 0))
        .token(
            "item",
            Expr::choice([
                Expr::plus(Expr::class(CharClass::range('a', 'z'))),
                Expr::call("block"),
            ]),
        )
        .build()
        .expect("valid grammar")
}

#[test]
fn test_goal_matches_open_inner_goal() {
    let grammar = blocks();
    let input = "{ a, b ,c }";
    let node: Match = parse(&grammar, "block", input, true).expect("matches");
    assert_eq!(node.span().len(), input.len());
    let items = node.one("items").expect("inner captured");
    assert_eq!(items.all("item").len(), 3);
}

#[test]
fn test_missing_goal_is_reported() {
    let grammar = blocks();
    let input = "{a,b";
    let err = parse::<()>(&grammar, "block", input, true).expect_err("unclosed");
    let failure = err.failure().expect("syntactic failure");
    assert!(failure.is_goal());
    assert_eq!(failure.goal.as_deref(), Some("'}'"));
    assert_eq!(failure.position(), input.len());
    assert_eq!(failure.expected, ["'}'"]);
    assert_eq!(failure.rule.as_deref(), Some("block"));
    assert_eq!(
        err.to_string(),
        "couldn't find final '}' at offset 4 while matching `block`"
    );
}

#[test]
fn test_wrong_closer_is_reported_as_goal() {
    let grammar = blocks();
    let err = parse::<()>(&grammar, "block", "{a]", true).expect_err("wrong closer");
    let failure = err.failure().expect("syntactic failure");
    assert!(failure.is_goal());
    assert_eq!(failure.position(), 2);
}

#[test]
fn test_unclosed_outer_goal_is_reported() {
    let grammar = blocks();
    let input = "{a,{b,c}";
    let err = parse::<()>(&grammar, "block", input, true).expect_err("outer unclosed");
    let failure = err.failure().expect("syntactic failure");
    assert!(failure.is_goal());
    assert_eq!(failure.position(), input.len());

    let rendered = failure.render(input);
    assert!(rendered.contains("1 | {a,{b,c}"), "{rendered}");
}

#[test]
fn test_further_failure_beats_goal_and_goal_wins_ties() {
    let grammar = GrammarBuilder::new("Pairs")
        .token(
            "pair",
            Expr::goal(
                Expr::literal("("),
                Expr::literal(")"),
                Expr::seq([
                    Expr::literal("x"),
                    Expr::opt(Expr::seq([Expr::literal("y"), Expr::literal("z")])),
                ]),
            ),
        )
        .build()
        .expect("valid grammar");
    // The optional "yz" fails at 3, one past the missing ')'.
    let err = parse::<()>(&grammar, "pair", "(xy)", true).expect_err("no match");
    let failure = err.failure().expect("syntactic failure");
    assert_eq!(failure.position(), 3);
    assert!(!failure.is_goal());
    assert_eq!(failure.expected, ["'z'"]);

    let err = parse::<()>(&grammar, "pair", "(x]", true).expect_err("no match");
    let failure = err.failure().expect("syntactic failure");
    assert_eq!(failure.position(), 2);
    assert!(failure.is_goal());
}

#[test]
fn test_goal_named_captures_are_kept() {
    let grammar = GrammarBuilder::new("Quoted")
        .token(
            "quoted",
            Expr::goal(
                Expr::named("open", Expr::class(CharClass::any_of("'\""))),
                Expr::seq([
                    Expr::named("close", Expr::class(CharClass::any_of("'\""))),
                    Expr::group(Expr::empty()),
                ]),
                Expr::named("body", Expr::star(Expr::class(CharClass::alpha()))),
            ),
        )
        .build()
        .expect("valid grammar");
    let input = "'abc'";
    let node: Match = parse(&grammar, "quoted", input, true).expect("matches");
    assert_eq!(node.one("open").map(|m| m.text(input)), Some("'"));
    assert_eq!(node.one("body").map(|m| m.text(input)), Some("abc"));
    assert_eq!(node.one("close").map(|m| m.text(input)), Some("'"));
    assert!(node.positional().is_empty());
}
