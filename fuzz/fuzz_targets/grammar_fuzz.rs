#![no_main]
use libfuzzer_sys::fuzz_target;
use rulecraft::grammar::{CharClass, Expr, Grammar, GrammarBuilder};
use rulecraft::parser::{MatchConfig, parse_with_config};
use std::sync::{Arc, OnceLock};

static GRAMMAR: OnceLock<Arc<Grammar>> = OnceLock::new();

fn grammar() -> Arc<Grammar> {
    Arc::clone(GRAMMAR.get_or_init(|| {
        GrammarBuilder::new("Fuzz")
            .rule("list", Expr::separated(Expr::call("item"), Expr::literal(","), 0))
            .rule(
                "item",
                Expr::longest([
                    Expr::call("atom"),
                    Expr::goal(Expr::literal("("), Expr::literal(")"), Expr::call("list")),
                ]),
            )
            .proto("atom")
            .token_alt("atom", "word", Expr::plus(Expr::class(CharClass::alpha())))
            .token_alt("atom", "num", Expr::plus(Expr::class(CharClass::digit())))
            .token_alt("atom", "nil", Expr::sym())
            .build_shared()
            .expect("valid grammar")
    }))
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let config = MatchConfig {
        max_depth: 128,
        ..MatchConfig::default()
    };
    let grammar = grammar();
    match parse_with_config::<()>(&grammar, "list", input, true, &config) {
        Ok(tree) => assert_eq!(tree.span().end(), input.len()),
        Err(err) => {
            if let Some(position) = err.position() {
                assert!(position <= input.len());
            }
        }
    }
});
