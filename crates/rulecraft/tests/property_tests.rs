//! Property-based tests for the matcher
//!
//! These tests use proptest to generate inputs and grammar samples and check
//! the matcher's structural guarantees on them.

#![cfg(test)]

use proptest::prelude::*;
use rulecraft::actions::Actions;
use rulecraft::grammar::{CharClass, Expr, Grammar, GrammarBuilder};
use rulecraft::parser::parse;
use rulecraft::syntax::Match;
use rulecraft::testing::{GeneratorConfig, SampleGenerator};
use std::sync::{Arc, Mutex};

fn arithmetic() -> Arc<Grammar> {
    GrammarBuilder::new("Arith")
        .rule("expr", Expr::separated(Expr::call("term"), Expr::call("addop"), 1))
        .rule("term", Expr::separated(Expr::call("factor"), Expr::call("mulop"), 1))
        .rule(
            "factor",
            Expr::choice([
                Expr::call("num"),
                Expr::goal(Expr::literal("("), Expr::literal(")"), Expr::call("expr")),
            ]),
        )
        .token("num", Expr::plus(Expr::class(CharClass::digit())))
        .proto("addop")
        .token_alt("addop", "+", Expr::sym())
        .token_alt("addop", "-", Expr::sym())
        .proto("mulop")
        .token_alt("mulop", "*", Expr::sym())
        .token_alt("mulop", "/", Expr::sym())
        .build_shared()
        .expect("valid grammar")
}

fn number_list() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..100_000, 1..20)
}

fn arithmetic_input() -> impl Strategy<Value = String> {
    "[0-9+*/() -]{0,40}"
}

proptest! {
    #[test]
    fn anchored_match_covers_whole_input(numbers in number_list(), spaced in any::<bool>()) {
        let grammar = arithmetic();
        let sep = if spaced { " + " } else { "+" };
        let input = numbers.iter().map(u32::to_string).collect::<Vec<_>>().join(sep);
        let node: Match = parse(&grammar, "expr", &input, true).expect("sum of numbers");
        prop_assert_eq!(node.span().start(), 0);
        prop_assert_eq!(node.span().end(), input.len());
        prop_assert_eq!(node.all("term").len(), numbers.len());
    }

    #[test]
    fn failures_point_into_the_input(input in arithmetic_input()) {
        let grammar = arithmetic();
        match parse::<()>(&grammar, "expr", &input, true) {
            Ok(node) => prop_assert_eq!(node.span().end(), input.len()),
            Err(err) => {
                let failure = err.failure().expect("syntactic failure");
                prop_assert!(failure.position() <= input.len());
                prop_assert!(!failure.expected.is_empty());
            }
        }
    }

    #[test]
    fn derived_grammar_without_overrides_matches_identically(input in arithmetic_input()) {
        let parent = arithmetic();
        let child = Grammar::derive("Same", &parent);
        let from_parent = parse::<()>(&parent, "expr", &input, true);
        let from_child = parse::<()>(&child, "expr", &input, true);
        prop_assert_eq!(from_parent, from_child);
    }

    #[test]
    fn matching_is_deterministic(input in arithmetic_input()) {
        let grammar = arithmetic();
        let first = parse::<()>(&grammar, "expr", &input, false);
        let second = parse::<()>(&grammar, "expr", &input, false);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn longest_tie_always_picks_first_alternative(word in "[a-z]{1,8}") {
        let grammar = GrammarBuilder::new("Tie")
            .proto("ident")
            .token_alt("ident", "lower", Expr::plus(Expr::class(CharClass::range('a', 'z'))))
            .token_alt("ident", "word", Expr::plus(Expr::class(CharClass::word())))
            .build()
            .expect("valid grammar");
        let node: Match = parse(&grammar, "ident", &word, true).expect("identifier");
        prop_assert_eq!(node.alt_tag(), Some("lower"));
    }

    #[test]
    fn actions_see_every_operand(numbers in number_list()) {
        let grammar = arithmetic();
        let input = numbers.iter().map(u32::to_string).collect::<Vec<_>>().join(" * ");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let actions = Actions::new().on("num", move |m: &Match<()>, _: &mut Option<()>| {
            log.lock().expect("not poisoned").push(m.as_str().to_string());
        });
        let mut tree: Match<()> = parse(&grammar, "expr", &input, true).expect("product");
        prop_assert_eq!(actions.apply(&mut tree), numbers.len());
        let expected: Vec<String> = numbers.iter().map(u32::to_string).collect();
        prop_assert_eq!(&*seen.lock().expect("not poisoned"), &expected);
    }

    #[test]
    fn generated_samples_parse(seed in 1u64..u64::MAX) {
        let grammar = arithmetic();
        let config = GeneratorConfig { seed: Some(seed), max_depth: 6, ..GeneratorConfig::default() };
        let generator = SampleGenerator::new(&grammar, config);
        for _ in 0..4 {
            let sample = generator.generate("expr").expect("known rule");
            prop_assert!(
                parse::<()>(&grammar, "expr", &sample, true).is_ok(),
                "sample {:?} was rejected",
                sample
            );
        }
    }

    #[test]
    fn mutated_samples_never_panic(seed in 1u64..u64::MAX, edits in 1usize..4) {
        let grammar = arithmetic();
        let config = GeneratorConfig { seed: Some(seed), ..GeneratorConfig::default() };
        let sample = SampleGenerator::new(&grammar, config)
            .generate_mutated("expr", edits)
            .expect("known rule");
        let _ = parse::<()>(&grammar, "expr", &sample, true);
    }
}
