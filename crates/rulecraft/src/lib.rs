//! # Rulecraft
//!
//! A declarative grammar engine: named, mutually recursive rules over text,
//! grammars that inherit from and extend each other, and semantic actions
//! that turn a match tree into your own data structure.
//!
//! ## Overview
//!
//! - **Rules** are [`Expr`] trees: literals, character classes, sequences,
//!   ordered and longest-match choice, separated repetition, lookahead,
//!   sub-rule calls and goal-directed bracket matching (`'(' ~ ')' X`)
//! - **Proto groups** hold tagged alternatives (`value:sym<number>`) that are
//!   tried at the same position; the longest match wins
//! - **Inheritance**: a derived [`Grammar`] overrides rules, adds proto
//!   alternatives and replaces `ws`, and every inherited rule sees the change
//! - **Match trees** ([`Match`]) record spans, named and positional captures
//!   and a payload slot per node
//! - **Actions** ([`Actions`]) are looked up by rule name and alternative
//!   tag and run bottom-up over the tree
//!
//! ## Quick Start
//!
//! ```rust
//! use rulecraft::{Actions, CharClass, Expr, GrammarBuilder, Match};
//!
//! // rule  pair  { <key> '=' <val> }
//! // token key   { <alpha>+ }
//! // proto token val
//! // token val:sym<num>  { <digit>+ }
//! // token val:sym<bool> { 'yes' | 'no' }
//! let grammar = GrammarBuilder::new("Config")
//!     .rule("pair", Expr::seq([Expr::call("key"), Expr::literal("="), Expr::call("val")]))
//!     .token("key", Expr::plus(Expr::class(CharClass::alpha())))
//!     .proto("val")
//!     .token_alt("val", "num", Expr::plus(Expr::class(CharClass::digit())))
//!     .token_alt("val", "bool", Expr::longest([Expr::literal("yes"), Expr::literal("no")]))
//!     .build()
//!     .expect("valid grammar");
//!
//! let input = "retries = 3";
//! let tree: Match = rulecraft::parse(&grammar, "pair", input, true).expect("matches");
//! assert_eq!(tree.one("key").map(|k| k.text(input)), Some("retries"));
//! assert_eq!(tree.one("val").and_then(Match::alt_tag), Some("num"));
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Setting {
//!     Num(u32),
//!     Flag(bool),
//!     Pair(String, Box<Setting>),
//! }
//!
//! let actions = Actions::new()
//!     .on_alt("val", "num", |m: &Match<Setting>, slot: &mut Option<Setting>| {
//!         *slot = m.as_str().parse().ok().map(Setting::Num);
//!     })
//!     .on_alt("val", "bool", |m: &Match<Setting>, slot: &mut Option<Setting>| {
//!         *slot = Some(Setting::Flag(m.as_str() == "yes"));
//!     })
//!     .on("pair", |m: &Match<Setting>, slot: &mut Option<Setting>| {
//!         let key = m.one("key").map(|k| k.as_str().to_string());
//!         let val = m.one("val").and_then(Match::payload).cloned();
//!         if let (Some(key), Some(val)) = (key, val) {
//!             *slot = Some(Setting::Pair(key, Box::new(val)));
//!         }
//!     });
//!
//! let setting = actions.reduce(&grammar, "pair", input).expect("matches");
//! assert_eq!(setting, Some(Setting::Pair("retries".into(), Box::new(Setting::Num(3)))));
//! ```
//!
//! ## Modules
//!
//! - [`syntax`] - Spans, cursors, line/column lookup and the match tree
//! - [`grammar`] - Rule expressions, grammars, inheritance and validation
//! - [`parser`] - The matcher and its configuration
//! - [`actions`] - Semantic action tables and the dispatcher
//! - [`error`] - Error types and diagnostics
//! - [`testing`] - Sample input generation for property tests and fuzzing

pub mod actions;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod syntax;
pub mod testing;

// Re-export commonly used types
pub use actions::{ActionKey, Actions, apply};
pub use error::{GrammarError, ParseError, ParseFailure};
pub use grammar::{
    CharClass, Expr, Grammar, GrammarBuilder, ProtoGroup, Rule, RuleKind, SimpleRule,
    TrailingSeparator, ValidationOptions,
};
pub use parser::{MatchConfig, Matcher, parse, parse_with_config};
pub use syntax::{Capture, Cursor, Match, Span};
