//! # Grammars
//!
//! A [`Grammar`] is a named table of rules with an optional parent. Rule
//! bodies are [`Expr`] trees; a table entry is either a [`SimpleRule`] or a
//! [`ProtoGroup`] of tagged alternatives that compete on longest match.
//!
//! ## Declarators
//!
//! | Declarator | Builder method | Implicit whitespace |
//! |------------|----------------|---------------------|
//! | `rule`     | [`GrammarBuilder::rule`]  | yes |
//! | `token`    | [`GrammarBuilder::token`] | no  |
//! | `regex`    | [`GrammarBuilder::regex`] | no  |
//!
//! A rule with implicit whitespace matches the grammar's `ws` rule between
//! sequence atoms. When no grammar in the chain defines `ws`, any run of
//! Unicode white space is skipped.
//!
//! ## Example
//!
//! ```rust
//! use rulecraft::grammar::{CharClass, Expr, GrammarBuilder};
//!
//! let grammar = GrammarBuilder::new("Digits")
//!     .rule("list", Expr::separated(Expr::call("num"), Expr::literal(","), 1))
//!     .token("num", Expr::plus(Expr::class(CharClass::digit())))
//!     .build()
//!     .expect("valid grammar");
//!
//! assert_eq!(grammar.names(), ["list", "num"]);
//! ```

pub mod builder;
pub mod char_class;
pub mod expr;
pub mod rule;
pub mod validate;

pub use builder::{Grammar, GrammarBuilder, GrammarError, Resolved, RuleOrigin};
pub use char_class::{CharClass, ClassItem};
pub use expr::{CallCapture, Expr, TrailingSeparator};
pub use rule::{Alternative, ProtoGroup, Rule, RuleKind, SimpleRule};
pub use validate::{CallEdge, CallGraph, ValidationOptions};
