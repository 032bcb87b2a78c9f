//! # Matcher
//!
//! Entry points that run a grammar against an input string.
//!
//! ```rust
//! use rulecraft::grammar::{CharClass, Expr, GrammarBuilder};
//! use rulecraft::parser::Matcher;
//!
//! let grammar = GrammarBuilder::new("Words")
//!     .rule("words", Expr::plus(Expr::call("word")))
//!     .token("word", Expr::plus(Expr::class(CharClass::alpha())))
//!     .build()
//!     .expect("valid grammar");
//!
//! let matcher = Matcher::new(&grammar);
//! let tree = matcher.parse::<()>("words", "hello brave new world").expect("matches");
//! assert_eq!(tree.all("word").len(), 4);
//!
//! // An unanchored parse may stop early.
//! let prefix = matcher.parse_prefix::<()>("word", "hello world").expect("matches");
//! assert_eq!(prefix.span().end(), 5);
//! ```

use crate::error::ParseError;
use crate::grammar::Grammar;
use crate::parser::config::MatchConfig;
use crate::parser::engine::Engine;
use crate::syntax::Match;

/// A grammar paired with a [`MatchConfig`], reusable across inputs.
///
/// `Matcher` holds no per-parse state, so one value can be shared between
/// threads and used for any number of parses.
#[derive(Debug, Clone)]
pub struct Matcher<'g> {
    grammar: &'g Grammar,
    config: MatchConfig,
}

impl<'g> Matcher<'g> {
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, MatchConfig::default())
    }

    #[must_use]
    pub const fn with_config(grammar: &'g Grammar, config: MatchConfig) -> Self {
        Self { grammar, config }
    }

    #[must_use]
    pub const fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match `rule` against the whole of `input`.
    ///
    /// # Errors
    ///
    /// See [`Matcher::parse_with`].
    pub fn parse<P>(&self, rule: &str, input: &str) -> Result<Match<P>, ParseError> {
        self.parse_with(rule, input, true)
    }

    /// Match `rule` against a prefix of `input`.
    ///
    /// # Errors
    ///
    /// See [`Matcher::parse_with`].
    pub fn parse_prefix<P>(&self, rule: &str, input: &str) -> Result<Match<P>, ParseError> {
        self.parse_with(rule, input, false)
    }

    /// Match `rule` from offset 0 of `input`.
    ///
    /// When `anchored`, the match must also end at the end of `input`, and
    /// the root node then spans `0..input.len()`.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Failed`] when the input does not match
    /// - [`ParseError::Grammar`] when `rule`, or a rule it calls, is not
    ///   defined anywhere in the grammar chain
    /// - [`ParseError::StackExhausted`] / [`ParseError::LeftRecursion`] when
    ///   a guard in the [`MatchConfig`] trips
    pub fn parse_with<P>(
        &self,
        rule: &str,
        input: &str,
        anchored: bool,
    ) -> Result<Match<P>, ParseError> {
        log::debug!(
            "parsing {} bytes with {}::{rule} (anchored: {anchored})",
            input.len(),
            self.grammar.name()
        );
        let result = Engine::new(self.grammar, &self.config, input).run(rule, anchored);
        match &result {
            Ok(node) => log::debug!("{rule} matched {}", node.span()),
            Err(err) => log::debug!("{rule} did not match: {err}"),
        }
        result
    }
}

/// Parse `input` with the default [`MatchConfig`].
///
/// # Errors
///
/// See [`Matcher::parse_with`].
pub fn parse<P>(
    grammar: &Grammar,
    rule: &str,
    input: &str,
    anchored: bool,
) -> Result<Match<P>, ParseError> {
    Matcher::new(grammar).parse_with(rule, input, anchored)
}

/// Parse `input` with an explicit configuration.
///
/// # Errors
///
/// See [`Matcher::parse_with`].
pub fn parse_with_config<P>(
    grammar: &Grammar,
    rule: &str,
    input: &str,
    anchored: bool,
    config: &MatchConfig,
) -> Result<Match<P>, ParseError> {
    Matcher::with_config(grammar, config.clone()).parse_with(rule, input, anchored)
}
