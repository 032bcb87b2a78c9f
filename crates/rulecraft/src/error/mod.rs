//! # Error Types
//!
//! - [`GrammarError`]: structural problems found while building, validating
//!   or resolving a grammar
//! - [`ParseError`]: everything a parse can end with other than a match
//! - [`ParseFailure`]: the ordinary "input does not match" outcome, carrying
//!   the furthest position reached and what was expected there
//!
//! A failed match is a value, never a panic:
//!
//! ```rust
//! use rulecraft::grammar::{Expr, GrammarBuilder};
//! use rulecraft::parser::parse;
//!
//! let grammar = GrammarBuilder::new("G")
//!     .token("ab", Expr::seq([Expr::literal("a"), Expr::literal("b")]))
//!     .build()
//!     .expect("valid grammar");
//!
//! let err = parse::<()>(&grammar, "ab", "ax", true).expect_err("no match");
//! let failure = err.failure().expect("syntactic failure");
//! assert_eq!(failure.position(), 1);
//! assert_eq!(failure.expected, ["'b'"]);
//! ```
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich error reporting with source code snippets.

pub mod diagnostics;

pub use crate::grammar::GrammarError;

use crate::syntax::{LineCol, LineIndex, Span};
use compact_str::CompactString;
use std::fmt;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Why a parse did not produce a match tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    /// The input does not match the grammar
    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Failed(#[from] ParseFailure),

    /// The grammar is broken, e.g. the start rule does not exist
    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Grammar(#[from] GrammarError),

    #[error("rule nesting exceeded {depth} calls at `{rule}` (offset {position})")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(rulecraft::parse::stack_exhausted),
            help("raise `MatchConfig::max_depth` and `MatchConfig::max_stack`, or flatten the grammar")
        )
    )]
    StackExhausted {
        rule: CompactString,
        position: usize,
        depth: usize,
    },

    #[error("left recursion: `{rule}` re-entered at offset {position} without consuming input")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rulecraft::parse::left_recursion)))]
    LeftRecursion { rule: CompactString, position: usize },
}

impl ParseError {
    /// The syntactic failure, if that is what this error is.
    #[must_use]
    pub const fn failure(&self) -> Option<&ParseFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Input offset the error refers to, when it has one.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Failed(failure) => Some(failure.position()),
            Self::StackExhausted { position, .. } | Self::LeftRecursion { position, .. } => {
                Some(*position)
            }
            Self::Grammar(_) => None,
        }
    }
}

/// Furthest-failure report of a parse that did not match.
///
/// `span` starts at the furthest offset any branch reached and covers the
/// code point found there (empty at end of input). `expected` lists what the
/// branches that got that far were looking for. When the reported failure is
/// a missing closing goal of `open ~ goal inner`, `goal` names it and
/// `expected` holds only the goal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[cfg_attr(feature = "diagnostics", diagnostic(code(rulecraft::parse::failed)))]
pub struct ParseFailure {
    #[cfg_attr(feature = "diagnostics", label("here"))]
    pub span: Span,
    pub expected: Vec<String>,
    /// Innermost rule active when the failure was recorded
    pub rule: Option<CompactString>,
    pub goal: Option<String>,
}

impl ParseFailure {
    #[must_use]
    pub const fn position(&self) -> usize {
        self.span.start()
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    #[must_use]
    pub const fn is_goal(&self) -> bool {
        self.goal.is_some()
    }

    #[must_use]
    pub fn line_col(&self, input: &str) -> LineCol {
        LineIndex::new(input).line_col(self.position())
    }

    /// Message followed by the offending source line with a caret.
    #[must_use]
    pub fn render(&self, input: &str) -> String {
        format!(
            "{self}\n{}",
            diagnostics::caret_snippet(input, self.position())
        )
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.goal, self.expected.as_slice()) {
            (Some(goal), _) => write!(
                f,
                "couldn't find final {goal} at offset {}",
                self.position()
            )?,
            (None, []) => write!(f, "no match at offset {}", self.position())?,
            (None, expected) => write!(
                f,
                "expected {} at offset {}",
                diagnostics::format_expected_list(expected),
                self.position()
            )?,
        }
        if let Some(rule) = &self.rule {
            write!(f, " while matching `{rule}`")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseFailure {}
