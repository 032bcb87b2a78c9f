//! # Parallel Batch Matching
//!
//! A [`Grammar`](crate::grammar::Grammar) is immutable once built, so any
//! number of inputs can be matched against it at the same time. With the
//! `parallel` feature, [`parse_batch`] spreads a batch over the `rayon`
//! thread pool; without it the batch is matched sequentially.

use crate::error::ParseError;
use crate::parser::Matcher;
use crate::syntax::Match;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Match `rule` against every input, returning results in input order.
///
/// ```rust
/// use rulecraft::grammar::{CharClass, Expr, GrammarBuilder};
/// use rulecraft::parser::{Matcher, parse_batch};
///
/// let grammar = GrammarBuilder::new("Digits")
///     .token("num", Expr::plus(Expr::class(CharClass::digit())))
///     .build()
///     .expect("valid grammar");
///
/// let results = parse_batch::<(), _>(&Matcher::new(&grammar), "num", &["1", "x", "23"], true);
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// assert_eq!(results[2].as_ref().map(|m| m.span().len()), Ok(2));
/// ```
#[cfg(feature = "parallel")]
pub fn parse_batch<P, S>(
    matcher: &Matcher<'_>,
    rule: &str,
    inputs: &[S],
    anchored: bool,
) -> Vec<Result<Match<P>, ParseError>>
where
    P: Send,
    S: AsRef<str> + Sync,
{
    log::debug!("matching a batch of {} inputs in parallel", inputs.len());
    inputs
        .par_iter()
        .map(|input| matcher.parse_with(rule, input.as_ref(), anchored))
        .collect()
}

/// Match `rule` against every input, returning results in input order.
#[cfg(not(feature = "parallel"))]
pub fn parse_batch<P, S>(
    matcher: &Matcher<'_>,
    rule: &str,
    inputs: &[S],
    anchored: bool,
) -> Vec<Result<Match<P>, ParseError>>
where
    S: AsRef<str>,
{
    log::debug!("matching a batch of {} inputs", inputs.len());
    inputs
        .iter()
        .map(|input| matcher.parse_with(rule, input.as_ref(), anchored))
        .collect()
}
