//! # Parser Module
//!
//! Runs a [`Grammar`](crate::grammar::Grammar) against input text.
//!
//! Matching is recursive descent with backtracking over an immutable
//! [`Cursor`](crate::syntax::Cursor). Each combinator either succeeds with a
//! new cursor and the captures it made, or fails without consuming input.
//! The furthest offset any branch reached is tracked for error reporting.
//!
//! - [`Matcher`] / [`parse`]: the entry points
//! - [`MatchConfig`]: recursion guards and failure memoization
//! - [`parse_batch`]: many inputs against one grammar

pub mod config;
pub mod driver;
pub(crate) mod engine;
pub mod parallel;
pub(crate) mod state;

pub use config::MatchConfig;
pub use driver::{Matcher, parse, parse_with_config};
pub use engine::WS_RULE;
pub use parallel::parse_batch;
