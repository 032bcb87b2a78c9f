//! # Semantic Actions
//!
//! An [`Actions`] table maps rule names (optionally narrowed to one proto
//! alternative) to callbacks. [`apply`] walks a match tree bottom-up and
//! calls the callback registered for each node, which fills that node's
//! payload from the payloads of its children and the matched text
//! ([`Match::as_str`]).
//!
//! [`Match::as_str`]: crate::syntax::Match::as_str
//!
//! Actions are decoupled from the grammar: one grammar can be reduced with
//! several tables, and a table only needs entries for the nodes it cares
//! about.
//!
//! ## Example
//!
//! ```rust
//! use rulecraft::actions::Actions;
//! use rulecraft::grammar::{CharClass, Expr, GrammarBuilder};
//! use rulecraft::syntax::Match;
//!
//! let grammar = GrammarBuilder::new("Sum")
//!     .rule("sum", Expr::separated(Expr::call("num"), Expr::literal("+"), 1))
//!     .token("num", Expr::plus(Expr::class(CharClass::digit())))
//!     .build()
//!     .expect("valid grammar");
//!
//! let actions = Actions::new()
//!     .on("num", |node: &Match<u64>, slot: &mut Option<u64>| {
//!         *slot = node.as_str().parse().ok();
//!     })
//!     .on("sum", |node: &Match<u64>, slot: &mut Option<u64>| {
//!         *slot = Some(node.all("num").iter().filter_map(Match::payload).sum());
//!     });
//!
//! let total = actions.reduce(&grammar, "sum", "1 + 20 + 300").expect("parses");
//! assert_eq!(total, Some(321));
//! ```

pub mod dispatch;

pub use dispatch::apply;

use crate::error::{GrammarError, ParseError};
use crate::grammar::Grammar;
use crate::parser::Matcher;
use crate::syntax::Match;
use compact_str::CompactString;
use hashbrown::{Equivalent, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Callback invoked for one node.
///
/// The node is read-only (its children's payloads are already set; its text
/// is [`Match::as_str`]) and the second argument is the node's own payload
/// slot.
pub type Action<P> = Box<dyn Fn(&Match<P>, &mut Option<P>) + Send + Sync>;

/// `rule` or `rule:sym<tag>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionKey {
    rule: CompactString,
    alt_tag: Option<CompactString>,
}

impl Hash for ActionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.borrowed().hash(state);
    }
}

/// Borrowed form of [`ActionKey`] used for lookups, hashing the same way.
#[derive(Hash)]
struct KeyRef<'a> {
    rule: &'a str,
    alt_tag: Option<&'a str>,
}

impl Equivalent<ActionKey> for KeyRef<'_> {
    fn equivalent(&self, key: &ActionKey) -> bool {
        self.rule == key.rule.as_str() && self.alt_tag == key.alt_tag.as_deref()
    }
}

impl ActionKey {
    #[must_use]
    pub fn new(rule: impl Into<CompactString>) -> Self {
        Self {
            rule: rule.into(),
            alt_tag: None,
        }
    }

    #[must_use]
    pub fn with_tag(rule: impl Into<CompactString>, tag: impl Into<CompactString>) -> Self {
        Self {
            rule: rule.into(),
            alt_tag: Some(tag.into()),
        }
    }

    /// Parse `value` or `value:sym<number>`.
    ///
    /// ```rust
    /// use rulecraft::actions::ActionKey;
    ///
    /// let key = ActionKey::parse("value:sym<number>").expect("valid key");
    /// assert_eq!(key.rule(), "value");
    /// assert_eq!(key.alt_tag(), Some("number"));
    /// assert!(ActionKey::parse("value:number").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// [`GrammarError::InvalidActionKey`] when the text is not of either form.
    pub fn parse(key: &str) -> Result<Self, GrammarError> {
        let invalid = |reason| GrammarError::InvalidActionKey {
            key: key.into(),
            reason,
        };

        let (rule, tag) = match key.split_once(':') {
            None => (key, None),
            Some((rule, rest)) => {
                let tag = rest
                    .strip_prefix("sym<")
                    .and_then(|t| t.strip_suffix('>'))
                    .ok_or_else(|| invalid("expected `rule:sym<tag>`"))?;
                if tag.is_empty() {
                    return Err(invalid("empty alternative tag"));
                }
                (rule, Some(tag))
            }
        };
        if rule.is_empty() {
            return Err(invalid("empty rule name"));
        }
        if rule.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>')) {
            return Err(invalid("rule name contains whitespace or angle brackets"));
        }

        Ok(Self {
            rule: rule.into(),
            alt_tag: tag.map(Into::into),
        })
    }

    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    #[must_use]
    pub fn alt_tag(&self) -> Option<&str> {
        self.alt_tag.as_deref()
    }

    fn borrowed(&self) -> KeyRef<'_> {
        KeyRef {
            rule: &self.rule,
            alt_tag: self.alt_tag.as_deref(),
        }
    }
}

impl FromStr for ActionKey {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alt_tag {
            Some(tag) => write!(f, "{}:sym<{tag}>", self.rule),
            None => f.write_str(&self.rule),
        }
    }
}

/// Table of semantic actions, keyed by [`ActionKey`].
///
/// A key without a tag matches only nodes without one: an action for
/// `value` does not fire for `value:sym<number>` nodes.
pub struct Actions<P> {
    table: HashMap<ActionKey, Action<P>, ahash::RandomState>,
}

impl<P> Actions<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: HashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    /// Register `action` under `key`, returning the action it replaces.
    pub fn insert<F>(&mut self, key: ActionKey, action: F) -> Option<Action<P>>
    where
        F: Fn(&Match<P>, &mut Option<P>) + Send + Sync + 'static,
    {
        self.table.insert(key, Box::new(action))
    }

    /// Action for nodes produced by the simple rule `rule`.
    #[must_use]
    pub fn on<F>(mut self, rule: impl Into<CompactString>, action: F) -> Self
    where
        F: Fn(&Match<P>, &mut Option<P>) + Send + Sync + 'static,
    {
        self.insert(ActionKey::new(rule), action);
        self
    }

    /// Action for nodes produced by the alternative `group:sym<tag>`.
    #[must_use]
    pub fn on_alt<F>(
        mut self,
        group: impl Into<CompactString>,
        tag: impl Into<CompactString>,
        action: F,
    ) -> Self
    where
        F: Fn(&Match<P>, &mut Option<P>) + Send + Sync + 'static,
    {
        self.insert(ActionKey::with_tag(group, tag), action);
        self
    }

    /// Action registered under a textual key such as `value:sym<number>`.
    ///
    /// # Errors
    ///
    /// [`GrammarError::InvalidActionKey`] when `key` does not parse.
    pub fn on_key<F>(mut self, key: &str, action: F) -> Result<Self, GrammarError>
    where
        F: Fn(&Match<P>, &mut Option<P>) + Send + Sync + 'static,
    {
        self.insert(ActionKey::parse(key)?, action);
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, rule: &str, alt_tag: Option<&str>) -> Option<&Action<P>> {
        self.table.get(&KeyRef { rule, alt_tag })
    }

    #[must_use]
    pub fn contains(&self, key: &ActionKey) -> bool {
        self.table.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ActionKey> {
        self.table.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// See [`apply`].
    pub fn apply(&self, tree: &mut Match<P>) -> usize {
        dispatch::apply(tree, self)
    }

    /// Parse `input` anchored from `rule`, run the actions and return the
    /// root payload.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] from the parse.
    pub fn reduce(&self, grammar: &Grammar, rule: &str, input: &str) -> Result<Option<P>, ParseError> {
        self.reduce_with(&Matcher::new(grammar), rule, input)
    }

    /// [`reduce`](Self::reduce) with a configured [`Matcher`].
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] from the parse.
    pub fn reduce_with(
        &self,
        matcher: &Matcher<'_>,
        rule: &str,
        input: &str,
    ) -> Result<Option<P>, ParseError> {
        let mut tree = matcher.parse(rule, input)?;
        let invoked = self.apply(&mut tree);
        log::debug!("reduced {rule} with {invoked} actions");
        Ok(tree.into_payload())
    }
}

impl<P> Default for Actions<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Actions<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.table.keys().map(ToString::to_string).collect();
        keys.sort_unstable();
        f.debug_struct("Actions").field("keys", &keys).finish()
    }
}
