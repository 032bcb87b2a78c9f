use crate::grammar::{Alternative, Expr, ProtoGroup, Rule, RuleKind, SimpleRule, ValidationOptions};
use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::sync::Arc;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Named set of rules, optionally extending a parent grammar.
///
/// Lookups check this grammar's own table first and then walk up the parent
/// chain, so a derived grammar overrides any rule by redefining it. Proto
/// groups are the exception: their alternatives are merged across the whole
/// chain, root-most first, with descendants replacing same-tag alternatives
/// in place and appending new ones.
///
/// Rule lookups during a parse always start at the grammar handed to the
/// matcher, which is how a parent rule calling `<ws>` picks up a child's
/// override.
///
/// # Example
///
/// ```rust
/// use rulecraft::grammar::{Expr, GrammarBuilder};
///
/// let base = GrammarBuilder::new("Base")
///     .token("greeting", Expr::literal("hello"))
///     .build_shared()
///     .expect("valid grammar");
///
/// let child = GrammarBuilder::derive("Child", &base)
///     .token("greeting", Expr::literal("hi"))
///     .build()
///     .expect("valid grammar");
///
/// assert!(child.contains("greeting"));
/// assert_eq!(child.depth(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Grammar {
    name: CompactString,
    rules: HashMap<CompactString, Rule, ahash::RandomState>,
    /// Own rule names in registration order
    order: Vec<CompactString>,
    parent: Option<Arc<Grammar>>,
}

/// Result of resolving a rule name through the grammar chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'g> {
    Simple(&'g SimpleRule),
    /// Merged alternatives of a proto group, in matching order
    Proto(Vec<Alternative<'g>>),
}

impl Resolved<'_> {
    #[must_use]
    pub const fn is_proto(&self) -> bool {
        matches!(self, Self::Proto(_))
    }

    /// Tags of a proto group's alternatives; empty for a simple rule.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        match self {
            Self::Simple(_) => Vec::new(),
            Self::Proto(alternatives) => alternatives.iter().map(|alt| alt.tag).collect(),
        }
    }
}

/// Where a name is defined, relative to the grammar it was looked up in.
#[derive(Debug, Clone, Copy)]
pub enum RuleOrigin<'g> {
    Own(&'g Rule),
    Inherited { grammar: &'g Grammar, rule: &'g Rule },
    NotFound,
}

impl Grammar {
    #[must_use]
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            rules: HashMap::with_hasher(ahash::RandomState::new()),
            order: Vec::new(),
            parent: None,
        }
    }

    /// Empty grammar extending `parent`.
    #[must_use]
    pub fn derive(name: impl Into<CompactString>, parent: &Arc<Self>) -> Self {
        Self {
            parent: Some(Arc::clone(parent)),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn derive_from(name: impl Into<CompactString>, parent: &Arc<Self>) -> Self {
        Self::derive(name, parent)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Number of ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestry().count() - 1
    }

    /// This grammar followed by its ancestors, nearest first.
    pub fn ancestry(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |grammar| grammar.parent.as_deref())
    }

    /// Define or replace this grammar's own entry for `name`.
    ///
    /// Returns the entry it replaced. Ancestors are never modified.
    pub fn register(&mut self, name: impl Into<CompactString>, rule: impl Into<Rule>) -> Option<Rule> {
        let name = name.into();
        log::trace!("grammar {}: register {}", self.name, name);
        let previous = self.rules.insert(name.clone(), rule.into());
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    /// Add or replace one alternative of this grammar's own proto group
    /// `group`, creating the group when this grammar has none yet.
    ///
    /// # Errors
    ///
    /// [`GrammarError::NotAProtoGroup`] when this grammar defines `group` as a
    /// simple rule.
    pub fn register_alternative(
        &mut self,
        group: impl Into<CompactString>,
        tag: impl Into<CompactString>,
        rule: SimpleRule,
    ) -> Result<bool, GrammarError> {
        let group = group.into();
        match self.rules.get_mut(&group) {
            Some(Rule::Proto(proto)) => Ok(proto.insert(tag, rule)),
            Some(Rule::Simple(_)) => Err(GrammarError::NotAProtoGroup {
                rule: group,
                grammar: self.name.clone(),
            }),
            None => {
                self.register(group, ProtoGroup::new().with(tag, rule));
                Ok(false)
            }
        }
    }

    /// This grammar's own entry, ignoring ancestors.
    #[must_use]
    pub fn own_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Own rule names in registration order.
    pub fn own_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(CompactString::as_str)
    }

    /// Nearest definition of `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> RuleOrigin<'_> {
        if let Some(rule) = self.rules.get(name) {
            return RuleOrigin::Own(rule);
        }
        self.ancestry()
            .skip(1)
            .find_map(|grammar| {
                grammar
                    .rules
                    .get(name)
                    .map(|rule| RuleOrigin::Inherited { grammar, rule })
            })
            .unwrap_or(RuleOrigin::NotFound)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ancestry().any(|grammar| grammar.rules.contains_key(name))
    }

    /// Resolve `name` through the chain.
    ///
    /// A simple rule is taken from the nearest grammar defining `name`. Proto
    /// groups are merged from every consecutive level that defines `name` as
    /// a group; a simple rule further up ends the merge.
    ///
    /// # Errors
    ///
    /// [`GrammarError::UnknownRule`] when no grammar in the chain defines
    /// `name`.
    pub fn resolve(&self, name: &str) -> Result<Resolved<'_>, GrammarError> {
        let mut levels: SmallVec<[&ProtoGroup; 4]> = SmallVec::new();
        for grammar in self.ancestry() {
            match grammar.rules.get(name) {
                Some(Rule::Simple(rule)) if levels.is_empty() => return Ok(Resolved::Simple(rule)),
                Some(Rule::Simple(_)) => break,
                Some(Rule::Proto(group)) => levels.push(group),
                None => {}
            }
        }

        if levels.is_empty() {
            return Err(GrammarError::UnknownRule {
                rule: name.into(),
                grammar: self.name.clone(),
                referenced_from: None,
                suggestion: None,
            });
        }

        let mut merged: Vec<Alternative<'_>> = Vec::new();
        for group in levels.iter().rev() {
            for alt in group.iter() {
                if let Some(slot) = merged.iter_mut().find(|m| m.tag == alt.tag) {
                    *slot = alt;
                } else {
                    merged.push(alt);
                }
            }
        }
        Ok(Resolved::Proto(merged))
    }

    /// Every resolvable name across the chain, root-most definitions first.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let chain: SmallVec<[&Self; 4]> = self.ancestry().collect();
        let mut seen: HashSet<&str, ahash::RandomState> =
            HashSet::with_hasher(ahash::RandomState::new());
        let mut names = Vec::new();
        for grammar in chain.iter().rev() {
            for name in &grammar.order {
                if seen.insert(name.as_str()) {
                    names.push(name.as_str());
                }
            }
        }
        names
    }
}

/// Fluent construction of a [`Grammar`], validated on [`build`](Self::build).
///
/// `rule` declares a rule with significant whitespace, `token` and `regex`
/// declare rules without it.
#[derive(Debug)]
pub struct GrammarBuilder {
    grammar: Grammar,
    validation_options: ValidationOptions,
    error: Option<GrammarError>,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            grammar: Grammar::new(name),
            validation_options: ValidationOptions::default(),
            error: None,
        }
    }

    /// Builder for a grammar extending `parent`.
    #[must_use]
    pub fn derive(name: impl Into<CompactString>, parent: &Arc<Grammar>) -> Self {
        Self {
            grammar: Grammar::derive(name, parent),
            validation_options: ValidationOptions::default(),
            error: None,
        }
    }

    #[must_use]
    pub fn parent(mut self, parent: Arc<Grammar>) -> Self {
        self.grammar.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn validation(mut self, options: ValidationOptions) -> Self {
        self.validation_options = options;
        self
    }

    /// `rule name { ... }`
    #[must_use]
    pub fn rule(self, name: impl Into<CompactString>, expr: Expr) -> Self {
        self.define(name, SimpleRule::rule(expr))
    }

    /// `token name { ... }`
    #[must_use]
    pub fn token(self, name: impl Into<CompactString>, expr: Expr) -> Self {
        self.define(name, SimpleRule::token(expr))
    }

    /// `regex name { ... }`
    #[must_use]
    pub fn regex(self, name: impl Into<CompactString>, expr: Expr) -> Self {
        self.define(name, SimpleRule::regex(expr))
    }

    #[must_use]
    pub fn define(mut self, name: impl Into<CompactString>, rule: impl Into<Rule>) -> Self {
        self.grammar.register(name, rule);
        self
    }

    /// Declare `name` as a proto group of this grammar.
    #[must_use]
    pub fn proto(mut self, name: impl Into<CompactString>) -> Self {
        let name = name.into();
        match self.grammar.rules.get(&name) {
            Some(Rule::Proto(_)) => {}
            _ => {
                self.grammar.register(name, ProtoGroup::new());
            }
        }
        self
    }

    /// `group:sym<tag>`
    ///
    /// Declaring the same tag twice in one builder is an error reported by
    /// [`build`](Self::build); a derived grammar replaces an inherited tag
    /// by declaring it again.
    #[must_use]
    pub fn alternative(
        mut self,
        group: impl Into<CompactString>,
        tag: impl Into<CompactString>,
        rule: SimpleRule,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let group = group.into();
        let tag = tag.into();
        match self.grammar.register_alternative(group.clone(), tag.clone(), rule) {
            Ok(false) => {}
            Ok(true) => self.error = Some(GrammarError::DuplicateAlternative { group, tag }),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// `token group:sym<tag> { ... }`
    #[must_use]
    pub fn token_alt(
        self,
        group: impl Into<CompactString>,
        tag: impl Into<CompactString>,
        expr: Expr,
    ) -> Self {
        self.alternative(group, tag, SimpleRule::token(expr))
    }

    /// `rule group:sym<tag> { ... }`
    #[must_use]
    pub fn rule_alt(
        self,
        group: impl Into<CompactString>,
        tag: impl Into<CompactString>,
        expr: Expr,
    ) -> Self {
        self.alternative(group, tag, SimpleRule::new(RuleKind::Rule, expr))
    }

    /// Build and validate the grammar.
    ///
    /// # Errors
    ///
    /// Returns the first declaration error, or a validation error such as an
    /// undefined rule reference, an empty proto group or left recursion.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.grammar.validate(&self.validation_options)?;
        log::debug!(
            "built grammar {} ({} own rules, depth {})",
            self.grammar.name,
            self.grammar.order.len(),
            self.grammar.depth()
        );
        Ok(self.grammar)
    }

    /// [`build`](Self::build) into an `Arc`, ready to be derived from.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_shared(self) -> Result<Arc<Grammar>, GrammarError> {
        self.build().map(Arc::new)
    }
}

#[allow(clippy::ref_option)]
fn unknown_rule_context(
    referenced_from: &Option<CompactString>,
    suggestion: &Option<CompactString>,
) -> String {
    let mut out = String::new();
    if let Some(from) = referenced_from {
        out.push_str(" (called from `");
        out.push_str(from);
        out.push_str("`)");
    }
    if let Some(suggestion) = suggestion {
        out.push_str("; did you mean `");
        out.push_str(suggestion);
        out.push_str("`?");
    }
    out
}

fn format_cycles(cycles: &[Vec<CompactString>]) -> String {
    cycles
        .iter()
        .map(|cycle| {
            let mut path: Vec<&str> = cycle.iter().map(CompactString::as_str).collect();
            if let Some(first) = path.first().copied() {
                path.push(first);
            }
            path.join(" -> ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structural problems with a grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error(
        "unknown rule `{rule}` in grammar `{grammar}`{}",
        unknown_rule_context(.referenced_from, .suggestion)
    )]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rulecraft::grammar::unknown_rule)))]
    UnknownRule {
        rule: CompactString,
        grammar: CompactString,
        /// Rule whose body contains the reference, when found by validation
        referenced_from: Option<CompactString>,
        suggestion: Option<CompactString>,
    },

    #[error("proto group `{group}` in grammar `{grammar}` has no alternatives")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rulecraft::grammar::empty_proto)))]
    EmptyProtoGroup {
        group: CompactString,
        grammar: CompactString,
    },

    #[error("`{rule}` is a simple rule in grammar `{grammar}`, not a proto group")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rulecraft::grammar::not_a_proto)))]
    NotAProtoGroup {
        rule: CompactString,
        grammar: CompactString,
    },

    #[error("alternative `{group}:sym<{tag}>` declared twice")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(code(rulecraft::grammar::duplicate_alternative))
    )]
    DuplicateAlternative {
        group: CompactString,
        tag: CompactString,
    },

    #[error("left recursion: {}", format_cycles(.0))]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(rulecraft::grammar::left_recursion),
            help("make every rule on the cycle consume input before calling the next")
        )
    )]
    LeftRecursion(Vec<Vec<CompactString>>),

    #[error("invalid action key `{key}`: {reason}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(rulecraft::actions::invalid_key)))]
    InvalidActionKey {
        key: CompactString,
        reason: &'static str,
    },
}
