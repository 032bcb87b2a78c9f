use crate::grammar::Expr;
use compact_str::CompactString;

/// Declarator of a rule; decides the default whitespace handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuleKind {
    /// No implicit whitespace
    #[default]
    Token,
    /// Implicit `<.ws>` between sequence atoms
    Rule,
    /// Raw lexical atom, no implicit whitespace
    Regex,
}

impl RuleKind {
    #[must_use]
    pub const fn default_sigspace(self) -> bool {
        matches!(self, Self::Rule)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Rule => "rule",
            Self::Regex => "regex",
        }
    }
}

/// A rule with a single body.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleRule {
    pub expr: Expr,
    pub kind: RuleKind,
    /// Significant whitespace: match `ws` between sequence atoms
    pub sigspace: bool,
}

impl SimpleRule {
    #[must_use]
    pub const fn new(kind: RuleKind, expr: Expr) -> Self {
        Self {
            expr,
            kind,
            sigspace: kind.default_sigspace(),
        }
    }

    #[must_use]
    pub const fn token(expr: Expr) -> Self {
        Self::new(RuleKind::Token, expr)
    }

    #[must_use]
    pub const fn rule(expr: Expr) -> Self {
        Self::new(RuleKind::Rule, expr)
    }

    #[must_use]
    pub const fn regex(expr: Expr) -> Self {
        Self::new(RuleKind::Regex, expr)
    }

    /// Override the whitespace flag derived from the kind.
    #[must_use]
    pub fn with_sigspace(mut self, sigspace: bool) -> Self {
        self.sigspace = sigspace;
        self
    }
}

/// One tagged alternative of a proto group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alternative<'g> {
    pub tag: &'g str,
    pub rule: &'g SimpleRule,
}

/// Alternatives declared for a proto group at one grammar level.
///
/// All alternatives are tried against the same position; the longest match
/// wins and ties go to the alternative declared first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtoGroup {
    alternatives: Vec<(CompactString, SimpleRule)>,
}

impl ProtoGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alternative; an existing alternative with the same tag is
    /// replaced in place and keeps its position.
    ///
    /// Returns `true` when a same-tag alternative was replaced.
    pub fn insert(&mut self, tag: impl Into<CompactString>, rule: SimpleRule) -> bool {
        let tag = tag.into();
        if let Some(slot) = self.alternatives.iter_mut().find(|(t, _)| *t == tag) {
            slot.1 = rule;
            true
        } else {
            self.alternatives.push((tag, rule));
            false
        }
    }

    #[must_use]
    pub fn with(mut self, tag: impl Into<CompactString>, rule: SimpleRule) -> Self {
        self.insert(tag, rule);
        self
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&SimpleRule> {
        self.alternatives
            .iter()
            .find_map(|(t, rule)| (t == tag).then_some(rule))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Alternative<'_>> {
        self.alternatives
            .iter()
            .map(|(tag, rule)| Alternative {
                tag: tag.as_str(),
                rule,
            })
    }
}

/// A grammar table entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Simple(SimpleRule),
    Proto(ProtoGroup),
}

impl Rule {
    #[must_use]
    pub const fn is_proto(&self) -> bool {
        matches!(self, Self::Proto(_))
    }

    /// Every body in this entry, with its tag when it is a proto alternative.
    pub fn bodies(&self) -> Vec<(Option<&str>, &SimpleRule)> {
        match self {
            Self::Simple(rule) => vec![(None, rule)],
            Self::Proto(group) => group.iter().map(|alt| (Some(alt.tag), alt.rule)).collect(),
        }
    }
}

impl From<SimpleRule> for Rule {
    fn from(rule: SimpleRule) -> Self {
        Self::Simple(rule)
    }
}

impl From<ProtoGroup> for Rule {
    fn from(group: ProtoGroup) -> Self {
        Self::Proto(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigspace_defaults_from_kind() {
        assert!(SimpleRule::rule(Expr::Empty).sigspace);
        assert!(!SimpleRule::token(Expr::Empty).sigspace);
        assert!(!SimpleRule::regex(Expr::Empty).sigspace);
        assert!(SimpleRule::token(Expr::Empty).with_sigspace(true).sigspace);
    }

    #[test]
    fn test_proto_insert_replaces_in_place() {
        let mut group = ProtoGroup::new()
            .with("a", SimpleRule::token(Expr::literal("a")))
            .with("b", SimpleRule::token(Expr::literal("b")));

        assert!(group.insert("a", SimpleRule::token(Expr::literal("A"))));
        assert!(!group.insert("c", SimpleRule::token(Expr::literal("c"))));

        let tags: Vec<_> = group.iter().map(|alt| alt.tag).collect();
        assert_eq!(tags, ["a", "b", "c"]);
        assert_eq!(
            group.get("a").map(|r| &r.expr),
            Some(&Expr::literal("A"))
        );
    }
}
