use crate::syntax::Span;
use compact_str::CompactString;
use smallvec::SmallVec;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Node of the match tree produced by a successful parse.
///
/// A node records the span it covers, the rule that produced it (anonymous
/// sub-captures have none), the winning proto alternative, its named and
/// positional captures, and a payload slot that the action dispatcher fills.
///
/// Named captures keep their first-insertion order. Capturing a second node
/// under an existing name turns the capture into a [`Capture::List`].
///
/// Nodes built by the matcher share the input they were matched against, so
/// [`Match::as_str`] returns the matched text without the caller keeping the
/// input around.
#[derive(Clone, PartialEq)]
pub struct Match<P = ()> {
    span: Span,
    rule: Option<CompactString>,
    alt_tag: Option<CompactString>,
    named: Vec<(CompactString, Capture<P>)>,
    positional: Vec<Match<P>>,
    payload: Option<P>,
    source: Option<Arc<str>>,
    /// Position among the parent's children, in capture order
    ordinal: u32,
    next_ordinal: u32,
}

/// One or more nodes captured under the same name.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture<P = ()> {
    Single(Match<P>),
    List(Vec<Match<P>>),
}

impl<P> Capture<P> {
    /// First node under this name
    #[must_use]
    pub fn first(&self) -> Option<&Match<P>> {
        self.as_slice().first()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Match<P>] {
        match self {
            Self::Single(m) => std::slice::from_ref(m),
            Self::List(list) => list,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [Match<P>] {
        match self {
            Self::Single(m) => std::slice::from_mut(m),
            Self::List(list) => list,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match<P>> {
        self.as_slice().iter()
    }

    /// Append a node, promoting a single capture to a list.
    pub fn push(&mut self, node: Match<P>) {
        match self {
            Self::List(list) => list.push(node),
            Self::Single(_) => {
                let promoted = Self::List(Vec::with_capacity(2));
                if let Self::Single(first) = std::mem::replace(self, promoted)
                    && let Self::List(list) = self
                {
                    list.push(first);
                    list.push(node);
                }
            }
        }
    }
}

impl<'a, P> IntoIterator for &'a Capture<P> {
    type Item = &'a Match<P>;
    type IntoIter = std::slice::Iter<'a, Match<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<P> Match<P> {
    /// Leaf node covering `span`.
    #[must_use]
    pub const fn new(span: Span) -> Self {
        Self {
            span,
            rule: None,
            alt_tag: None,
            named: Vec::new(),
            positional: Vec::new(),
            payload: None,
            source: None,
            ordinal: 0,
            next_ordinal: 0,
        }
    }

    /// Attach the input this node was matched against.
    #[must_use]
    pub fn with_source(mut self, source: Arc<str>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<CompactString>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    #[must_use]
    pub fn with_alt_tag(mut self, tag: impl Into<CompactString>) -> Self {
        self.alt_tag = Some(tag.into());
        self
    }

    /// Builder form of [`Match::push_named`].
    #[must_use]
    pub fn with_named(mut self, name: impl Into<CompactString>, node: Self) -> Self {
        self.push_named(name, node);
        self
    }

    /// Builder form of [`Match::push_positional`].
    #[must_use]
    pub fn with_positional(mut self, node: Self) -> Self {
        self.push_positional(node);
        self
    }

    /// Capture `node` under `name`.
    pub fn push_named(&mut self, name: impl Into<CompactString>, mut node: Self) {
        node.ordinal = self.take_ordinal();
        let name = name.into();
        if let Some((_, capture)) = self.named.iter_mut().find(|(n, _)| *n == name) {
            capture.push(node);
        } else {
            self.named.push((name, Capture::Single(node)));
        }
    }

    pub fn push_positional(&mut self, mut node: Self) {
        node.ordinal = self.take_ordinal();
        self.positional.push(node);
    }

    fn take_ordinal(&mut self) -> u32 {
        let ordinal = self.next_ordinal;
        self.next_ordinal = self.next_ordinal.saturating_add(1);
        ordinal
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Name of the rule that produced this node.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Tag of the proto alternative that won, if this node came from a group.
    #[must_use]
    pub fn alt_tag(&self) -> Option<&str> {
        self.alt_tag.as_deref()
    }

    /// Matched text, sliced out of `input`.
    #[must_use]
    pub fn text<'i>(&self, input: &'i str) -> &'i str {
        self.span.slice(input)
    }

    /// Matched text, taken from the attached input; empty when the node has
    /// none.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.source.as_deref().map_or("", |source| self.span.slice(source))
    }

    /// The whole input this node was matched against.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Capture<P>> {
        self.named
            .iter()
            .find_map(|(n, capture)| (n == name).then_some(capture))
    }

    /// First node captured under `name`.
    #[must_use]
    pub fn one(&self, name: &str) -> Option<&Self> {
        self.get(name).and_then(Capture::first)
    }

    /// Every node captured under `name`; empty when there is none.
    #[must_use]
    pub fn all(&self, name: &str) -> &[Self] {
        self.get(name).map_or(&[], Capture::as_slice)
    }

    /// Named captures in first-insertion order.
    pub fn named(&self) -> impl Iterator<Item = (&str, &Capture<P>)> {
        self.named.iter().map(|(n, c)| (n.as_str(), c))
    }

    #[must_use]
    pub fn positional(&self) -> &[Self] {
        &self.positional
    }

    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&Self> {
        self.positional.get(index)
    }

    #[must_use]
    pub fn has_captures(&self) -> bool {
        !self.named.is_empty() || !self.positional.is_empty()
    }

    /// Direct children, named and positional, left to right.
    ///
    /// Siblings are ordered by where they start; siblings starting at the
    /// same offset (zero-width captures) keep the order they were captured
    /// in.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.labelled_children().into_iter().map(|(_, node)| node)
    }

    /// Mutable children, in the same order as [`Match::children`].
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Self> {
        let mut nodes: SmallVec<[&mut Self; 8]> = self
            .named
            .iter_mut()
            .flat_map(|(_, c)| c.as_mut_slice().iter_mut())
            .chain(self.positional.iter_mut())
            .collect();
        nodes.sort_by_key(|node| node.order_key());
        nodes.into_iter()
    }

    fn labelled_children(&self) -> SmallVec<[(Option<&str>, &Self); 8]> {
        let mut nodes: SmallVec<[(Option<&str>, &Self); 8]> = self
            .named
            .iter()
            .flat_map(|(name, c)| c.iter().map(move |node| (Some(name.as_str()), node)))
            .chain(self.positional.iter().map(|node| (None, node)))
            .collect();
        nodes.sort_by_key(|(_, node)| node.order_key());
        nodes
    }

    const fn order_key(&self) -> (usize, u32) {
        (self.span.start(), self.ordinal)
    }

    #[must_use]
    pub const fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn set_payload(&mut self, payload: P) {
        self.payload = Some(payload);
    }

    pub fn take_payload(&mut self) -> Option<P> {
        self.payload.take()
    }

    #[must_use]
    pub fn into_payload(self) -> Option<P> {
        self.payload
    }

    pub(crate) fn payload_slot(&mut self) -> &mut Option<P> {
        &mut self.payload
    }

    /// Indented outline of the tree, one node per line.
    ///
    /// ```text
    /// object 0..7 "{\"a\":1}"
    ///   pairlist 1..6 "\"a\":1"
    /// ```
    #[must_use]
    pub fn dump(&self, input: &str) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, None, input, 0);
        out
    }

    fn dump_into(&self, out: &mut String, label: Option<&str>, input: &str, depth: usize) {
        let _ = write!(out, "{:indent$}", "", indent = depth * 2);
        match (label, self.rule.as_deref()) {
            (Some(label), Some(rule)) if label != rule => {
                let _ = write!(out, "{label}={rule}");
            }
            (Some(label), _) => out.push_str(label),
            (None, Some(rule)) => out.push_str(rule),
            (None, None) => out.push('_'),
        }
        if let Some(tag) = &self.alt_tag {
            let _ = write!(out, ":sym<{tag}>");
        }
        let _ = writeln!(out, " {} {:?}", self.span, self.text(input));

        for (label, node) in self.labelled_children() {
            node.dump_into(out, label, input, depth + 1);
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Match<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("span", &self.span)
            .field("rule", &self.rule)
            .field("alt_tag", &self.alt_tag)
            .field("named", &self.named)
            .field("positional", &self.positional)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}
