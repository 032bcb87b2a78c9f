use crate::error::ParseFailure;
use crate::syntax::Span;
use compact_str::CompactString;
use hashbrown::HashSet;

/// Per-parse mutable state.
///
/// Holds the rule activation stack, the failure memo and the furthest-failure
/// tracker. A fresh state is created for every call to the driver, so a
/// shared [`Grammar`](crate::grammar::Grammar) never carries parse state.
#[derive(Debug, Default)]
pub(crate) struct MatchState {
    /// Rules currently being matched, innermost last
    activations: Vec<Activation>,

    /// Rule invocations known to fail: (`rule`, `tag`, `position`)
    failure_memo: HashSet<MemoKey, ahash::RandomState>,

    tracker: FailureTracker,

    /// Non-zero while inside a lookahead or an implicit whitespace match
    quiet: usize,
}

/// One entry of the rule call stack.
#[derive(Debug, Clone)]
pub(crate) struct Activation {
    pub rule: CompactString,
    pub tag: Option<CompactString>,
    pub position: usize,
    pub sigspace: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemoKey {
    rule: CompactString,
    tag: Option<CompactString>,
    position: usize,
}

impl MemoKey {
    fn new(rule: &str, tag: Option<&str>, position: usize) -> Self {
        Self {
            rule: rule.into(),
            tag: tag.map(Into::into),
            position,
        }
    }
}

impl MatchState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Activation stack

    pub fn depth(&self) -> usize {
        self.activations.len()
    }

    pub fn current(&self) -> Option<&Activation> {
        self.activations.last()
    }

    pub fn push(&mut self, activation: Activation) {
        self.activations.push(activation);
    }

    pub fn pop(&mut self) -> Option<Activation> {
        self.activations.pop()
    }

    /// Whether `rule` (with `tag`) is already active at `position`.
    ///
    /// Callees never start before their caller, so only the run of
    /// activations at the top of the stack sharing `position` is examined.
    pub fn is_active_at(&self, rule: &str, tag: Option<&str>, position: usize) -> bool {
        self.activations
            .iter()
            .rev()
            .take_while(|a| a.position == position)
            .any(|a| a.rule == rule && a.tag.as_deref() == tag)
    }

    // Failure memo

    pub fn is_known_failure(&self, rule: &str, tag: Option<&str>, position: usize) -> bool {
        !self.failure_memo.is_empty()
            && self
                .failure_memo
                .contains(&MemoKey::new(rule, tag, position))
    }

    /// Remember that a rule failed at `position`.
    ///
    /// The memo is cleared once it grows past `max_memo_size`.
    pub fn remember_failure(
        &mut self,
        rule: &str,
        tag: Option<&str>,
        position: usize,
        max_memo_size: usize,
    ) {
        if self.failure_memo.len() >= max_memo_size {
            log::trace!(
                "failure memo reached {} entries, clearing",
                self.failure_memo.len()
            );
            self.failure_memo.clear();
        }
        self.failure_memo.insert(MemoKey::new(rule, tag, position));
    }

    // Diagnostics

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn enter_quiet(&mut self) {
        self.quiet += 1;
    }

    pub fn leave_quiet(&mut self) {
        self.quiet = self.quiet.saturating_sub(1);
    }

    /// Record an ordinary failure at `position` inside the innermost rule.
    ///
    /// `describe` is only evaluated when the failure can still be reported.
    pub fn expected(&mut self, position: usize, describe: impl FnOnce() -> String) {
        if self.is_quiet() {
            return;
        }
        let rule = self.activations.last().map(|a| a.rule.clone());
        self.tracker.record(position, rule, describe);
    }

    /// Record a goal failure: `goal` was required at `position` and missing.
    pub fn expected_goal(&mut self, position: usize, goal: String) {
        if self.is_quiet() {
            return;
        }
        let rule = self.activations.last().map(|a| a.rule.clone());
        log::trace!("goal {goal} not found at {position}");
        self.tracker.record_goal(position, rule, goal);
    }

    /// Record `expected` at `position` on behalf of `rule`.
    pub fn expected_in(&mut self, position: usize, rule: &str, expected: &str) {
        self.tracker
            .record(position, Some(rule.into()), || expected.to_string());
    }

    pub fn into_failure(self, input: &str) -> ParseFailure {
        self.tracker.into_failure(input)
    }
}

/// Furthest-failure bookkeeping.
///
/// Only the failures at the maximum offset seen so far are kept. A goal
/// failure replaces ordinary failures at the same offset and is not itself
/// displaced by them.
#[derive(Debug, Default)]
struct FailureTracker {
    furthest: Option<usize>,
    expected: Vec<String>,
    rule: Option<CompactString>,
    goal: Option<String>,
}

impl FailureTracker {
    fn record(
        &mut self,
        position: usize,
        rule: Option<CompactString>,
        describe: impl FnOnce() -> String,
    ) {
        match self.furthest {
            Some(furthest) if position < furthest => {}
            Some(furthest) if position == furthest => {
                if self.goal.is_some() {
                    return;
                }
                let item = describe();
                if !self.expected.contains(&item) {
                    self.expected.push(item);
                }
            }
            _ => {
                self.furthest = Some(position);
                self.expected = vec![describe()];
                self.rule = rule;
                self.goal = None;
            }
        }
    }

    fn record_goal(&mut self, position: usize, rule: Option<CompactString>, goal: String) {
        let replace = match self.furthest {
            None => true,
            Some(furthest) => {
                position > furthest || (position == furthest && self.goal.is_none())
            }
        };
        if replace {
            self.furthest = Some(position);
            self.expected = vec![goal.clone()];
            self.rule = rule;
            self.goal = Some(goal);
        }
    }

    fn into_failure(self, input: &str) -> ParseFailure {
        let position = self.furthest.unwrap_or(0).min(input.len());
        let width = input
            .get(position..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        ParseFailure {
            span: Span::at(position, width),
            expected: self.expected,
            rule: self.rule,
            goal: self.goal,
        }
    }
}
