use crate::error::ParseError;
use crate::grammar::{
    Alternative, CallCapture, Expr, Grammar, Resolved, SimpleRule, TrailingSeparator,
};
use crate::parser::config::MatchConfig;
use crate::parser::state::{Activation, MatchState};
use crate::syntax::{Cursor, Match, Span};
use compact_str::CompactString;
use hashbrown::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

/// Name of the rule matched between atoms of a rule with implicit whitespace.
pub const WS_RULE: &str = "ws";

/// Error unwinding a parse. Boxed so the results threaded through every
/// recursive call stay pointer-sized.
type Abort = Box<ParseError>;

/// Result of evaluating one expression: the cursor after the match, or
/// `None` when the expression does not match at the given cursor.
type Step<'i> = Result<Option<Cursor<'i>>, Abort>;

/// Result of invoking one rule.
type NodeStep<P> = Result<Option<Match<P>>, Abort>;

fn abort(err: impl Into<ParseError>) -> Abort {
    Box::new(err.into())
}

/// Address of a local in a fresh frame, used to measure stack growth.
#[inline(never)]
fn stack_marker() -> usize {
    let marker = 0u8;
    std::hint::black_box(&raw const marker).addr()
}

/// A rule name resolved through the grammar chain, cached for the rest of
/// the parse.
#[derive(Debug, Clone)]
enum Target<'g> {
    Simple(&'g SimpleRule),
    Proto(Rc<[Alternative<'g>]>),
}

impl<'g> From<Resolved<'g>> for Target<'g> {
    fn from(resolved: Resolved<'g>) -> Self {
        match resolved {
            Resolved::Simple(rule) => Self::Simple(rule),
            Resolved::Proto(alternatives) => Self::Proto(alternatives.into()),
        }
    }
}

/// Where a captured node goes when its enclosing node is closed.
#[derive(Debug)]
enum Slot {
    Named(CompactString),
    Positional,
}

/// Captures recorded while the body of one node is being matched.
///
/// Captures are appended in closing order; a failing branch truncates back
/// to the length it saw on entry, so a combinator that fails leaves the
/// frame exactly as it found it.
#[derive(Debug)]
struct Frame<P> {
    log: Vec<(Slot, Match<P>)>,
}

impl<P> Frame<P> {
    const fn new() -> Self {
        Self { log: Vec::new() }
    }

    fn mark(&self) -> usize {
        self.log.len()
    }

    fn rollback(&mut self, mark: usize) {
        self.log.truncate(mark);
    }

    fn push_named(&mut self, name: CompactString, node: Match<P>) {
        self.log.push((Slot::Named(name), node));
    }

    fn push_positional(&mut self, node: Match<P>) {
        self.log.push((Slot::Positional, node));
    }

    fn append(&mut self, other: Self) {
        self.log.extend(other.log);
    }

    /// Keep only the named captures of `other`.
    fn append_named(&mut self, other: Self) {
        self.log.extend(
            other
                .log
                .into_iter()
                .filter(|(slot, _)| matches!(slot, Slot::Named(_))),
        );
    }

    fn close(self, mut node: Match<P>) -> Match<P> {
        for (slot, child) in self.log {
            match slot {
                Slot::Named(name) => node.push_named(name, child),
                Slot::Positional => node.push_positional(child),
            }
        }
        node
    }
}

/// Combinator evaluator for one parse of one input.
///
/// Rule lookups always start at the grammar the parse was started with, so
/// an inherited rule calling `<ws>` sees an override in a derived grammar.
pub(crate) struct Engine<'g, 'i, P> {
    grammar: &'g Grammar,
    config: &'g MatchConfig,
    input: &'i str,
    /// Shared copy of the input attached to every node
    source: Arc<str>,
    state: MatchState,
    /// Rule names resolved so far
    resolved: HashMap<&'g str, Target<'g>, ahash::RandomState>,
    /// Whether any grammar in the chain defines [`WS_RULE`]
    has_ws_rule: bool,
    /// Stack address at the start of the parse
    stack_base: usize,
    _payload: PhantomData<fn() -> P>,
}

impl<'g, 'i, P> Engine<'g, 'i, P> {
    pub fn new(grammar: &'g Grammar, config: &'g MatchConfig, input: &'i str) -> Self {
        Self {
            grammar,
            config,
            input,
            source: Arc::from(input),
            state: MatchState::new(),
            resolved: HashMap::with_hasher(ahash::RandomState::new()),
            has_ws_rule: grammar.contains(WS_RULE),
            stack_base: stack_marker(),
            _payload: PhantomData,
        }
    }

    /// Match `rule` from offset 0.
    ///
    /// With `anchored`, a match that stops short of the end of the input is
    /// a failure reporting "end of input" at the offset it stopped at,
    /// unless some branch got further.
    pub fn run(mut self, rule: &str, anchored: bool) -> Result<Match<P>, ParseError> {
        self.stack_base = stack_marker();
        let start = Cursor::new(self.input);
        let grammar = self.grammar;
        let result = match grammar.resolve(rule)? {
            Resolved::Simple(simple) => self.invoke(rule, None, simple, start),
            Resolved::Proto(alternatives) => self.dispatch_proto(rule, &alternatives, start),
        };
        match result.map_err(|err| *err)? {
            Some(node) if !anchored || node.span().end() == self.input.len() => Ok(node),
            Some(node) => {
                self.state
                    .expected_in(node.span().end(), rule, "end of input");
                Err(self.state.into_failure(self.input).into())
            }
            None => Err(self.state.into_failure(self.input).into()),
        }
    }

    // Rule invocation

    /// Resolve `name`, reusing an earlier resolution from this parse.
    fn target(&mut self, name: &'g str) -> Result<Target<'g>, Abort> {
        if let Some(target) = self.resolved.get(name) {
            return Ok(target.clone());
        }
        let target = Target::from(self.grammar.resolve(name).map_err(abort)?);
        self.resolved.insert(name, target.clone());
        Ok(target)
    }

    /// Resolve `name` and match it at `cur`, producing the rule's node.
    fn call_rule(&mut self, name: &'g str, cur: Cursor<'i>) -> NodeStep<P> {
        match self.target(name)? {
            Target::Simple(rule) => self.invoke(name, None, rule, cur),
            Target::Proto(alternatives) => self.dispatch_proto(name, &alternatives, cur),
        }
    }

    /// Try every alternative of a proto group at `cur`; the longest match
    /// wins and ties go to the alternative that comes first.
    #[inline(never)]
    fn dispatch_proto(
        &mut self,
        name: &str,
        alternatives: &[Alternative<'g>],
        cur: Cursor<'i>,
    ) -> NodeStep<P> {
        let mut best: Option<Match<P>> = None;
        for alt in alternatives {
            if let Some(node) = self.invoke(name, Some(alt.tag), alt.rule, cur)?
                && best
                    .as_ref()
                    .is_none_or(|b| node.span().end() > b.span().end())
            {
                best = Some(node);
            }
        }
        if let Some(node) = &best {
            log::trace!(
                "{name}:sym<{}> wins at {} among {} alternatives",
                node.alt_tag().unwrap_or_default(),
                cur.position(),
                alternatives.len(),
            );
        }
        Ok(best)
    }

    #[inline(never)]
    fn invoke(
        &mut self,
        name: &str,
        tag: Option<&str>,
        rule: &'g SimpleRule,
        cur: Cursor<'i>,
    ) -> NodeStep<P> {
        let position = cur.position();
        let depth = self.state.depth();
        if depth >= self.config.max_depth
            || self.stack_base.abs_diff(stack_marker()) > self.config.max_stack
        {
            log::debug!("{name} at {position}: nesting limit reached at depth {depth}");
            return Err(abort(ParseError::StackExhausted {
                rule: name.into(),
                position,
                depth,
            }));
        }
        if self.config.detect_left_recursion && self.state.is_active_at(name, tag, position) {
            return Err(abort(ParseError::LeftRecursion {
                rule: name.into(),
                position,
            }));
        }
        if self.config.memoize_failures && self.state.is_known_failure(name, tag, position) {
            return Ok(None);
        }

        log::trace!("enter {name} at {position}");
        self.state.push(Activation {
            rule: name.into(),
            tag: tag.map(Into::into),
            position,
            sigspace: rule.sigspace,
        });
        let mut frame = Frame::new();
        let result = self.match_expr(&rule.expr, cur, &mut frame);
        self.state.pop();

        if let Some(end) = result? {
            return Ok(Some(self.rule_node(name, tag, end.span_from(&cur), frame)));
        }
        if self.config.memoize_failures && !self.state.is_quiet() {
            self.state
                .remember_failure(name, tag, position, self.config.max_memo_size);
        }
        Ok(None)
    }

    fn node(&self, span: Span) -> Match<P> {
        Match::new(span).with_source(Arc::clone(&self.source))
    }

    #[inline(never)]
    fn rule_node(&self, name: &str, tag: Option<&str>, span: Span, frame: Frame<P>) -> Match<P> {
        let mut node = self.node(span).with_rule(name);
        if let Some(tag) = tag {
            node = node.with_alt_tag(tag);
        }
        frame.close(node)
    }

    // Implicit whitespace

    fn sigspace(&self) -> bool {
        self.state.current().is_some_and(|a| a.sigspace)
    }

    /// Skip implicit whitespace at `cur`; never fails.
    fn skip_ws(&mut self, cur: Cursor<'i>) -> Result<Cursor<'i>, Abort> {
        if self.state.current().is_some_and(|a| a.rule == WS_RULE)
            || self.state.is_active_at(WS_RULE, None, cur.position())
        {
            return Ok(cur);
        }
        if !self.has_ws_rule {
            let mut pos = cur;
            while let Some((ch, next)) = pos.advance_char() {
                if !ch.is_whitespace() {
                    break;
                }
                pos = next;
            }
            return Ok(pos);
        }

        self.state.enter_quiet();
        let result = self.call_rule(WS_RULE, cur);
        self.state.leave_quiet();
        Ok(result?.map_or(cur, |node| cur.at(node.span().end())))
    }

    fn skip_ws_if(&mut self, sigspace: bool, cur: Cursor<'i>) -> Result<Cursor<'i>, Abort> {
        if sigspace { self.skip_ws(cur) } else { Ok(cur) }
    }

    // Combinators
    //
    // `match_expr` only dispatches: every combinator that recurses lives in
    // its own function so the frame repeated per nesting level stays small.

    fn match_expr(&mut self, expr: &'g Expr, cur: Cursor<'i>, frame: &mut Frame<P>) -> Step<'i> {
        match expr {
            Expr::Literal(text) => {
                if cur.starts_with(text) {
                    Ok(Some(cur.advance_by(text.len())))
                } else {
                    self.state.expected(cur.position(), || expr.to_string());
                    Ok(None)
                }
            }
            Expr::Class(class) => match cur.advance_char() {
                Some((ch, next)) if class.matches(ch) => Ok(Some(next)),
                _ => {
                    self.state.expected(cur.position(), || class.to_string());
                    Ok(None)
                }
            },
            Expr::Any => match cur.advance_char() {
                Some((_, next)) => Ok(Some(next)),
                None => {
                    self.state
                        .expected(cur.position(), || "any character".to_string());
                    Ok(None)
                }
            },
            Expr::StartOfInput => {
                if cur.is_at_start() {
                    Ok(Some(cur))
                } else {
                    self.state
                        .expected(cur.position(), || "start of input".to_string());
                    Ok(None)
                }
            }
            Expr::EndOfInput => {
                if cur.is_at_end() {
                    Ok(Some(cur))
                } else {
                    self.state
                        .expected(cur.position(), || "end of input".to_string());
                    Ok(None)
                }
            }
            Expr::Empty => Ok(Some(cur)),
            Expr::Sym => self.match_sym(cur),
            Expr::Seq(exprs) => self.match_seq(exprs, cur, frame),
            Expr::Choice(exprs) => self.match_choice(exprs, cur, frame),
            Expr::Longest(exprs) => self.match_longest(exprs, cur, frame),
            Expr::Repeat {
                expr,
                min,
                max,
                separator,
                trailing,
            } => self.match_repeat(
                expr,
                (*min, *max),
                separator.as_deref(),
                *trailing,
                cur,
                frame,
            ),
            Expr::Lookahead(inner) => Ok(self.peek(inner, cur)?.then_some(cur)),
            Expr::NotLookahead(inner) => Ok((!self.peek(inner, cur)?).then_some(cur)),
            Expr::Call { rule, capture } => self.match_call(rule, capture, cur, frame),
            Expr::Named { name, expr } => self.match_wrapped(Some(name), expr, cur, frame),
            Expr::Group(expr) => self.match_wrapped(None, expr, cur, frame),
            Expr::Goal { open, goal, inner } => self.match_goal(open, goal, inner, cur, frame),
        }
    }

    #[inline(never)]
    fn match_choice(
        &mut self,
        exprs: &'g [Expr],
        cur: Cursor<'i>,
        frame: &mut Frame<P>,
    ) -> Step<'i> {
        for alt in exprs {
            if let Some(next) = self.match_expr(alt, cur, frame)? {
                return Ok(Some(next));
            }
        }
        Ok(None)
    }

    #[inline(never)]
    fn match_call(
        &mut self,
        rule: &'g CompactString,
        capture: &'g CallCapture,
        cur: Cursor<'i>,
        frame: &mut Frame<P>,
    ) -> Step<'i> {
        let Some(node) = self.call_rule(rule, cur)? else {
            return Ok(None);
        };
        let end = cur.at(node.span().end());
        match capture {
            CallCapture::Named => frame.push_named(rule.clone(), node),
            CallCapture::Alias(alias) => frame.push_named(alias.clone(), node),
            CallCapture::Silent => {}
        }
        Ok(Some(end))
    }

    /// `$<name>=( ... )` with a name, `( ... )` without one.
    #[inline(never)]
    fn match_wrapped(
        &mut self,
        name: Option<&'g CompactString>,
        expr: &'g Expr,
        cur: Cursor<'i>,
        frame: &mut Frame<P>,
    ) -> Step<'i> {
        let mut inner = Frame::new();
        let Some(end) = self.match_expr(expr, cur, &mut inner)? else {
            return Ok(None);
        };
        let node = inner.close(self.node(end.span_from(&cur)));
        match name {
            Some(name) => frame.push_named(name.clone(), node),
            None => frame.push_positional(node),
        }
        Ok(Some(end))
    }

    /// `<sym>`: the tag of the innermost proto alternative, as a literal.
    fn match_sym(&mut self, cur: Cursor<'i>) -> Step<'i> {
        let Some(tag) = self.state.current().and_then(|a| a.tag.clone()) else {
            self.state.expected(cur.position(), || "<sym>".to_string());
            return Ok(None);
        };
        if cur.starts_with(&tag) {
            Ok(Some(cur.advance_by(tag.len())))
        } else {
            self.state.expected(cur.position(), || format!("'{tag}'"));
            Ok(None)
        }
    }

    #[inline(never)]
    fn match_seq(&mut self, exprs: &'g [Expr], cur: Cursor<'i>, frame: &mut Frame<P>) -> Step<'i> {
        let mark = frame.mark();
        let sigspace = self.sigspace();
        let mut pos = cur;
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                pos = self.skip_ws_if(sigspace, pos)?;
            }
            match self.match_expr(expr, pos, frame)? {
                Some(next) => pos = next,
                None => {
                    frame.rollback(mark);
                    return Ok(None);
                }
            }
        }
        Ok(Some(pos))
    }

    #[inline(never)]
    fn match_longest(
        &mut self,
        exprs: &'g [Expr],
        cur: Cursor<'i>,
        frame: &mut Frame<P>,
    ) -> Step<'i> {
        let mut best: Option<(Cursor<'i>, Frame<P>)> = None;
        for alt in exprs {
            let mut scratch = Frame::new();
            if let Some(next) = self.match_expr(alt, cur, &mut scratch)?
                && best
                    .as_ref()
                    .is_none_or(|(end, _)| next.position() > end.position())
            {
                best = Some((next, scratch));
            }
        }
        Ok(best.map(|(end, scratch)| {
            frame.append(scratch);
            end
        }))
    }

    #[allow(clippy::too_many_arguments)]
    #[inline(never)]
    fn match_repeat(
        &mut self,
        item: &'g Expr,
        (min, max): (usize, Option<usize>),
        separator: Option<&'g Expr>,
        trailing: TrailingSeparator,
        cur: Cursor<'i>,
        frame: &mut Frame<P>,
    ) -> Step<'i> {
        let mark = frame.mark();
        let sigspace = self.sigspace();
        let mut pos = cur;
        let mut count = 0usize;

        while max.is_none_or(|max| count < max) {
            let iteration = frame.mark();
            let mut item_start = pos;
            if count > 0 {
                item_start = self.skip_ws_if(sigspace, pos)?;
                if let Some(sep) = separator {
                    let Some(after_sep) = self.match_expr(sep, item_start, frame)? else {
                        break;
                    };
                    item_start = self.skip_ws_if(sigspace, after_sep)?;
                }
            }
            let Some(next) = self.match_expr(item, item_start, frame)? else {
                frame.rollback(iteration);
                break;
            };
            count += 1;
            let stalled = next.position() == pos.position();
            pos = next;
            if stalled {
                count = count.max(min);
                break;
            }
        }

        let mut ended_on_separator = false;
        if count > 0
            && trailing != TrailingSeparator::Forbid
            && let Some(sep) = separator
        {
            let sep_start = self.skip_ws_if(sigspace, pos)?;
            if let Some(after_sep) = self.match_expr(sep, sep_start, frame)? {
                pos = after_sep;
                ended_on_separator = true;
            }
        }

        let missing_separator =
            trailing == TrailingSeparator::Require && count > 0 && !ended_on_separator;
        if count < min || missing_separator {
            frame.rollback(mark);
            return Ok(None);
        }
        Ok(Some(pos))
    }

    /// Zero-width test of `inner` at `cur`. Captures are discarded and
    /// failures inside are not reported.
    #[inline(never)]
    fn peek(&mut self, inner: &'g Expr, cur: Cursor<'i>) -> Result<bool, Abort> {
        let mut scratch = Frame::new();
        self.state.enter_quiet();
        let result = self.match_expr(inner, cur, &mut scratch);
        self.state.leave_quiet();
        Ok(result?.is_some())
    }

    /// `open ~ goal inner`.
    ///
    /// Named captures made by the goal are kept; positional ones are not.
    #[inline(never)]
    fn match_goal(
        &mut self,
        open: &'g Expr,
        goal: &'g Expr,
        inner: &'g Expr,
        cur: Cursor<'i>,
        frame: &mut Frame<P>,
    ) -> Step<'i> {
        let mark = frame.mark();
        let sigspace = self.sigspace();

        let Some(after_open) = self.match_expr(open, cur, frame)? else {
            return Ok(None);
        };
        let inner_start = self.skip_ws_if(sigspace, after_open)?;
        let Some(after_inner) = self.match_expr(inner, inner_start, frame)? else {
            frame.rollback(mark);
            return Ok(None);
        };
        let goal_start = self.skip_ws_if(sigspace, after_inner)?;

        let mut goal_frame = Frame::new();
        self.state.enter_quiet();
        let result = self.match_expr(goal, goal_start, &mut goal_frame);
        self.state.leave_quiet();

        if let Some(end) = result? {
            frame.append_named(goal_frame);
            Ok(Some(end))
        } else {
            self.state
                .expected_goal(goal_start.position(), goal.to_string());
            frame.rollback(mark);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{CharClass, GrammarBuilder, ValidationOptions};

    fn run(grammar: &Grammar, rule: &str, input: &str) -> Result<Match, ParseError> {
        let config = MatchConfig::default();
        Engine::new(grammar, &config, input).run(rule, true)
    }

    #[test]
    fn test_frame_rollback() {
        let mut frame: Frame<()> = Frame::new();
        frame.push_named("a".into(), Match::new(crate::syntax::Span::new(0, 1)));
        let mark = frame.mark();
        frame.push_positional(Match::new(crate::syntax::Span::new(1, 2)));
        frame.rollback(mark);
        let node = frame.close(Match::new(crate::syntax::Span::new(0, 2)));
        assert_eq!(node.all("a").len(), 1);
        assert!(node.positional().is_empty());
    }

    #[test]
    fn test_builtin_whitespace_between_atoms() {
        let grammar = GrammarBuilder::new("G")
            .rule(
                "pair",
                Expr::seq([Expr::literal("a"), Expr::literal("="), Expr::literal("b")]),
            )
            .build()
            .expect("valid grammar");
        let node = run(&grammar, "pair", "a \t= b").expect("matches");
        assert_eq!(node.span().len(), 6);
        assert!(run(&grammar, "pair", " a=b").is_err());
    }

    #[test]
    fn test_token_has_no_implicit_whitespace() {
        let grammar = GrammarBuilder::new("G")
            .token("pair", Expr::seq([Expr::literal("a"), Expr::literal("b")]))
            .build()
            .expect("valid grammar");
        assert!(run(&grammar, "pair", "ab").is_ok());
        assert!(run(&grammar, "pair", "a b").is_err());
    }

    #[test]
    fn test_sym_matches_alternative_tag() {
        let grammar = GrammarBuilder::new("G")
            .proto("kw")
            .token_alt("kw", "if", Expr::sym())
            .token_alt("kw", "else", Expr::sym())
            .build()
            .expect("valid grammar");
        let node = run(&grammar, "kw", "else").expect("matches");
        assert_eq!(node.alt_tag(), Some("else"));
        assert!(run(&grammar, "kw", "then").is_err());
    }

    fn nesting_grammar() -> Grammar {
        GrammarBuilder::new("G")
            .token(
                "nest",
                Expr::choice([
                    Expr::seq([Expr::literal("("), Expr::call("nest"), Expr::literal(")")]),
                    Expr::empty(),
                ]),
            )
            .build()
            .expect("valid grammar")
    }

    fn nested(levels: usize) -> String {
        format!("{}{}", "(".repeat(levels), ")".repeat(levels))
    }

    #[test]
    fn test_stack_exhausted() {
        let grammar = nesting_grammar();
        let config = MatchConfig {
            max_depth: 4,
            ..MatchConfig::default()
        };
        let err = Engine::<()>::new(&grammar, &config, "((((((()))))))")
            .run("nest", true)
            .expect_err("too deep");
        assert!(matches!(err, ParseError::StackExhausted { depth: 4, .. }));
    }

    #[test]
    fn test_default_depth_fits_test_thread() {
        let grammar = nesting_grammar();
        let config = MatchConfig::default();

        // One activation per level plus the innermost empty match
        let input = nested(config.max_depth - 6);
        let node = run(&grammar, "nest", &input).expect("within the default depth");
        assert_eq!(node.span().len(), input.len());

        let err = run(&grammar, "nest", &nested(config.max_depth + 10)).expect_err("too deep");
        assert_eq!(
            err,
            ParseError::StackExhausted {
                rule: "nest".into(),
                position: config.max_depth,
                depth: config.max_depth,
            }
        );
    }

    #[test]
    fn test_stack_budget_stops_deep_recursion() {
        let grammar = nesting_grammar();
        let config = MatchConfig {
            max_depth: usize::MAX,
            max_stack: 16 * 1024,
            ..MatchConfig::default()
        };
        let err = Engine::<()>::new(&grammar, &config, &nested(5000))
            .run("nest", true)
            .expect_err("stack budget exceeded");
        let ParseError::StackExhausted { depth, .. } = err else {
            panic!("expected StackExhausted, got {err:?}");
        };
        assert!(depth > 0 && depth < 5000, "stopped at depth {depth}");
    }

    #[test]
    fn test_proto_resolution_is_cached() {
        let grammar = GrammarBuilder::new("G")
            .proto("kw")
            .token_alt("kw", "if", Expr::sym())
            .token_alt("kw", "else", Expr::sym())
            .token(
                "list",
                Expr::separated(Expr::call("kw"), Expr::literal(","), 1),
            )
            .build()
            .expect("valid grammar");
        let config = MatchConfig::default();
        let mut engine = Engine::<()>::new(&grammar, &config, "");
        let (Target::Proto(first), Target::Proto(second)) = (
            engine.target("kw").expect("known rule"),
            engine.target("kw").expect("known rule"),
        ) else {
            panic!("kw is a proto group");
        };
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);

        let node = run(&grammar, "list", "if,else,if").expect("matches");
        let tags: Vec<_> = node.all("kw").iter().filter_map(|kw| kw.alt_tag()).collect();
        assert_eq!(tags, ["if", "else", "if"]);
    }

    #[test]
    fn test_nodes_share_the_input() {
        let grammar = GrammarBuilder::new("G")
            .rule(
                "pair",
                Expr::seq([
                    Expr::call("key"),
                    Expr::literal("="),
                    Expr::named("value", Expr::plus(Expr::class(CharClass::digit()))),
                ]),
            )
            .token("key", Expr::plus(Expr::class(CharClass::alpha())))
            .build()
            .expect("valid grammar");
        let node = run(&grammar, "pair", "width = 42").expect("matches");
        assert_eq!(node.as_str(), "width = 42");
        assert_eq!(node.one("key").map(Match::as_str), Some("width"));
        assert_eq!(node.one("value").map(Match::as_str), Some("42"));
    }

    #[test]
    fn test_runtime_left_recursion() {
        let grammar = GrammarBuilder::new("G")
            .validation(ValidationOptions::none())
            .token(
                "list",
                Expr::choice([
                    Expr::seq([Expr::call("list"), Expr::literal(",")]),
                    Expr::class(CharClass::digit()),
                ]),
            )
            .build()
            .expect("validation disabled");
        let err = run(&grammar, "list", "1,").expect_err("left recursive");
        assert_eq!(
            err,
            ParseError::LeftRecursion {
                rule: "list".into(),
                position: 0
            }
        );
    }

    #[test]
    fn test_ws_override_is_not_reentered() {
        let grammar = GrammarBuilder::new("G")
            .rule(
                "ws",
                Expr::star(Expr::choice([Expr::literal(" "), Expr::literal("_")])),
            )
            .rule("ab", Expr::seq([Expr::literal("a"), Expr::literal("b")]))
            .build()
            .expect("valid grammar");
        assert!(run(&grammar, "ab", "a _ b").is_ok());
        assert!(run(&grammar, "ab", "a\tb").is_err());
    }
}
