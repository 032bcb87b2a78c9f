//! Static checks over a grammar chain
//!
//! Validation looks at every name resolvable from a grammar, so a derived
//! grammar is checked together with everything it inherits.

use crate::error::diagnostics::did_you_mean;
use crate::grammar::{Expr, Grammar, GrammarError, Resolved, SimpleRule};
use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};

/// Which checks [`Grammar::validate`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Every `<name>` must resolve somewhere in the chain
    pub check_references: bool,
    /// No rule may reach itself without consuming input
    pub check_left_recursion: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_references: true,
            check_left_recursion: true,
        }
    }
}

impl ValidationOptions {
    /// Skip every check.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            check_references: false,
            check_left_recursion: false,
        }
    }
}

/// A call from one rule body to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallEdge<'g> {
    pub target: &'g str,
    /// The call can happen before the caller has consumed any input
    pub leading: bool,
}

/// Calls between the resolvable rules of a grammar chain.
#[derive(Debug, Clone)]
pub struct CallGraph<'g> {
    order: Vec<&'g str>,
    edges: HashMap<&'g str, Vec<CallEdge<'g>>, ahash::RandomState>,
}

impl<'g> CallGraph<'g> {
    /// Outgoing calls of `rule`, in first-seen order.
    #[must_use]
    pub fn edges(&self, rule: &str) -> &[CallEdge<'g>] {
        self.edges.get(rule).map_or(&[], Vec::as_slice)
    }

    /// Rules reachable from `rule` through any number of calls.
    #[must_use]
    pub fn reachable_from(&self, rule: &str) -> Vec<&'g str> {
        let mut seen: HashSet<&str, ahash::RandomState> =
            HashSet::with_hasher(ahash::RandomState::new());
        let mut stack: Vec<&str> = vec![rule];
        let mut out = Vec::new();
        while let Some(current) = stack.pop() {
            for edge in self.edges(current) {
                if seen.insert(edge.target) {
                    out.push(edge.target);
                    stack.push(edge.target);
                }
            }
        }
        out
    }

    /// Elementary cycles over leading calls, each rotated to start at its
    /// earliest-declared rule.
    #[must_use]
    pub fn left_recursive_cycles(&self) -> Vec<Vec<&'g str>> {
        let index: HashMap<&str, usize, ahash::RandomState> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i))
            .collect();

        let mut cycles = Vec::new();
        for (start_idx, &start) in self.order.iter().enumerate() {
            let mut path = vec![start];
            self.find_cycles(start, start_idx, &index, &mut path, &mut cycles);
        }
        cycles
    }

    fn find_cycles(
        &self,
        start: &'g str,
        start_idx: usize,
        index: &HashMap<&str, usize, ahash::RandomState>,
        path: &mut Vec<&'g str>,
        cycles: &mut Vec<Vec<&'g str>>,
    ) {
        let Some(current) = path.last().copied() else {
            return;
        };
        for edge in self.edges(current).iter().filter(|edge| edge.leading) {
            if edge.target == start {
                cycles.push(path.clone());
                continue;
            }
            let Some(&target_idx) = index.get(edge.target) else {
                continue;
            };
            if target_idx > start_idx && !path.contains(&edge.target) {
                path.push(edge.target);
                self.find_cycles(start, start_idx, index, path, cycles);
                path.pop();
            }
        }
    }
}

impl Grammar {
    /// Run the checks enabled in `options`.
    ///
    /// # Errors
    ///
    /// - [`GrammarError::UnknownRule`] for a call to a name no grammar in the
    ///   chain defines
    /// - [`GrammarError::EmptyProtoGroup`] for a group without alternatives
    /// - [`GrammarError::LeftRecursion`] listing every left-recursive cycle
    pub fn validate(&self, options: &ValidationOptions) -> Result<(), GrammarError> {
        let names = self.names();

        for name in &names {
            let resolved = self.resolve(name)?;
            if let Resolved::Proto(alternatives) = &resolved
                && alternatives.is_empty()
            {
                return Err(GrammarError::EmptyProtoGroup {
                    group: (*name).into(),
                    grammar: self.name().into(),
                });
            }

            if options.check_references {
                for (label, rule) in bodies(name, &resolved) {
                    for target in rule.expr.referenced_rules() {
                        if !self.contains(target) {
                            return Err(GrammarError::UnknownRule {
                                rule: target.into(),
                                grammar: self.name().into(),
                                referenced_from: Some(label),
                                suggestion: did_you_mean(target, names.iter().copied())
                                    .map(CompactString::from),
                            });
                        }
                    }
                }
            }
        }

        if options.check_left_recursion {
            let graph = self.call_graph();
            let cycles = graph.left_recursive_cycles();
            if !cycles.is_empty() {
                log::debug!("grammar {}: {} left-recursive cycle(s)", self.name(), cycles.len());
                return Err(GrammarError::LeftRecursion(
                    cycles
                        .into_iter()
                        .map(|cycle| cycle.into_iter().map(CompactString::from).collect())
                        .collect(),
                ));
            }
        }

        log::trace!("grammar {} validated ({} rules)", self.name(), names.len());
        Ok(())
    }

    /// Names of the rules that can match without consuming input.
    #[must_use]
    pub fn nullable_rules(&self) -> HashSet<&str, ahash::RandomState> {
        let resolved = self.resolved_bodies();
        let mut nullable: HashSet<&str, ahash::RandomState> =
            HashSet::with_hasher(ahash::RandomState::new());

        let mut changed = true;
        while changed {
            changed = false;
            for (name, rules) in &resolved {
                if !nullable.contains(*name)
                    && rules.iter().any(|rule| is_nullable(&rule.expr, &nullable))
                {
                    nullable.insert(*name);
                    changed = true;
                }
            }
        }
        nullable
    }

    /// Call graph over every resolvable rule.
    #[must_use]
    pub fn call_graph(&self) -> CallGraph<'_> {
        let resolved = self.resolved_bodies();
        let nullable = self.nullable_rules();

        let mut edges: HashMap<&str, Vec<CallEdge<'_>>, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        let mut order = Vec::with_capacity(resolved.len());

        for (name, rules) in resolved {
            let mut out: Vec<CallEdge<'_>> = Vec::new();
            for rule in rules {
                let mut leading = Vec::new();
                leading_calls(&rule.expr, &nullable, &mut leading);
                for target in rule.expr.referenced_rules() {
                    let is_leading = leading.contains(&target);
                    if let Some(edge) = out.iter_mut().find(|edge| edge.target == target) {
                        edge.leading |= is_leading;
                    } else {
                        out.push(CallEdge {
                            target,
                            leading: is_leading,
                        });
                    }
                }
            }
            order.push(name);
            edges.insert(name, out);
        }

        CallGraph { order, edges }
    }

    fn resolved_bodies(&self) -> Vec<(&str, Vec<&SimpleRule>)> {
        self.names()
            .into_iter()
            .filter_map(|name| {
                let rules = match self.resolve(name).ok()? {
                    Resolved::Simple(rule) => vec![rule],
                    Resolved::Proto(alternatives) => {
                        alternatives.into_iter().map(|alt| alt.rule).collect()
                    }
                };
                Some((name, rules))
            })
            .collect()
    }
}

fn bodies<'g>(name: &str, resolved: &Resolved<'g>) -> Vec<(CompactString, &'g SimpleRule)> {
    match resolved {
        Resolved::Simple(rule) => vec![(name.into(), *rule)],
        Resolved::Proto(alternatives) => alternatives
            .iter()
            .map(|alt| (compact_str::format_compact!("{name}:sym<{}>", alt.tag), alt.rule))
            .collect(),
    }
}

fn is_nullable(expr: &Expr, nullable: &HashSet<&str, ahash::RandomState>) -> bool {
    match expr {
        Expr::Literal(text) => text.is_empty(),
        Expr::Class(_) | Expr::Any | Expr::Sym => false,
        Expr::StartOfInput
        | Expr::EndOfInput
        | Expr::Empty
        | Expr::Lookahead(_)
        | Expr::NotLookahead(_) => true,
        Expr::Seq(exprs) => exprs.iter().all(|e| is_nullable(e, nullable)),
        Expr::Choice(exprs) | Expr::Longest(exprs) => exprs.iter().any(|e| is_nullable(e, nullable)),
        Expr::Repeat {
            expr,
            min,
            separator,
            ..
        } => {
            *min == 0
                || (is_nullable(expr, nullable)
                    && (*min == 1 || separator.as_ref().is_none_or(|sep| is_nullable(sep, nullable))))
        }
        Expr::Call { rule, .. } => nullable.contains(rule.as_str()),
        Expr::Named { expr, .. } | Expr::Group(expr) => is_nullable(expr, nullable),
        Expr::Goal { open, goal, inner } => {
            is_nullable(open, nullable) && is_nullable(inner, nullable) && is_nullable(goal, nullable)
        }
    }
}

/// Calls that can run before `expr` has consumed anything.
fn leading_calls<'e>(
    expr: &'e Expr,
    nullable: &HashSet<&str, ahash::RandomState>,
    out: &mut Vec<&'e str>,
) {
    match expr {
        Expr::Call { rule, .. } => out.push(rule),
        Expr::Seq(exprs) => {
            for e in exprs {
                leading_calls(e, nullable, out);
                if !is_nullable(e, nullable) {
                    break;
                }
            }
        }
        Expr::Choice(exprs) | Expr::Longest(exprs) => {
            for e in exprs {
                leading_calls(e, nullable, out);
            }
        }
        Expr::Repeat {
            expr, separator, ..
        } => {
            leading_calls(expr, nullable, out);
            if let Some(sep) = separator
                && is_nullable(expr, nullable)
            {
                leading_calls(sep, nullable, out);
            }
        }
        Expr::Lookahead(e) | Expr::NotLookahead(e) | Expr::Named { expr: e, .. } | Expr::Group(e) => {
            leading_calls(e, nullable, out);
        }
        Expr::Goal { open, goal, inner } => {
            leading_calls(open, nullable, out);
            if is_nullable(open, nullable) {
                leading_calls(inner, nullable, out);
                if is_nullable(inner, nullable) {
                    leading_calls(goal, nullable, out);
                }
            }
        }
        Expr::Literal(_)
        | Expr::Class(_)
        | Expr::Any
        | Expr::StartOfInput
        | Expr::EndOfInput
        | Expr::Empty
        | Expr::Sym => {}
    }
}
