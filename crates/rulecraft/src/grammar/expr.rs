//! Rule bodies
//!
//! An [`Expr`] is the declarative body of a rule. The engine in
//! [`crate::parser`] evaluates it against a cursor; the grammar validator
//! walks it to find references and left recursion.

use crate::grammar::CharClass;
use compact_str::CompactString;
use std::fmt;

/// Controls whether a trailing separator is allowed in separated lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrailingSeparator {
    /// A separator with no item after it is given back (`X* % sep`)
    #[default]
    Forbid,
    /// A trailing separator is consumed when present (`X* %% sep`)
    Allow,
    /// A non-empty list must end with a separator
    Require,
}

/// How a sub-rule call records its result in the enclosing node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CallCapture {
    /// `<name>`: captured under the rule name
    #[default]
    Named,
    /// `<alias=name>`: captured under `alias`
    Alias(CompactString),
    /// `<.name>`: matched, not captured
    Silent,
}

/// Rule body expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Primitives
    /// Exact text
    Literal(CompactString),
    /// One code point from a class
    Class(CharClass),
    /// Any single code point
    Any,
    /// `^`
    StartOfInput,
    /// `$`
    EndOfInput,
    /// Always succeeds without consuming
    Empty,
    /// `<sym>`: the tag of the proto alternative being matched
    Sym,

    // Combinators
    /// Every expression in order
    Seq(Vec<Expr>),
    /// Ordered choice (`||`): first alternative that matches
    Choice(Vec<Expr>),
    /// Longest-match choice (`|`): ties go to the earlier alternative
    Longest(Vec<Expr>),
    /// Greedy repetition, optionally separated
    Repeat {
        expr: Box<Expr>,
        min: usize,
        /// `None` for unbounded
        max: Option<usize>,
        separator: Option<Box<Expr>>,
        trailing: TrailingSeparator,
    },

    // Predicates
    /// `<?before X>`
    Lookahead(Box<Expr>),
    /// `<!before X>`
    NotLookahead(Box<Expr>),

    // Rules and captures
    /// Sub-rule invocation
    Call {
        rule: CompactString,
        capture: CallCapture,
    },
    /// `$<name>=[X]`: anonymous node captured under `name`
    Named { name: CompactString, expr: Box<Expr> },
    /// `( X )`: anonymous node captured positionally
    Group(Box<Expr>),
    /// `open ~ goal inner`: `open`, then `inner`, then `goal`
    Goal {
        open: Box<Expr>,
        goal: Box<Expr>,
        inner: Box<Expr>,
    },
}

// Builder methods
impl Expr {
    #[must_use]
    pub fn literal(text: impl Into<CompactString>) -> Self {
        Self::Literal(text.into())
    }

    #[must_use]
    pub const fn class(class: CharClass) -> Self {
        Self::Class(class)
    }

    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self::Empty
    }

    #[must_use]
    pub const fn sym() -> Self {
        Self::Sym
    }

    #[must_use]
    pub const fn start() -> Self {
        Self::StartOfInput
    }

    #[must_use]
    pub const fn end() -> Self {
        Self::EndOfInput
    }

    /// Sequence; a single expression is returned as is.
    #[must_use]
    pub fn seq<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut vec: Vec<_> = exprs.into_iter().collect();
        if vec.len() == 1
            && let Some(only) = vec.pop()
        {
            only
        } else {
            Self::Seq(vec)
        }
    }

    /// Ordered choice; a single expression is returned as is.
    #[must_use]
    pub fn choice<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut vec: Vec<_> = exprs.into_iter().collect();
        if vec.len() == 1
            && let Some(only) = vec.pop()
        {
            only
        } else {
            Self::Choice(vec)
        }
    }

    /// Longest-match choice; a single expression is returned as is.
    #[must_use]
    pub fn longest<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut vec: Vec<_> = exprs.into_iter().collect();
        if vec.len() == 1
            && let Some(only) = vec.pop()
        {
            only
        } else {
            Self::Longest(vec)
        }
    }

    #[must_use]
    pub fn repeat(expr: Self, min: usize, max: Option<usize>) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min,
            max,
            separator: None,
            trailing: TrailingSeparator::Forbid,
        }
    }

    /// `X?`
    #[must_use]
    pub fn opt(expr: Self) -> Self {
        Self::repeat(expr, 0, Some(1))
    }

    /// `X*`
    #[must_use]
    pub fn star(expr: Self) -> Self {
        Self::repeat(expr, 0, None)
    }

    /// `X+`
    #[must_use]
    pub fn plus(expr: Self) -> Self {
        Self::repeat(expr, 1, None)
    }

    /// `X ** n`
    #[must_use]
    pub fn exactly(expr: Self, n: usize) -> Self {
        Self::repeat(expr, n, Some(n))
    }

    /// `X* % sep`, or `X+ % sep` when `min` is 1.
    #[must_use]
    pub fn separated(item: Self, separator: Self, min: usize) -> Self {
        Self::separated_with(item, separator, min, TrailingSeparator::Forbid)
    }

    #[must_use]
    pub fn separated_with(
        item: Self,
        separator: Self,
        min: usize,
        trailing: TrailingSeparator,
    ) -> Self {
        Self::Repeat {
            expr: Box::new(item),
            min,
            max: None,
            separator: Some(Box::new(separator)),
            trailing,
        }
    }

    #[must_use]
    pub fn lookahead(expr: Self) -> Self {
        Self::Lookahead(Box::new(expr))
    }

    #[must_use]
    pub fn not_lookahead(expr: Self) -> Self {
        Self::NotLookahead(Box::new(expr))
    }

    /// `<rule>`
    #[must_use]
    pub fn call(rule: impl Into<CompactString>) -> Self {
        Self::Call {
            rule: rule.into(),
            capture: CallCapture::Named,
        }
    }

    /// `<alias=rule>`
    #[must_use]
    pub fn call_as(alias: impl Into<CompactString>, rule: impl Into<CompactString>) -> Self {
        Self::Call {
            rule: rule.into(),
            capture: CallCapture::Alias(alias.into()),
        }
    }

    /// `<.rule>`
    #[must_use]
    pub fn call_silent(rule: impl Into<CompactString>) -> Self {
        Self::Call {
            rule: rule.into(),
            capture: CallCapture::Silent,
        }
    }

    #[must_use]
    pub fn named(name: impl Into<CompactString>, expr: Self) -> Self {
        Self::Named {
            name: name.into(),
            expr: Box::new(expr),
        }
    }

    #[must_use]
    pub fn group(expr: Self) -> Self {
        Self::Group(Box::new(expr))
    }

    /// `open ~ goal inner`
    #[must_use]
    pub fn goal(open: Self, goal: Self, inner: Self) -> Self {
        Self::Goal {
            open: Box::new(open),
            goal: Box::new(goal),
            inner: Box::new(inner),
        }
    }
}

impl Expr {
    /// Direct sub-expressions, in evaluation order.
    pub fn for_each_child<'e>(&'e self, mut f: impl FnMut(&'e Self)) {
        match self {
            Self::Seq(exprs) | Self::Choice(exprs) | Self::Longest(exprs) => {
                exprs.iter().for_each(f);
            }
            Self::Repeat {
                expr, separator, ..
            } => {
                f(expr);
                if let Some(sep) = separator {
                    f(sep);
                }
            }
            Self::Lookahead(expr)
            | Self::NotLookahead(expr)
            | Self::Group(expr)
            | Self::Named { expr, .. } => f(expr),
            Self::Goal { open, goal, inner } => {
                f(open);
                f(inner);
                f(goal);
            }
            Self::Literal(_)
            | Self::Class(_)
            | Self::Any
            | Self::StartOfInput
            | Self::EndOfInput
            | Self::Empty
            | Self::Sym
            | Self::Call { .. } => {}
        }
    }

    /// Names of every rule this expression calls, in first-seen order.
    #[must_use]
    pub fn referenced_rules(&self) -> Vec<&str> {
        fn collect<'e>(expr: &'e Expr, out: &mut Vec<&'e str>) {
            if let Expr::Call { rule, .. } = expr
                && !out.contains(&rule.as_str())
            {
                out.push(rule);
            }
            expr.for_each_child(|child| collect(child, out));
        }

        let mut out = Vec::new();
        collect(self, &mut out);
        out
    }

    /// Whether this expression is printed without brackets inside a sequence
    /// or before a quantifier.
    const fn is_atomic(&self) -> bool {
        !matches!(
            self,
            Self::Seq(_) | Self::Choice(_) | Self::Longest(_) | Self::Repeat { .. } | Self::Goal { .. }
        )
    }
}

impl From<&str> for Expr {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<CharClass> for Expr {
    fn from(class: CharClass) -> Self {
        Self::Class(class)
    }
}

fn write_atom(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if expr.is_atomic() {
        write!(f, "{expr}")
    } else {
        write!(f, "[ {expr} ]")
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, exprs: &[Expr], sep: &str) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        match expr {
            Expr::Choice(_) | Expr::Longest(_) => write!(f, "[ {expr} ]")?,
            _ => write!(f, "{expr}")?,
        }
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => {
                f.write_str("'")?;
                for ch in text.chars() {
                    match ch {
                        '\'' | '\\' => write!(f, "\\{ch}")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        _ => write!(f, "{ch}")?,
                    }
                }
                f.write_str("'")
            }
            Self::Class(class) => write!(f, "{class}"),
            Self::Any => f.write_str("."),
            Self::StartOfInput => f.write_str("^"),
            Self::EndOfInput => f.write_str("$"),
            Self::Empty => f.write_str("<?>"),
            Self::Sym => f.write_str("<sym>"),
            Self::Seq(exprs) => {
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_atom(f, expr)?;
                }
                Ok(())
            }
            Self::Choice(exprs) => write_joined(f, exprs, " || "),
            Self::Longest(exprs) => write_joined(f, exprs, " | "),
            Self::Repeat {
                expr,
                min,
                max,
                separator,
                trailing,
            } => {
                write_atom(f, expr)?;
                match (min, max) {
                    (0, Some(1)) => f.write_str("?")?,
                    (0, None) => f.write_str("*")?,
                    (1, None) => f.write_str("+")?,
                    (n, Some(m)) if n == m => write!(f, " ** {n}")?,
                    (n, Some(m)) => write!(f, " ** {n}..{m}")?,
                    (n, None) => write!(f, " ** {n}..*")?,
                }
                if let Some(sep) = separator {
                    let op = match trailing {
                        TrailingSeparator::Forbid => "%",
                        TrailingSeparator::Allow | TrailingSeparator::Require => "%%",
                    };
                    write!(f, " {op} ")?;
                    write_atom(f, sep)?;
                }
                Ok(())
            }
            Self::Lookahead(expr) => write!(f, "<?before {expr}>"),
            Self::NotLookahead(expr) => write!(f, "<!before {expr}>"),
            Self::Call { rule, capture } => match capture {
                CallCapture::Named => write!(f, "<{rule}>"),
                CallCapture::Alias(alias) => write!(f, "<{alias}={rule}>"),
                CallCapture::Silent => write!(f, "<.{rule}>"),
            },
            Self::Named { name, expr } => {
                write!(f, "$<{name}>=")?;
                if expr.is_atomic() {
                    write!(f, "{expr}")
                } else {
                    write!(f, "[ {expr} ]")
                }
            }
            Self::Group(expr) => write!(f, "( {expr} )"),
            Self::Goal { open, goal, inner } => {
                write_atom(f, open)?;
                f.write_str(" ~ ")?;
                write_atom(f, goal)?;
                f.write_str(" ")?;
                write_atom(f, inner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_collapses_single() {
        assert_eq!(Expr::seq([Expr::literal("a")]), Expr::literal("a"));
        assert!(matches!(
            Expr::seq([Expr::literal("a"), Expr::literal("b")]),
            Expr::Seq(v) if v.len() == 2
        ));
    }

    #[test]
    fn test_referenced_rules_dedup() {
        let expr = Expr::seq([
            Expr::call("string"),
            Expr::literal(":"),
            Expr::call("value"),
            Expr::star(Expr::call_silent("string")),
        ]);
        assert_eq!(expr.referenced_rules(), ["string", "value"]);
    }

    #[test]
    fn test_display_goal() {
        let expr = Expr::goal(Expr::literal("{"), Expr::literal("}"), Expr::call("pairlist"));
        assert_eq!(expr.to_string(), "'{' ~ '}' <pairlist>");
    }

    #[test]
    fn test_display_separated() {
        let expr = Expr::separated(Expr::call("pair"), Expr::literal(","), 0);
        assert_eq!(expr.to_string(), "<pair>* % ','");

        let trailing = Expr::separated_with(
            Expr::call("value"),
            Expr::literal(","),
            1,
            TrailingSeparator::Allow,
        );
        assert_eq!(trailing.to_string(), "<value>+ %% ','");
    }

    #[test]
    fn test_display_quantifiers() {
        let digits = Expr::class(CharClass::range('0', '9'));
        assert_eq!(Expr::opt(Expr::literal("-")).to_string(), "'-'?");
        assert_eq!(Expr::exactly(Expr::call_silent("xdigit"), 4).to_string(), "<.xdigit> ** 4");
        assert_eq!(
            Expr::opt(Expr::seq([Expr::literal("."), Expr::plus(digits)])).to_string(),
            "[ '.' <[0..9]>+ ]?"
        );
    }

    #[test]
    fn test_display_choices_and_predicates() {
        let expr = Expr::seq([
            Expr::not_lookahead(Expr::literal("'")),
            Expr::longest([Expr::call("a"), Expr::call_as("b", "c")]),
        ]);
        assert_eq!(expr.to_string(), "<!before '\\''> [ <a> | <b=c> ]");
        assert_eq!(
            Expr::choice([Expr::Sym, Expr::Any]).to_string(),
            "<sym> || ."
        );
    }
}
