//! # Grammar-Driven Input Generation
//!
//! [`SampleGenerator`] walks rule bodies and emits text that follows them:
//! a literal is copied, a character class contributes one member, a
//! repetition is unrolled a random number of times, and so on. Rules with
//! implicit whitespace get a single space between atoms.
//!
//! The output is a plausible sentence of the grammar, not a guaranteed one:
//! ordered choice and greedy repetition can reject text that a naive
//! expansion produces. For grammars written in the usual style (JSON, simple
//! expression languages) generated samples are accepted.
//!
//! ```rust
//! use rulecraft::grammar::{CharClass, Expr, GrammarBuilder};
//! use rulecraft::parser::parse;
//! use rulecraft::testing::{GeneratorConfig, SampleGenerator};
//!
//! let grammar = GrammarBuilder::new("List")
//!     .rule("list", Expr::goal(Expr::literal("["), Expr::literal("]"),
//!         Expr::separated(Expr::call("num"), Expr::literal(","), 0)))
//!     .token("num", Expr::plus(Expr::class(CharClass::digit())))
//!     .build()
//!     .expect("valid grammar");
//!
//! let config = GeneratorConfig { seed: Some(7), ..GeneratorConfig::default() };
//! let sample = SampleGenerator::new(&grammar, config).generate("list").expect("known rule");
//! assert!(parse::<()>(&grammar, "list", &sample, true).is_ok());
//! ```

use crate::error::GrammarError;
use crate::grammar::{CharClass, ClassItem, Expr, Grammar, Resolved};
use std::cell::RefCell;

/// Configuration for grammar-based input generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Rule nesting depth after which repetitions use their minimum count
    /// and choices take their first alternative
    pub max_depth: usize,
    /// Extra repetitions allowed beyond the minimum of an unbounded repeat
    pub max_repetitions: usize,
    /// Probability of taking optional elements (0.0 to 1.0)
    pub optional_probability: f64,
    /// Seed for reproducible generation
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_repetitions: 4,
            optional_probability: 0.5,
            seed: None,
        }
    }
}

/// Characters tried, in order, when a class has no range to draw from.
const CLASS_CANDIDATES: &str = "azAZ09_ .-+eE\t";

/// Per-rule context while expanding a body.
#[derive(Clone, Copy)]
struct Scope<'a> {
    tag: Option<&'a str>,
    sigspace: bool,
    depth: usize,
}

/// Generator for sample inputs of a grammar rule
pub struct SampleGenerator<'g> {
    grammar: &'g Grammar,
    config: GeneratorConfig,
    rng: RefCell<SimpleRng>,
}

impl<'g> SampleGenerator<'g> {
    #[must_use]
    pub fn new(grammar: &'g Grammar, config: GeneratorConfig) -> Self {
        let rng = config.seed.map_or_else(SimpleRng::new, SimpleRng::with_seed);
        Self {
            grammar,
            config,
            rng: RefCell::new(rng),
        }
    }

    /// Generate one sample of `rule`.
    ///
    /// Successive calls continue the same random sequence.
    ///
    /// # Errors
    ///
    /// [`GrammarError::UnknownRule`] when `rule` or a rule it calls is not
    /// defined.
    pub fn generate(&self, rule: &str) -> Result<String, GrammarError> {
        let mut out = String::new();
        self.generate_rule(rule, 0, &mut out)?;
        Ok(out)
    }

    /// Generate a sample of `rule` and apply `mutations` random edits to it
    /// (delete, insert, replace, swap or duplicate one character).
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    pub fn generate_mutated(&self, rule: &str, mutations: usize) -> Result<String, GrammarError> {
        let mut chars: Vec<char> = self.generate(rule)?.chars().collect();
        let mut rng = self.rng.borrow_mut();
        for _ in 0..mutations {
            if chars.is_empty() {
                chars.push(rng.pick_char(CLASS_CANDIDATES));
                continue;
            }
            let idx = rng.below(chars.len());
            match rng.below(5) {
                0 => {
                    chars.remove(idx);
                }
                1 => chars.insert(idx, rng.pick_char(CLASS_CANDIDATES)),
                2 => chars[idx] = rng.pick_char(CLASS_CANDIDATES),
                3 => {
                    let other = rng.below(chars.len());
                    chars.swap(idx, other);
                }
                _ => {
                    let ch = chars[idx];
                    chars.insert(idx, ch);
                }
            }
        }
        Ok(chars.into_iter().collect())
    }

    fn generate_rule(&self, name: &str, depth: usize, out: &mut String) -> Result<(), GrammarError> {
        let grammar = self.grammar;
        match grammar.resolve(name)? {
            Resolved::Simple(rule) => {
                let scope = Scope {
                    tag: None,
                    sigspace: rule.sigspace,
                    depth,
                };
                self.generate_expr(&rule.expr, scope, out)
            }
            Resolved::Proto(alternatives) => {
                let Some(alt) = alternatives.get(self.pick(alternatives.len(), depth)) else {
                    return Ok(());
                };
                let scope = Scope {
                    tag: Some(alt.tag),
                    sigspace: alt.rule.sigspace,
                    depth,
                };
                self.generate_expr(&alt.rule.expr, scope, out)
            }
        }
    }

    fn generate_expr(&self, expr: &Expr, scope: Scope<'_>, out: &mut String) -> Result<(), GrammarError> {
        match expr {
            Expr::Literal(text) => out.push_str(text),
            Expr::Class(class) => {
                if let Some(ch) = self.sample_class(class) {
                    out.push(ch);
                }
            }
            Expr::Any => out.push('x'),
            Expr::Sym => out.push_str(scope.tag.unwrap_or_default()),
            Expr::StartOfInput
            | Expr::EndOfInput
            | Expr::Empty
            | Expr::Lookahead(_)
            | Expr::NotLookahead(_) => {}
            Expr::Seq(exprs) => {
                for (i, item) in exprs.iter().enumerate() {
                    if i > 0 && scope.sigspace {
                        out.push(' ');
                    }
                    self.generate_expr(item, scope, out)?;
                }
            }
            Expr::Choice(exprs) | Expr::Longest(exprs) => {
                if let Some(alt) = exprs.get(self.pick(exprs.len(), scope.depth)) {
                    self.generate_expr(alt, scope, out)?;
                }
            }
            Expr::Repeat {
                expr,
                min,
                max,
                separator,
                ..
            } => {
                let count = self.repetitions(*min, *max, scope.depth);
                for i in 0..count {
                    if i > 0 {
                        if scope.sigspace {
                            out.push(' ');
                        }
                        if let Some(sep) = separator {
                            self.generate_expr(sep, scope, out)?;
                            if scope.sigspace {
                                out.push(' ');
                            }
                        }
                    }
                    self.generate_expr(expr, scope, out)?;
                }
            }
            Expr::Call { rule, .. } => self.generate_rule(rule, scope.depth + 1, out)?,
            Expr::Named { expr, .. } | Expr::Group(expr) => self.generate_expr(expr, scope, out)?,
            Expr::Goal { open, goal, inner } => {
                self.generate_expr(open, scope, out)?;
                if scope.sigspace {
                    out.push(' ');
                }
                self.generate_expr(inner, scope, out)?;
                if scope.sigspace {
                    out.push(' ');
                }
                self.generate_expr(goal, scope, out)?;
            }
        }
        Ok(())
    }

    /// Index of the alternative to expand; always the first past `max_depth`.
    fn pick(&self, len: usize, depth: usize) -> usize {
        if len == 0 || depth > self.config.max_depth {
            0
        } else {
            self.rng.borrow_mut().below(len)
        }
    }

    fn repetitions(&self, min: usize, max: Option<usize>, depth: usize) -> usize {
        if depth > self.config.max_depth {
            return min;
        }
        let mut rng = self.rng.borrow_mut();
        if max == Some(1) && min == 0 {
            return usize::from(rng.next_f64() < self.config.optional_probability);
        }
        let upper = max.unwrap_or(min + self.config.max_repetitions).max(min);
        min + rng.below(upper - min + 1)
    }

    fn sample_class(&self, class: &CharClass) -> Option<char> {
        let mut rng = self.rng.borrow_mut();
        if !class.is_negated() {
            for item in class.items() {
                let drawn = match item {
                    ClassItem::Range(lo, hi) => {
                        let span = u32::from(*hi).saturating_sub(u32::from(*lo));
                        let offset = u32::try_from(rng.below(span as usize + 1)).unwrap_or(0);
                        char::from_u32(u32::from(*lo) + offset).or(Some(*lo))
                    }
                    ClassItem::Digit => Some(rng.pick_char("0123456789")),
                    ClassItem::XDigit => Some(rng.pick_char("0123456789abcdefABCDEF")),
                    ClassItem::Alpha => Some(rng.pick_char("abcxyzABCXYZ")),
                    ClassItem::Alnum | ClassItem::Word => Some(rng.pick_char("abcxyz019")),
                    ClassItem::Space => Some(' '),
                    ClassItem::Class(_) => None,
                };
                if let Some(ch) = drawn
                    && class.matches(ch)
                {
                    return Some(ch);
                }
            }
        }
        CLASS_CANDIDATES.chars().find(|&ch| class.matches(ch))
    }
}

/// Simple RNG for deterministic testing
#[derive(Debug, Clone)]
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    const fn new() -> Self {
        Self {
            state: 0x853c_49e6_748f_ea9b,
        }
    }

    const fn with_seed(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        Self {
            state: if seed == 0 { 0x853c_49e6_748f_ea9b } else { seed },
        }
    }

    const fn next_u64(&mut self) -> u64 {
        // XorShift algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    #[allow(clippy::cast_precision_loss)]
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }

    /// Uniform-ish value in `0..bound`; `bound` must be non-zero.
    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }

    fn pick_char(&mut self, chars: &str) -> char {
        let count = chars.chars().count().max(1);
        let idx = self.below(count);
        chars.chars().nth(idx).unwrap_or(' ')
    }
}
