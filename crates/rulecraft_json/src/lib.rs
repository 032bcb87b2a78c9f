//! # rulecraft_json
//!
//! A JSON parser written as a [`rulecraft`] grammar, plus the actions that
//! turn its match tree into a [`JsonValue`].
//!
//! Besides the base grammar ([`grammar::grammar`]) the crate ships two
//! derived grammars that show what inheritance is for:
//!
//! - [`grammar::commented`] overrides only `ws`, and every inherited rule
//!   starts accepting `// ...` comments between tokens
//! - [`grammar::with_nan`] adds `value:sym<nan>` and `value:sym<NaN>` to the
//!   inherited `value` proto group
//!
//! One [`actions::actions`] table serves all three.
//!
//! ```rust
//! use rulecraft_json::{JsonParser, JsonValue, parse_json};
//!
//! let value = parse_json(r#"{"name": "rulecraft", "tags": ["peg", "json"]}"#).expect("valid JSON");
//! assert_eq!(value.get("name").and_then(JsonValue::as_str), Some("rulecraft"));
//! assert_eq!(value.get("tags").and_then(|t| t.at(1)).and_then(JsonValue::as_str), Some("json"));
//!
//! let lenient = JsonParser::commented().expect("valid grammar");
//! let value = lenient.parse("[1, // first\n 2]").expect("comments are whitespace");
//! assert_eq!(value.to_string(), "[1,2]");
//! ```

pub mod actions;
pub mod grammar;
pub mod value;

pub use actions::JsonNode;
pub use value::JsonValue;

use rulecraft::actions::Actions;
use rulecraft::error::{GrammarError, ParseError};
use rulecraft::grammar::Grammar;
use rulecraft::parser::{MatchConfig, Matcher};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Nesting depth limit used by [`JsonParser`].
///
/// Each level of JSON nesting costs three rule activations (`value`, the
/// container and its list), so this admits documents nested a little under
/// `MAX_DEPTH / 3` levels deep. Deeper input fails with
/// [`ParseError::StackExhausted`] instead of overflowing the stack.
pub const MAX_DEPTH: usize = 300;

/// Why a JSON document could not be turned into a [`JsonValue`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The input matched but the actions left no value at the root
    #[error("`{rule}` matched but produced no value")]
    NoValue { rule: String },
}

impl JsonError {
    /// The furthest-failure report, when the input did not match.
    #[must_use]
    pub const fn failure(&self) -> Option<&rulecraft::error::ParseFailure> {
        match self {
            Self::Parse(err) => err.failure(),
            _ => None,
        }
    }
}

/// A JSON grammar together with its action table.
pub struct JsonParser {
    grammar: Arc<Grammar>,
    actions: Actions<JsonNode>,
    config: MatchConfig,
}

impl JsonParser {
    /// Parser for standard JSON.
    ///
    /// # Errors
    ///
    /// Only if the grammar definition itself is broken.
    pub fn new() -> Result<Self, JsonError> {
        Ok(Self::with_grammar(grammar::grammar()?))
    }

    /// Parser accepting `//` line comments.
    ///
    /// # Errors
    ///
    /// Only if the grammar definition itself is broken.
    pub fn commented() -> Result<Self, JsonError> {
        Ok(Self::with_grammar(grammar::commented()?))
    }

    /// Parser accepting `nan` and `NaN`.
    ///
    /// # Errors
    ///
    /// Only if the grammar definition itself is broken.
    pub fn with_nan() -> Result<Self, JsonError> {
        Ok(Self::with_grammar(grammar::with_nan()?))
    }

    /// Parser for any grammar derived from [`grammar::grammar`].
    #[must_use]
    pub fn with_grammar(grammar: Arc<Grammar>) -> Self {
        Self {
            grammar,
            actions: actions::actions(),
            config: MatchConfig {
                max_depth: MAX_DEPTH,
                ..MatchConfig::default()
            },
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parse a JSON document: an object or an array, optionally surrounded
    /// by whitespace.
    ///
    /// # Errors
    ///
    /// [`JsonError::Parse`] when the input is not JSON.
    pub fn parse(&self, input: &str) -> Result<JsonValue, JsonError> {
        self.parse_rule(grammar::TOP, input)
    }

    /// Parse a single JSON value of any kind, with no surrounding whitespace.
    ///
    /// # Errors
    ///
    /// [`JsonError::Parse`] when the input is not a JSON value.
    pub fn parse_value(&self, input: &str) -> Result<JsonValue, JsonError> {
        self.parse_rule(grammar::VALUE, input)
    }

    fn parse_rule(&self, rule: &str, input: &str) -> Result<JsonValue, JsonError> {
        let matcher = Matcher::with_config(&self.grammar, self.config.clone());
        let mut tree = matcher.parse(rule, input)?;
        let invoked = self.actions.apply(&mut tree);
        log::debug!("built JSON value from {rule} with {invoked} actions");
        actions::take_value(&mut tree).ok_or_else(|| JsonError::NoValue { rule: rule.into() })
    }
}

impl fmt::Debug for JsonParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonParser")
            .field("grammar", &self.grammar.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

static PARSER: OnceLock<JsonParser> = OnceLock::new();

/// Parse a JSON document with the standard grammar.
///
/// # Errors
///
/// [`JsonError::Parse`] when the input is not JSON.
pub fn parse_json(input: &str) -> Result<JsonValue, JsonError> {
    let parser = match PARSER.get() {
        Some(parser) => parser,
        None => {
            let parser = JsonParser::new()?;
            PARSER.get_or_init(|| parser)
        }
    };
    parser.parse(input)
}
