//! The JSON grammar and its derived variants
//!
//! ```text
//! grammar JSON {
//!     rule TOP        { ^ [ <object> | <array> ] $ }
//!     rule object     { '{' ~ '}' <pairlist> }
//!     rule pairlist   { <pair>* % ',' }
//!     rule pair       { <string> ':' <value> }
//!     rule array      { '[' ~ ']' <arraylist> }
//!     rule arraylist  { <value>* % ',' }
//!
//!     proto token value
//!     token value:sym<number> {
//!         '-'? [ '0' | <[1..9]> <[0..9]>* ]
//!         [ '.' <[0..9]>+ ]?
//!         [ <[eE]> <[+-]>? <[0..9]>+ ]?
//!     }
//!     token value:sym<true>   { <sym> }
//!     token value:sym<false>  { <sym> }
//!     token value:sym<null>   { <sym> }
//!     rule  value:sym<object> { <object> }
//!     rule  value:sym<array>  { <array> }
//!     token value:sym<string> { <string> }
//!
//!     token string          { '"' ~ '"' [ <str> | \\ <str=.str_escape> ]* }
//!     token str             { <-["\\\t\n]>+ }
//!     token str_escape      { <["\\/bfnrt]> | 'u' <utf16_codepoint>+ % '\u' }
//!     token utf16_codepoint { <.xdigit> ** 4 }
//!     token ws              { <space>* }
//! }
//! ```

use rulecraft::grammar::{CharClass, Expr, Grammar, GrammarBuilder, GrammarError};
use std::sync::{Arc, OnceLock};

/// Start rule of a JSON document.
pub const TOP: &str = "TOP";

/// Proto group holding every kind of JSON value.
pub const VALUE: &str = "value";

static BASE: OnceLock<Arc<Grammar>> = OnceLock::new();

/// The shared base `JSON` grammar.
///
/// # Errors
///
/// Only if the grammar definition itself is broken.
pub fn grammar() -> Result<Arc<Grammar>, GrammarError> {
    if let Some(grammar) = BASE.get() {
        return Ok(Arc::clone(grammar));
    }
    let built = build()?;
    Ok(Arc::clone(BASE.get_or_init(|| built)))
}

fn digits() -> Expr {
    Expr::plus(Expr::class(CharClass::digit()))
}

fn number() -> Expr {
    Expr::seq([
        Expr::opt(Expr::literal("-")),
        Expr::choice([
            Expr::literal("0"),
            Expr::seq([
                Expr::class(CharClass::range('1', '9')),
                Expr::star(Expr::class(CharClass::digit())),
            ]),
        ]),
        Expr::opt(Expr::seq([Expr::literal("."), digits()])),
        Expr::opt(Expr::seq([
            Expr::class(CharClass::any_of("eE")),
            Expr::opt(Expr::class(CharClass::any_of("+-"))),
            digits(),
        ])),
    ])
}

/// Build a fresh, unshared copy of the base grammar.
///
/// # Errors
///
/// Only if the grammar definition itself is broken.
pub fn build() -> Result<Arc<Grammar>, GrammarError> {
    GrammarBuilder::new("JSON")
        .rule(
            TOP,
            Expr::seq([
                Expr::start(),
                Expr::choice([Expr::call("object"), Expr::call("array")]),
                Expr::end(),
            ]),
        )
        .rule(
            "object",
            Expr::goal(Expr::literal("{"), Expr::literal("}"), Expr::call("pairlist")),
        )
        .rule("pairlist", Expr::separated(Expr::call("pair"), Expr::literal(","), 0))
        .rule(
            "pair",
            Expr::seq([Expr::call("string"), Expr::literal(":"), Expr::call(VALUE)]),
        )
        .rule(
            "array",
            Expr::goal(Expr::literal("["), Expr::literal("]"), Expr::call("arraylist")),
        )
        .rule("arraylist", Expr::separated(Expr::call(VALUE), Expr::literal(","), 0))
        .proto(VALUE)
        .token_alt(VALUE, "number", number())
        .token_alt(VALUE, "true", Expr::sym())
        .token_alt(VALUE, "false", Expr::sym())
        .token_alt(VALUE, "null", Expr::sym())
        .rule_alt(VALUE, "object", Expr::call("object"))
        .rule_alt(VALUE, "array", Expr::call("array"))
        .token_alt(VALUE, "string", Expr::call("string"))
        .token(
            "string",
            Expr::goal(
                Expr::literal("\""),
                Expr::literal("\""),
                Expr::star(Expr::choice([
                    Expr::call("str"),
                    Expr::seq([Expr::literal("\\"), Expr::call_as("str", "str_escape")]),
                ])),
            ),
        )
        .token("str", Expr::plus(Expr::class(CharClass::none_of("\"\\\t\n"))))
        .token(
            "str_escape",
            Expr::choice([
                Expr::class(CharClass::any_of("\"\\/bfnrt")),
                Expr::seq([
                    Expr::literal("u"),
                    Expr::separated(Expr::call("utf16_codepoint"), Expr::literal("\\u"), 1),
                ]),
            ]),
        )
        .token(
            "utf16_codepoint",
            Expr::exactly(Expr::class(CharClass::xdigit()), 4),
        )
        .token("ws", Expr::star(Expr::class(CharClass::space())))
        .build_shared()
}

/// `JSON` with `// ...` line comments allowed wherever whitespace is.
///
/// ```text
/// grammar JSON::Commented is JSON {
///     token ws { [ <space>+ | '//' \N* ]* }
/// }
/// ```
///
/// # Errors
///
/// Only if the grammar definition itself is broken.
pub fn commented() -> Result<Arc<Grammar>, GrammarError> {
    GrammarBuilder::derive("JSON::Commented", &grammar()?)
        .token(
            "ws",
            Expr::star(Expr::choice([
                Expr::plus(Expr::class(CharClass::space())),
                Expr::seq([
                    Expr::literal("//"),
                    Expr::star(Expr::class(CharClass::none_of("\n"))),
                ]),
            ])),
        )
        .build_shared()
}

/// `JSON` accepting the bare literals `nan` and `NaN` as values.
///
/// # Errors
///
/// Only if the grammar definition itself is broken.
pub fn with_nan() -> Result<Arc<Grammar>, GrammarError> {
    GrammarBuilder::derive("JSON::NaN", &grammar()?)
        .token_alt(VALUE, "nan", Expr::sym())
        .token_alt(VALUE, "NaN", Expr::sym())
        .build_shared()
}
