//! Print the match tree and the value of a JSON document.
//!
//! ```text
//! cargo run -p rulecraft_json --example json_ast -- '{"a": [1, true]}'
//! ```

use rulecraft::parser::Matcher;
use rulecraft::syntax::Match;
use rulecraft_json::grammar::{self, TOP};
use rulecraft_json::JsonParser;

fn main() {
    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| r#"{"name": "rulecraft", "tags": ["peg", "json"], "ok": true}"#.to_string());

    let grammar = grammar::commented().expect("valid grammar");
    match Matcher::new(&grammar).parse::<()>(TOP, &input) {
        Ok(tree) => print!("{}", Match::dump(&tree, &input)),
        Err(err) => {
            match err.failure() {
                Some(failure) => eprintln!("{}", failure.render(&input)),
                None => eprintln!("{err}"),
            }
            std::process::exit(1);
        }
    }

    let value = JsonParser::with_grammar(grammar)
        .parse(&input)
        .expect("input already matched");
    println!("{value}");
}
