//! Helpers for human-readable failure reports.

use crate::syntax::LineIndex;
use std::fmt::Write as _;

/// Suggest the closest candidate to a misspelled name.
///
/// Comparison is case-insensitive; candidates below 60% similarity are
/// ignored.
///
/// ```rust
/// use rulecraft::error::diagnostics::did_you_mean;
///
/// let rules = ["pairlist", "pair", "value"];
/// assert_eq!(did_you_mean("pairlst", rules), Some("pairlist"));
/// ```
pub fn did_you_mean<'c, I>(actual: &str, candidates: I) -> Option<&'c str>
where
    I: IntoIterator<Item = &'c str>,
{
    let actual_lower = actual.to_lowercase();
    let threshold = 0.6;
    let mut best_match: Option<(&str, f64)> = None;

    for candidate in candidates {
        let similarity = string_similarity(&actual_lower, &candidate.to_lowercase());
        if similarity >= threshold {
            match best_match {
                None => best_match = Some((candidate, similarity)),
                Some((_, best_sim)) if similarity > best_sim => {
                    best_match = Some((candidate, similarity));
                }
                _ => {}
            }
        }
    }

    best_match.map(|(suggestion, _)| suggestion)
}

/// Join expected items as `a`, `a or b`, `a, b, or c`.
#[must_use]
pub fn format_expected_list(expected: &[String]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => {
            let mut result = init.join(", ");
            result.push_str(", or ");
            result.push_str(last);
            result
        }
    }
}

/// Source line containing `offset` with a caret under the column.
///
/// ```text
///  --> 1:8
///   |
/// 1 | {"a":1,}
///   |        ^
/// ```
#[must_use]
pub fn caret_snippet(source: &str, offset: usize) -> String {
    let index = LineIndex::new(source);
    let pos = index.line_col(offset);
    let line_no = (pos.line + 1).to_string();
    let gutter = " ".repeat(line_no.len());
    let text = index.line_text(pos.line).unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "{gutter}--> {pos}");
    let _ = writeln!(out, "{gutter} |");
    let _ = writeln!(out, "{line_no} | {text}");
    let _ = write!(out, "{gutter} | {:pad$}^", "", pad = pos.column);
    out
}

/// Similarity in `[0.0, 1.0]` derived from the Levenshtein distance.
#[allow(clippy::cast_precision_loss)]
fn string_similarity(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let distance = levenshtein_distance(s1, s2);
    let max_len = s1.chars().count().max(s2.chars().count());
    1.0 - (distance as f64 / max_len as f64)
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s2_chars: Vec<char> = s2.chars().collect();
    let mut prev: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut curr = vec![0; s2_chars.len() + 1];

    for (i, c1) in s1.chars().enumerate() {
        curr[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = usize::from(c1 != *c2);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[s2_chars.len()]
}
