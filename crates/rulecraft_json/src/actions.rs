//! Actions turning a JSON match tree into a [`JsonValue`]
//!
//! Every node produced by the grammar carries a [`JsonNode`] payload once
//! the actions have run. Leaves (`str`, `utf16_codepoint`, the scalar value
//! alternatives) read their matched text; containers assemble their
//! children's payloads. `value:sym<object>` and `value:sym<array>` have no
//! action of their own: their value is the payload of the wrapped
//! `object` / `array` node.

use crate::value::JsonValue;
use rulecraft::actions::Actions;
use rulecraft::syntax::Match;

/// Payload of one node of a JSON match tree.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    Value(JsonValue),
    /// Decoded string content (`string`, `str`, `str_escape`)
    Text(String),
    /// One UTF-16 code unit from a `\uXXXX` escape
    Unit(u16),
}

impl JsonNode {
    #[must_use]
    pub fn into_value(self) -> Option<JsonValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_value(&self) -> Option<&JsonValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Value of a `value`, `object` or `array` node.
pub fn value_of(node: &Match<JsonNode>) -> Option<&JsonValue> {
    match node.payload() {
        Some(payload) => payload.as_value(),
        None => node
            .one("object")
            .or_else(|| node.one("array"))
            .and_then(value_of),
    }
}

/// Move the value out of a reduced tree rooted at `TOP` or `value`.
pub fn take_value(node: &mut Match<JsonNode>) -> Option<JsonValue> {
    match node.take_payload() {
        Some(payload) => payload.into_value(),
        None => node.children_mut().find_map(take_value),
    }
}

/// Items captured under `item` by the list node captured under `list`.
fn list_items<'m>(node: &'m Match<JsonNode>, list: &str, item: &str) -> &'m [Match<JsonNode>] {
    node.one(list).map(|list| list.all(item)).unwrap_or_default()
}

fn text_of(node: Option<&Match<JsonNode>>) -> Option<&str> {
    node?.payload()?.as_text()
}

fn unescape(ch: char) -> Option<char> {
    Some(match ch {
        '"' => '"',
        '\\' => '\\',
        '/' => '/',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        _ => return None,
    })
}

fn scalar(value: JsonValue) -> impl Fn(&Match<JsonNode>, &mut Option<JsonNode>) + Send + Sync {
    move |_: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
        *slot = Some(JsonNode::Value(value.clone()));
    }
}

/// The action table for [`grammar`](crate::grammar::grammar) and the
/// grammars derived from it.
#[must_use]
pub fn actions() -> Actions<JsonNode> {
    Actions::new()
        .on_alt("value", "number", |m: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
            *slot = m
                .as_str()
                .parse()
                .ok()
                .map(|n| JsonNode::Value(JsonValue::Number(n)));
        })
        .on_alt("value", "true", scalar(JsonValue::Bool(true)))
        .on_alt("value", "false", scalar(JsonValue::Bool(false)))
        .on_alt("value", "null", scalar(JsonValue::Null))
        .on_alt("value", "nan", scalar(JsonValue::Number(f64::NAN)))
        .on_alt("value", "NaN", scalar(JsonValue::Number(f64::NAN)))
        .on_alt("value", "string", |m: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
            *slot = text_of(m.one("string"))
                .map(|text| JsonNode::Value(JsonValue::String(text.to_string())));
        })
        .on("object", |m: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
            let members: Option<Vec<_>> = list_items(m, "pairlist", "pair")
                .iter()
                .map(|pair| {
                    let key = text_of(pair.one("string"))?;
                    let value = pair.one("value").and_then(value_of)?;
                    Some((key.to_string(), value.clone()))
                })
                .collect();
            *slot = members.map(|members| JsonNode::Value(JsonValue::Object(members)));
        })
        .on("array", |m: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
            let items: Option<Vec<_>> = list_items(m, "arraylist", "value")
                .iter()
                .map(|item| value_of(item).cloned())
                .collect();
            *slot = items.map(|items| JsonNode::Value(JsonValue::Array(items)));
        })
        .on("string", |m: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
            let text: Option<String> = m
                .all("str")
                .iter()
                .map(|part| text_of(Some(part)))
                .collect();
            *slot = text.map(JsonNode::Text);
        })
        .on("str", |m: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
            *slot = Some(JsonNode::Text(m.as_str().to_string()));
        })
        .on("str_escape", |m: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
            let decoded = match m.as_str().chars().next() {
                Some('u') => {
                    let units: Option<Vec<u16>> = m
                        .all("utf16_codepoint")
                        .iter()
                        .map(|unit| match unit.payload() {
                            Some(JsonNode::Unit(unit)) => Some(*unit),
                            _ => None,
                        })
                        .collect();
                    units.map(|units| String::from_utf16_lossy(&units))
                }
                Some(ch) => unescape(ch).map(String::from),
                None => None,
            };
            *slot = decoded.map(JsonNode::Text);
        })
        .on("utf16_codepoint", |m: &Match<JsonNode>, slot: &mut Option<JsonNode>| {
            *slot = u16::from_str_radix(m.as_str(), 16).ok().map(JsonNode::Unit);
        })
}
