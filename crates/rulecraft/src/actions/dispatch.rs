use crate::actions::Actions;
use crate::syntax::Match;

/// Run `actions` over a match tree, bottom-up.
///
/// Children are visited left to right in input order, named and positional
/// captures interleaved (see [`Match::children`]), each subtree before its
/// parent, so an action always sees its children's payloads. A node whose
/// `(rule, alt_tag)` has no action keeps its payload as is; anonymous nodes
/// are never dispatched but their children are.
///
/// Returns the number of actions invoked.
pub fn apply<P>(node: &mut Match<P>, actions: &Actions<P>) -> usize {
    let mut invoked = 0;
    for child in node.children_mut() {
        invoked += apply(child, actions);
    }

    let action = node
        .rule()
        .and_then(|rule| actions.get(rule, node.alt_tag()));
    if let Some(action) = action {
        log::trace!(
            "action {}{} on {}",
            node.rule().unwrap_or_default(),
            node.alt_tag().map(|t| format!(":sym<{t}>")).unwrap_or_default(),
            node.span()
        );
        let mut slot = node.take_payload();
        action(&*node, &mut slot);
        *node.payload_slot() = slot;
        invoked += 1;
    }
    invoked
}
