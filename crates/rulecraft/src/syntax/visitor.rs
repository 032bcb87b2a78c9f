use crate::syntax::Match;
use std::ops::ControlFlow;

/// Trait for visiting match trees
pub trait MatchVisitor<'m, P> {
    /// Called when entering a node (before visiting children)
    fn enter_node(&mut self, node: &'m Match<P>) -> ControlFlow<()> {
        let _ = node;
        ControlFlow::Continue(())
    }

    /// Called when exiting a node (after visiting children)
    fn exit_node(&mut self, node: &'m Match<P>) -> ControlFlow<()> {
        let _ = node;
        ControlFlow::Continue(())
    }
}

/// Walker that drives tree traversal and calls visitor methods
///
/// Children are visited in [`Match::children`] order.
pub struct MatchWalker<'v, V> {
    visitor: &'v mut V,
}

impl<'v, V> MatchWalker<'v, V> {
    pub const fn new(visitor: &'v mut V) -> Self {
        Self { visitor }
    }

    /// Walk the tree in pre-order (node before children)
    pub fn walk_preorder<'m, P>(&mut self, root: &'m Match<P>) -> ControlFlow<()>
    where
        V: MatchVisitor<'m, P>,
    {
        self.visitor.enter_node(root)?;
        for child in root.children() {
            self.walk_preorder(child)?;
        }
        self.visitor.exit_node(root)
    }

    /// Walk the tree in post-order (node after children)
    pub fn walk_postorder<'m, P>(&mut self, root: &'m Match<P>) -> ControlFlow<()>
    where
        V: MatchVisitor<'m, P>,
    {
        for child in root.children() {
            self.walk_postorder(child)?;
        }
        self.visitor.exit_node(root)
    }
}

/// Collects every node produced by one rule.
struct RuleCollector<'m, 'r, P> {
    rule: &'r str,
    found: Vec<&'m Match<P>>,
}

impl<'m, P> MatchVisitor<'m, P> for RuleCollector<'m, '_, P> {
    fn enter_node(&mut self, node: &'m Match<P>) -> ControlFlow<()> {
        if node.rule() == Some(self.rule) {
            self.found.push(node);
        }
        ControlFlow::Continue(())
    }
}

/// Stops at the first node covering an offset, innermost first.
struct InnermostAt<'m, P> {
    offset: usize,
    best: Option<&'m Match<P>>,
}

impl<'m, P> MatchVisitor<'m, P> for InnermostAt<'m, P> {
    fn enter_node(&mut self, node: &'m Match<P>) -> ControlFlow<()> {
        if node.span().contains(self.offset) {
            self.best = Some(node);
        }
        ControlFlow::Continue(())
    }
}

impl<P> Match<P> {
    /// Walk this node with a visitor, pre-order.
    pub fn walk_with<'m, V: MatchVisitor<'m, P>>(&'m self, visitor: &mut V) -> ControlFlow<()> {
        MatchWalker::new(visitor).walk_preorder(self)
    }

    /// Every node in the tree produced by `rule`, in pre-order.
    #[must_use]
    pub fn find_all<'m>(&'m self, rule: &str) -> Vec<&'m Self> {
        let mut collector = RuleCollector {
            rule,
            found: Vec::new(),
        };
        let _ = self.walk_with(&mut collector);
        collector.found
    }

    /// Deepest node whose span contains `offset`.
    #[must_use]
    pub fn node_at(&self, offset: usize) -> Option<&Self> {
        let mut finder = InnermostAt { offset, best: None };
        let _ = self.walk_with(&mut finder);
        finder.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    fn tree() -> Match {
        Match::new(Span::new(0, 5))
            .with_rule("a")
            .with_named(
                "b",
                Match::new(Span::new(0, 2))
                    .with_rule("b")
                    .with_named("d", Match::new(Span::new(0, 1)).with_rule("d")),
            )
            .with_named("c", Match::new(Span::new(3, 5)).with_rule("c"))
    }

    struct Order(Vec<String>);

    impl<'m> MatchVisitor<'m, ()> for Order {
        fn exit_node(&mut self, node: &'m Match) -> ControlFlow<()> {
            self.0.push(node.rule().unwrap_or("_").to_string());
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn test_walk_postorder_order() {
        let root = tree();
        let mut order = Order(Vec::new());
        let _ = MatchWalker::new(&mut order).walk_postorder(&root);
        assert_eq!(order.0, ["d", "b", "c", "a"]);
    }

    #[test]
    fn test_walk_can_stop_early() {
        struct StopAtB;
        impl<'m> MatchVisitor<'m, ()> for StopAtB {
            fn enter_node(&mut self, node: &'m Match) -> ControlFlow<()> {
                if node.rule() == Some("b") {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
        assert!(tree().walk_with(&mut StopAtB).is_break());
    }

    #[test]
    fn test_find_all() {
        let root = tree();
        assert_eq!(root.find_all("d").len(), 1);
        assert!(root.find_all("z").is_empty());
    }

    #[test]
    fn test_node_at() {
        let root = tree();
        assert_eq!(root.node_at(0).and_then(Match::rule), Some("d"));
        assert_eq!(root.node_at(4).and_then(Match::rule), Some("c"));
        assert_eq!(root.node_at(2).and_then(Match::rule), Some("a"));
        assert!(root.node_at(9).is_none());
    }
}
