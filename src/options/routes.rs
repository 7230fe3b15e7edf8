//! Route enumeration, filtering and resolution.

use super::node::{MessageNode, NodeView, OptionNode};
use super::value::{OptionValue, Route};
use crate::core::GameRng;

enum Pending<'a> {
    Node(&'a OptionNode, Route),
    Leaf(Route),
}

/// Lazy depth-first iterator over every root-to-leaf route.
///
/// Routes come out in branch order. Created by `OptionNode::all_routes`.
pub struct Routes<'a> {
    stack: Vec<Pending<'a>>,
}

impl Iterator for Routes<'_> {
    type Item = Route;

    fn next(&mut self) -> Option<Route> {
        loop {
            match self.stack.pop()? {
                Pending::Leaf(route) => return Some(route),
                Pending::Node(node, prefix) => match node.view() {
                    NodeView::Message(message) => {
                        for child in message.children().iter().rev() {
                            self.stack.push(Pending::Node(child, prefix.clone()));
                        }
                    }
                    NodeView::Choice(choice) => {
                        for index in (0..choice.len()).rev() {
                            let mut route = prefix.clone();
                            route.push(choice.value_at(index));
                            self.stack.push(match choice.next_at(index) {
                                Some(next) => Pending::Node(next, route),
                                None => Pending::Leaf(route),
                            });
                        }
                    }
                },
            }
        }
    }
}

impl OptionNode {
    /// Every complete route through this tree.
    ///
    /// The iterator borrows the tree; call again to enumerate again.
    #[must_use]
    pub fn all_routes(&self) -> Routes<'_> {
        Routes {
            stack: vec![Pending::Node(self, Route::new())],
        }
    }

    /// Number of complete routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        match self.view() {
            NodeView::Message(message) => message.children().iter().map(OptionNode::route_count).sum(),
            NodeView::Choice(choice) => (0..choice.len())
                .map(|i| choice.next_at(i).map_or(1, OptionNode::route_count))
                .sum(),
        }
    }

    /// Copy of this tree keeping only the routes `keep` accepts.
    ///
    /// Untouched subtrees keep their shape. Nodes left without options are
    /// dropped; when nothing survives the result is `OptionNode::empty()`.
    pub fn filter_routes(&self, mut keep: impl FnMut(&[OptionValue]) -> bool) -> OptionNode {
        let mut prefix = Route::new();
        filter_node(self, &mut prefix, &mut keep).unwrap_or_else(OptionNode::empty)
    }

    /// Length of the prefix of `route` that leads from this node to a route
    /// end, or `None` if no prefix does.
    ///
    /// Under a message node the first child that resolves a prefix wins.
    #[must_use]
    pub fn walk_prefix(&self, route: &[OptionValue]) -> Option<usize> {
        match self.view() {
            NodeView::Message(message) => message
                .children()
                .iter()
                .find_map(|child| child.walk_prefix(route)),
            NodeView::Choice(choice) => {
                let index = choice.position(route.first()?)?;
                match choice.next_at(index) {
                    None => Some(1),
                    Some(next) => next.walk_prefix(&route[1..]).map(|n| n + 1),
                }
            }
        }
    }

    /// Check if `route` is exactly one complete route of this tree.
    #[must_use]
    pub fn contains_route(&self, route: &[OptionValue]) -> bool {
        self.walk_prefix(route) == Some(route.len())
    }

    /// A uniformly chosen option at every level, root to leaf.
    ///
    /// `None` if the tree has no routes.
    pub fn sample_route(&self, rng: &mut GameRng) -> Option<Route> {
        let mut route = Route::new();
        let mut node = self;
        loop {
            match node.view() {
                NodeView::Message(message) => {
                    let live: Vec<_> = message.children().iter().filter(|c| c.route_count() > 0).collect();
                    node = rng.choose(&live).copied()?;
                }
                NodeView::Choice(choice) => {
                    if choice.len() == 0 {
                        return None;
                    }
                    let index = rng.gen_index(choice.len());
                    route.push(choice.value_at(index));
                    match choice.next_at(index) {
                        Some(next) => node = next,
                        None => return Some(route),
                    }
                }
            }
        }
    }
}

fn filter_node(
    node: &OptionNode,
    prefix: &mut Route,
    keep: &mut dyn FnMut(&[OptionValue]) -> bool,
) -> Option<OptionNode> {
    match node.view() {
        NodeView::Message(message) => {
            let children: Vec<_> = message
                .children()
                .iter()
                .filter_map(|child| filter_node(child, prefix, keep))
                .collect();
            (!children.is_empty()).then(|| OptionNode::Message(MessageNode::new(children)))
        }
        NodeView::Choice(choice) => {
            let rebuilt = choice.rebuild(&mut |index| {
                prefix.push(choice.value_at(index));
                let kept = match choice.next_at(index) {
                    None => keep(prefix).then_some(None),
                    Some(next) => filter_node(next, prefix, keep).map(Some),
                };
                prefix.pop();
                kept
            });
            (!rebuilt.is_empty()).then_some(rebuilt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Square;
    use crate::options::node::ChoiceNode;

    fn sq(file: i32, rank: i32) -> OptionValue {
        OptionValue::Square(Square::new(file, rank))
    }

    /// where? A1 -> (then? A2 | B2), B1 -> end
    fn sample_tree() -> OptionNode {
        let then = ChoiceNode::new("then?")
            .with(Square::new(1, 2), None)
            .with(Square::new(2, 2), None);
        ChoiceNode::new("where?")
            .with(Square::new(1, 1), Some(then.into()))
            .with(Square::new(2, 1), None)
            .into()
    }

    #[test]
    fn test_all_routes_order() {
        let routes: Vec<_> = sample_tree().all_routes().collect();
        assert_eq!(
            routes,
            vec![vec![sq(1, 1), sq(1, 2)], vec![sq(1, 1), sq(2, 2)], vec![sq(2, 1)]]
        );
        assert_eq!(sample_tree().route_count(), 3);
    }

    #[test]
    fn test_all_routes_is_recomputable() {
        let tree = sample_tree();
        let first: Vec<_> = tree.all_routes().collect();
        let second: Vec<_> = tree.all_routes().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_trees_have_no_routes() {
        assert_eq!(OptionNode::empty().all_routes().count(), 0);
        let empty_choice: OptionNode = ChoiceNode::<Square>::new("x").into();
        assert_eq!(empty_choice.all_routes().count(), 0);
    }

    #[test]
    fn test_filter_collapses_emptied_nodes() {
        let tree = sample_tree();
        let filtered = tree.filter_routes(|route| route.len() == 1);
        let routes: Vec<_> = filtered.all_routes().collect();
        assert_eq!(routes, vec![vec![sq(2, 1)]]);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_filter_keeps_shape() {
        let tree = sample_tree();
        assert_eq!(tree.filter_routes(|_| true), tree);

        let filtered = tree.filter_routes(|route| route.last() != Some(&sq(2, 2)));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.route_count(), 2);
    }

    #[test]
    fn test_filter_everything() {
        let filtered = sample_tree().filter_routes(|_| false);
        assert!(filtered.is_withheld());
    }

    #[test]
    fn test_filter_message_node() {
        let tree = OptionNode::Message(MessageNode::new(vec![
            ChoiceNode::new("a").with(Square::new(1, 1), None).into(),
            ChoiceNode::new("b").with(Square::new(2, 2), None).into(),
        ]));
        let filtered = tree.filter_routes(|route| route[0] == sq(2, 2));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.all_routes().collect::<Vec<_>>(), vec![vec![sq(2, 2)]]);
    }

    #[test]
    fn test_walk_prefix() {
        let tree = sample_tree();
        assert_eq!(tree.walk_prefix(&[sq(1, 1), sq(2, 2)]), Some(2));
        assert_eq!(tree.walk_prefix(&[sq(2, 1), sq(9, 9)]), Some(1));
        assert_eq!(tree.walk_prefix(&[sq(1, 1)]), None);
        assert_eq!(tree.walk_prefix(&[]), None);

        assert!(tree.contains_route(&[sq(1, 1), sq(1, 2)]));
        assert!(!tree.contains_route(&[sq(2, 1), sq(9, 9)]));
    }

    #[test]
    fn test_sample_route_is_a_route() {
        let tree = sample_tree();
        let mut rng = GameRng::new(3);
        for _ in 0..20 {
            let route = tree.sample_route(&mut rng).unwrap();
            assert!(tree.contains_route(&route));
        }
        assert_eq!(OptionNode::empty().sample_route(&mut rng), None);
    }
}
