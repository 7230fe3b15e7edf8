//! Option tree nodes.
//!
//! An `OptionNode` is one of:
//!
//! - a choice node of one of the four option kinds: a prompt plus branches,
//!   each branch an option value with an optional subtree;
//! - a `MessageNode`: a branch point grouping several prompts.
//!
//! A branch without a subtree ends a route. An empty `MessageNode` is the
//! explicit "nothing to choose, action withheld" marker.
//!
//! Consumers dispatch on the node kind with `OptionVisitor`; the tree
//! algorithms in this module go through the kind-erased `ChoiceView`.

use std::fmt;
use std::sync::Arc;

use super::value::{MoveOption, OptionItem, OptionKey, OptionKind, OptionValue};
use crate::core::Square;
use crate::pieces::PieceType;

/// An option and what follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch<T> {
    pub option: T,
    pub next: Option<Box<OptionNode>>,
}

/// A prompt with typed branches.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceNode<T> {
    message: String,
    branches: Vec<Branch<T>>,
}

impl<T: OptionItem> ChoiceNode<T> {
    /// Create a node with no branches.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            branches: Vec::new(),
        }
    }

    /// Add a branch. A sibling with the same key wins; returns false then.
    pub fn push(&mut self, option: T, next: Option<OptionNode>) -> bool {
        let key = option.key();
        if self.branches.iter().any(|b| b.option.key() == key) {
            return false;
        }
        self.branches.push(Branch {
            option,
            next: next.map(Box::new),
        });
        true
    }

    /// Builder form of `push`.
    #[must_use]
    pub fn with(mut self, option: T, next: Option<OptionNode>) -> Self {
        self.push(option, next);
        self
    }

    /// Absorb the branches of another node, keeping first occurrences.
    pub fn absorb(&mut self, other: ChoiceNode<T>) {
        for branch in other.branches {
            self.push(branch.option, branch.next.map(|n| *n));
        }
    }

    /// The prompt.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Branches in insertion order.
    #[must_use]
    pub fn branches(&self) -> &[Branch<T>] {
        &self.branches
    }

    /// Option values in branch order.
    pub fn options(&self) -> impl Iterator<Item = &T> {
        self.branches.iter().map(|b| &b.option)
    }
}

/// A branch point grouping several prompts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageNode {
    children: Vec<OptionNode>,
}

impl MessageNode {
    /// Group `children`.
    #[must_use]
    pub fn new(children: Vec<OptionNode>) -> Self {
        Self { children }
    }

    /// Grouped nodes.
    #[must_use]
    pub fn children(&self) -> &[OptionNode] {
        &self.children
    }
}

/// A node of an option tree.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionNode {
    PieceType(ChoiceNode<Arc<PieceType>>),
    Square(ChoiceNode<Square>),
    Move(ChoiceNode<MoveOption>),
    Unit(ChoiceNode<()>),
    Message(MessageNode),
}

/// Kind-based dispatch over option nodes.
pub trait OptionVisitor {
    type Output;

    fn visit_piece_type(&mut self, node: &ChoiceNode<Arc<PieceType>>) -> Self::Output;
    fn visit_square(&mut self, node: &ChoiceNode<Square>) -> Self::Output;
    fn visit_move(&mut self, node: &ChoiceNode<MoveOption>) -> Self::Output;
    fn visit_unit(&mut self, node: &ChoiceNode<()>) -> Self::Output;
    fn visit_message(&mut self, node: &MessageNode) -> Self::Output;
}

/// Kind-erased access to a choice node.
pub(crate) trait ChoiceView {
    fn message(&self) -> &str;
    fn kind(&self) -> OptionKind;
    fn len(&self) -> usize;
    fn value_at(&self, index: usize) -> OptionValue;
    fn next_at(&self, index: usize) -> Option<&OptionNode>;
    fn position(&self, value: &OptionValue) -> Option<usize>;
    /// Rebuild a node of the same kind. For each branch index `f` returns
    /// `None` to drop it or `Some(next)` to keep it with a new subtree.
    fn rebuild(&self, f: &mut dyn FnMut(usize) -> Option<Option<OptionNode>>) -> OptionNode;
}

/// Wraps a typed choice node back into an `OptionNode`.
pub(crate) trait IntoOptionNode: OptionItem {
    fn wrap(node: ChoiceNode<Self>) -> OptionNode;
}

impl IntoOptionNode for Arc<PieceType> {
    fn wrap(node: ChoiceNode<Self>) -> OptionNode {
        OptionNode::PieceType(node)
    }
}

impl IntoOptionNode for Square {
    fn wrap(node: ChoiceNode<Self>) -> OptionNode {
        OptionNode::Square(node)
    }
}

impl IntoOptionNode for MoveOption {
    fn wrap(node: ChoiceNode<Self>) -> OptionNode {
        OptionNode::Move(node)
    }
}

impl IntoOptionNode for () {
    fn wrap(node: ChoiceNode<Self>) -> OptionNode {
        OptionNode::Unit(node)
    }
}

impl<T: IntoOptionNode> ChoiceView for ChoiceNode<T> {
    fn message(&self) -> &str {
        &self.message
    }

    fn kind(&self) -> OptionKind {
        T::KIND
    }

    fn len(&self) -> usize {
        self.branches.len()
    }

    fn value_at(&self, index: usize) -> OptionValue {
        self.branches[index].option.to_value()
    }

    fn next_at(&self, index: usize) -> Option<&OptionNode> {
        self.branches[index].next.as_deref()
    }

    fn position(&self, value: &OptionValue) -> Option<usize> {
        if value.kind() != T::KIND {
            return None;
        }
        let key: OptionKey = value.key();
        self.branches.iter().position(|b| b.option.key() == key)
    }

    fn rebuild(&self, f: &mut dyn FnMut(usize) -> Option<Option<OptionNode>>) -> OptionNode {
        let mut node = ChoiceNode::new(self.message.clone());
        for (index, branch) in self.branches.iter().enumerate() {
            if let Some(next) = f(index) {
                node.branches.push(Branch {
                    option: branch.option.clone(),
                    next: next.map(Box::new),
                });
            }
        }
        T::wrap(node)
    }
}

pub(crate) enum NodeView<'a> {
    Choice(&'a dyn ChoiceView),
    Message(&'a MessageNode),
}

impl OptionNode {
    /// The empty message node: nothing to choose, action withheld.
    #[must_use]
    pub fn empty() -> Self {
        OptionNode::Message(MessageNode::default())
    }

    pub(crate) fn view(&self) -> NodeView<'_> {
        match self {
            OptionNode::PieceType(node) => NodeView::Choice(node),
            OptionNode::Square(node) => NodeView::Choice(node),
            OptionNode::Move(node) => NodeView::Choice(node),
            OptionNode::Unit(node) => NodeView::Choice(node),
            OptionNode::Message(node) => NodeView::Message(node),
        }
    }

    /// Dispatch to the visitor method for this node's kind.
    pub fn accept<V: OptionVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            OptionNode::PieceType(node) => visitor.visit_piece_type(node),
            OptionNode::Square(node) => visitor.visit_square(node),
            OptionNode::Move(node) => visitor.visit_move(node),
            OptionNode::Unit(node) => visitor.visit_unit(node),
            OptionNode::Message(node) => visitor.visit_message(node),
        }
    }

    /// Branching factor: options of a choice node, children of a message node.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.view() {
            NodeView::Choice(node) => node.len(),
            NodeView::Message(node) => node.children.len(),
        }
    }

    /// Check if there is nothing to pick at this node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this is the "action withheld" marker (an empty message node).
    #[must_use]
    pub fn is_withheld(&self) -> bool {
        matches!(self, OptionNode::Message(node) if node.children.is_empty())
    }

    /// Option kind of a choice node, `None` for message nodes.
    #[must_use]
    pub fn kind(&self) -> Option<OptionKind> {
        match self.view() {
            NodeView::Choice(node) => Some(node.kind()),
            NodeView::Message(_) => None,
        }
    }

    /// Prompt of a choice node, `None` for message nodes.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self.view() {
            NodeView::Choice(node) => Some(node.message()),
            NodeView::Message(_) => None,
        }
    }

    /// Option values offered directly at this node (message nodes: none).
    #[must_use]
    pub fn options(&self) -> Vec<OptionValue> {
        match self.view() {
            NodeView::Choice(node) => (0..node.len()).map(|i| node.value_at(i)).collect(),
            NodeView::Message(_) => Vec::new(),
        }
    }

    /// The subtree reached by picking `value` here.
    ///
    /// `Some(None)` means `value` ends the route; `None` means it is not offered.
    #[must_use]
    pub fn child(&self, value: &OptionValue) -> Option<Option<&OptionNode>> {
        match self.view() {
            NodeView::Choice(node) => node.position(value).map(|i| node.next_at(i)),
            NodeView::Message(node) => node.children.iter().find_map(|c| c.child(value)),
        }
    }

    /// Merge a same-kind, same-prompt node into this one.
    ///
    /// Hands `other` back when the nodes are not compatible.
    pub fn merge(&mut self, other: OptionNode) -> Result<(), OptionNode> {
        match (self, other) {
            (OptionNode::PieceType(a), OptionNode::PieceType(b)) if a.message == b.message => a.absorb(b),
            (OptionNode::Square(a), OptionNode::Square(b)) if a.message == b.message => a.absorb(b),
            (OptionNode::Move(a), OptionNode::Move(b)) if a.message == b.message => a.absorb(b),
            (OptionNode::Unit(a), OptionNode::Unit(b)) if a.message == b.message => a.absorb(b),
            (_, other) => return Err(other),
        }
        Ok(())
    }

    /// Append `tail` below every route end of this tree.
    #[must_use]
    pub fn graft(&self, tail: &OptionNode) -> OptionNode {
        match self.view() {
            NodeView::Choice(node) => node.rebuild(&mut |i| {
                Some(Some(match node.next_at(i) {
                    Some(next) => next.graft(tail),
                    None => tail.clone(),
                }))
            }),
            NodeView::Message(node) => OptionNode::Message(MessageNode::new(
                node.children.iter().map(|c| c.graft(tail)).collect(),
            )),
        }
    }
}

impl From<MessageNode> for OptionNode {
    fn from(node: MessageNode) -> Self {
        OptionNode::Message(node)
    }
}

impl From<ChoiceNode<Square>> for OptionNode {
    fn from(node: ChoiceNode<Square>) -> Self {
        OptionNode::Square(node)
    }
}

impl From<ChoiceNode<Arc<PieceType>>> for OptionNode {
    fn from(node: ChoiceNode<Arc<PieceType>>) -> Self {
        OptionNode::PieceType(node)
    }
}

impl From<ChoiceNode<MoveOption>> for OptionNode {
    fn from(node: ChoiceNode<MoveOption>) -> Self {
        OptionNode::Move(node)
    }
}

impl From<ChoiceNode<()>> for OptionNode {
    fn from(node: ChoiceNode<()>) -> Self {
        OptionNode::Unit(node)
    }
}

/// Renders a tree as indented lines.
struct Printer<'f, 'a> {
    out: &'f mut fmt::Formatter<'a>,
    depth: usize,
}

impl Printer<'_, '_> {
    fn choice<T: OptionItem>(&mut self, node: &ChoiceNode<T>) -> fmt::Result {
        let indent = "  ".repeat(self.depth);
        writeln!(self.out, "{indent}{} ({})", node.message, T::KIND)?;
        for branch in &node.branches {
            writeln!(self.out, "{indent}- {}", branch.option.to_value())?;
            if let Some(next) = &branch.next {
                self.depth += 1;
                next.accept(self)?;
                self.depth -= 1;
            }
        }
        Ok(())
    }
}

impl OptionVisitor for Printer<'_, '_> {
    type Output = fmt::Result;

    fn visit_piece_type(&mut self, node: &ChoiceNode<Arc<PieceType>>) -> fmt::Result {
        self.choice(node)
    }

    fn visit_square(&mut self, node: &ChoiceNode<Square>) -> fmt::Result {
        self.choice(node)
    }

    fn visit_move(&mut self, node: &ChoiceNode<MoveOption>) -> fmt::Result {
        self.choice(node)
    }

    fn visit_unit(&mut self, node: &ChoiceNode<()>) -> fmt::Result {
        self.choice(node)
    }

    fn visit_message(&mut self, node: &MessageNode) -> fmt::Result {
        if node.children.is_empty() {
            return writeln!(self.out, "{}(nothing to choose)", "  ".repeat(self.depth));
        }
        for child in &node.children {
            child.accept(self)?;
        }
        Ok(())
    }
}

impl fmt::Display for OptionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.accept(&mut Printer { out: f, depth: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squares(message: &str, files: &[i32]) -> ChoiceNode<Square> {
        let mut node = ChoiceNode::new(message);
        for &file in files {
            node.push(Square::new(file, 1), None);
        }
        node
    }

    #[test]
    fn test_push_dedups_by_key() {
        let mut node: ChoiceNode<Square> = ChoiceNode::new("where?");
        assert!(node.push(Square::new(1, 1), None));
        assert!(!node.push(Square::new(1, 1), Some(OptionNode::empty())));
        assert_eq!(node.branches().len(), 1);
        assert!(node.branches()[0].next.is_none());
    }

    #[test]
    fn test_len_and_withheld() {
        assert_eq!(OptionNode::empty().len(), 0);
        assert!(OptionNode::empty().is_withheld());

        let node = OptionNode::from(squares("where?", &[1, 2, 3]));
        assert_eq!(node.len(), 3);
        assert!(!node.is_withheld());
        assert_eq!(node.kind(), Some(OptionKind::Square));
        assert_eq!(node.message(), Some("where?"));

        let empty_choice = OptionNode::from(squares("where?", &[]));
        assert!(empty_choice.is_empty());
        assert!(!empty_choice.is_withheld());
    }

    #[test]
    fn test_merge() {
        let mut a = OptionNode::from(squares("where?", &[1, 2]));
        a.merge(OptionNode::from(squares("where?", &[2, 3]))).unwrap();
        assert_eq!(a.len(), 3);

        let other = OptionNode::from(squares("elsewhere?", &[4]));
        assert!(a.merge(other).is_err());
        assert!(a.merge(OptionNode::Unit(ChoiceNode::new("where?"))).is_err());
    }

    #[test]
    fn test_child_lookup() {
        let inner = OptionNode::from(squares("then?", &[5]));
        let node = OptionNode::from(
            ChoiceNode::new("first?")
                .with(Square::new(1, 1), Some(inner.clone()))
                .with(Square::new(2, 1), None),
        );

        assert_eq!(node.child(&Square::new(1, 1).into()), Some(Some(&inner)));
        assert_eq!(node.child(&Square::new(2, 1).into()), Some(None));
        assert_eq!(node.child(&Square::new(3, 1).into()), None);
        assert_eq!(node.child(&OptionValue::Unit), None);
    }

    #[test]
    fn test_graft() {
        let tail = OptionNode::Unit(ChoiceNode::new("confirm").with((), None));
        let node = OptionNode::from(squares("where?", &[1, 2])).graft(&tail);
        for value in node.options() {
            assert_eq!(node.child(&value), Some(Some(&tail)));
        }
    }

    struct KindCounter {
        squares: usize,
        messages: usize,
    }

    impl OptionVisitor for KindCounter {
        type Output = ();

        fn visit_piece_type(&mut self, _: &ChoiceNode<Arc<PieceType>>) {}

        fn visit_square(&mut self, _: &ChoiceNode<Square>) {
            self.squares += 1;
        }

        fn visit_move(&mut self, _: &ChoiceNode<MoveOption>) {}

        fn visit_unit(&mut self, _: &ChoiceNode<()>) {}

        fn visit_message(&mut self, node: &MessageNode) {
            self.messages += 1;
            for child in node.children() {
                child.accept(self);
            }
        }
    }

    #[test]
    fn test_visitor_dispatch() {
        let tree = OptionNode::Message(MessageNode::new(vec![
            squares("a", &[1]).into(),
            squares("b", &[2]).into(),
        ]));
        let mut counter = KindCounter { squares: 0, messages: 0 };
        tree.accept(&mut counter);
        assert_eq!(counter.squares, 2);
        assert_eq!(counter.messages, 1);
    }

    #[test]
    fn test_display() {
        let node = OptionNode::from(
            ChoiceNode::new("where?")
                .with(Square::new(1, 1), Some(OptionNode::Unit(ChoiceNode::new("sure?").with((), None))))
                .with(Square::new(2, 1), None),
        );
        assert_eq!(
            node.to_string(),
            "where? (square)\n- A1\n  sure? (unit)\n  - ok\n- B1\n"
        );
    }
}
