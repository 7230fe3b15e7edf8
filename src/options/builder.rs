//! Building option trees from choice seeds.
//!
//! Two entry points:
//!
//! - `OptionNode::from_generators`: an ordered chain of generators, each
//!   seeing the options chosen so far. Used for a motion's follow-up choices.
//! - `OptionNode::from_choice`: one `Choice` with nested `next` choices,
//!   expanding `ChoiceKind::Move` against a list of move groups. Used for
//!   the first-level turn decision.
//!
//! Every option fans out to the subtree of what comes after it: the
//! choice's own `next` choices if it has any, otherwise the rest of the
//! generator chain. A generator returning `None` prunes the path; an option
//! whose subtree has nothing left to pick is dropped.

use log::warn;

use super::choice::{Choice, ChoiceKind};
use super::node::{ChoiceNode, IntoOptionNode, MessageNode, OptionNode};
use super::value::{MoveOption, OptionValue, Route};
use crate::pieces::MoveGroup;

enum Built {
    /// Nothing follows: the route ends here.
    Terminal,
    /// Something follows.
    Node(OptionNode),
    /// The path cannot be completed.
    Pruned,
}

type NoGenerator = fn(&[OptionValue]) -> Option<Choice>;

struct TreeBuilder<'a> {
    moves: &'a [MoveGroup],
}

impl TreeBuilder<'_> {
    fn chain<G>(&self, chosen: &mut Route, generators: &[G]) -> Built
    where
        G: Fn(&[OptionValue]) -> Option<Choice>,
    {
        let Some((first, rest)) = generators.split_first() else {
            return Built::Terminal;
        };
        match first(chosen.as_slice()) {
            None => Built::Pruned,
            Some(choice) => live(self.choice(&choice, chosen, rest)),
        }
    }

    fn choice<G>(&self, choice: &Choice, chosen: &mut Route, rest: &[G]) -> OptionNode
    where
        G: Fn(&[OptionValue]) -> Option<Choice>,
    {
        let message = choice.message.as_str();
        match &choice.kind {
            ChoiceKind::PieceType(types) => {
                self.fan_out(message, types.iter().cloned(), choice, chosen, rest, |_| None)
            }
            ChoiceKind::Square(squares) => {
                self.fan_out(message, squares.iter().copied(), choice, chosen, rest, |_| None)
            }
            ChoiceKind::Unit => self.fan_out(message, [()], choice, chosen, rest, |_| None),
            ChoiceKind::Move => {
                if self.moves.is_empty() {
                    warn!("move choice {message:?} has no moves to offer");
                }
                let options = self.moves.iter().map(|group| MoveOption {
                    piece: group.piece(),
                    from: group.from(),
                    to: group.to(),
                });
                self.fan_out(message, options, choice, chosen, rest, |index| {
                    self.moves[index].choices()
                })
            }
        }
    }

    /// One branch per option; `prefix(i)` is a subtree that must be walked
    /// before whatever follows option `i`.
    fn fan_out<'t, T, G>(
        &'t self,
        message: &str,
        options: impl IntoIterator<Item = T>,
        choice: &Choice,
        chosen: &mut Route,
        rest: &[G],
        prefix: impl Fn(usize) -> Option<&'t OptionNode>,
    ) -> OptionNode
    where
        T: IntoOptionNode,
        G: Fn(&[OptionValue]) -> Option<Choice>,
    {
        let mut node = ChoiceNode::new(message);
        for (index, option) in options.into_iter().enumerate() {
            chosen.push(option.to_value());
            let after = self.after(choice, chosen, rest);
            chosen.pop();

            let next = match (prefix(index), after) {
                (_, Built::Pruned) => continue,
                (None, Built::Terminal) => None,
                (None, Built::Node(tail)) => Some(tail),
                (Some(head), Built::Terminal) => Some(head.clone()),
                (Some(head), Built::Node(tail)) => Some(head.graft(&tail)),
            };
            node.push(option, next);
        }
        T::wrap(node)
    }

    fn after<G>(&self, choice: &Choice, chosen: &mut Route, rest: &[G]) -> Built
    where
        G: Fn(&[OptionValue]) -> Option<Choice>,
    {
        if choice.next.is_empty() {
            return self.chain(chosen, rest);
        }
        let mut grouped: Vec<OptionNode> = Vec::new();
        for next in &choice.next {
            let node = self.choice(next, chosen, rest);
            if node.is_empty() {
                continue;
            }
            merge_into(&mut grouped, node);
        }
        match grouped.len() {
            0 => Built::Pruned,
            1 => grouped.pop().map_or(Built::Pruned, Built::Node),
            _ => Built::Node(OptionNode::Message(MessageNode::new(grouped))),
        }
    }
}

fn live(node: OptionNode) -> Built {
    if node.is_empty() {
        Built::Pruned
    } else {
        Built::Node(node)
    }
}

/// Same-prompt, same-kind siblings share one node.
fn merge_into(grouped: &mut Vec<OptionNode>, node: OptionNode) {
    let mut pending = node;
    for existing in grouped.iter_mut() {
        match existing.merge(pending) {
            Ok(()) => return,
            Err(back) => pending = back,
        }
    }
    grouped.push(pending);
}

impl OptionNode {
    /// Build the tree for an ordered chain of choice generators.
    ///
    /// Returns `None` for an empty chain (no choices at all). A first
    /// generator returning `None` gives `OptionNode::empty()`: the action is
    /// withheld. A first choice whose options all get pruned gives a choice
    /// node with no options: no move survives.
    pub fn from_generators<G>(generators: &[G]) -> Option<OptionNode>
    where
        G: Fn(&[OptionValue]) -> Option<Choice>,
    {
        let (first, rest) = generators.split_first()?;
        let builder = TreeBuilder { moves: &[] };
        let mut chosen = Route::new();
        Some(match first(chosen.as_slice()) {
            None => OptionNode::empty(),
            Some(choice) => builder.choice(&choice, &mut chosen, rest),
        })
    }

    /// Build the tree for `choice`, offering `moves` wherever it asks for a move.
    ///
    /// A move option continues with its group's own choices, then with
    /// whatever `choice` asks next.
    #[must_use]
    pub fn from_choice(choice: &Choice, moves: &[MoveGroup]) -> OptionNode {
        let builder = TreeBuilder { moves };
        let none: &[NoGenerator] = &[];
        builder.choice(choice, &mut Route::new(), none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Square;
    use crate::options::value::OptionKind;
    use crate::pieces::PieceType;
    use std::sync::Arc;

    type Gen = Box<dyn Fn(&[OptionValue]) -> Option<Choice>>;

    fn boxed(f: impl Fn(&[OptionValue]) -> Option<Choice> + 'static) -> Gen {
        Box::new(f)
    }

    fn squares(message: &str, files: &[i32]) -> Choice {
        Choice::square(message, files.iter().map(|&f| Square::new(f, 1)).collect())
    }

    #[test]
    fn test_empty_chain() {
        let none: &[NoGenerator] = &[];
        assert_eq!(OptionNode::from_generators(none), None);
    }

    #[test]
    fn test_nil_first_generator_withholds() {
        let generators = [boxed(|_| None)];
        let tree = OptionNode::from_generators(&generators).unwrap();
        assert!(tree.is_withheld());
    }

    #[test]
    fn test_chain_fans_out() {
        let generators = vec![
            boxed(|_| Some(squares("first", &[1, 2]))),
            boxed(|_| Some(squares("second", &[3, 4, 5]))),
        ];
        let tree = OptionNode::from_generators(&generators).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.route_count(), 6);
        assert!(tree.all_routes().all(|r| r.len() == 2));
    }

    #[test]
    fn test_generators_see_prior_choices() {
        let generators = vec![
            boxed(|_| Some(squares("first", &[1, 2]))),
            boxed(|chosen| {
                // Only B1 leads anywhere.
                (chosen[0] == OptionValue::Square(Square::new(2, 1)))
                    .then(|| squares("second", &[7]))
            }),
        ];
        let tree = OptionNode::from_generators(&generators).unwrap();
        let routes: Vec<_> = tree.all_routes().collect();
        assert_eq!(
            routes,
            vec![vec![Square::new(2, 1).into(), Square::new(7, 1).into()]]
        );
    }

    #[test]
    fn test_all_options_pruned_leaves_empty_choice() {
        let generators = vec![
            boxed(|_| Some(squares("first", &[1, 2]))),
            boxed(|_| None),
        ];
        let tree = OptionNode::from_generators(&generators).unwrap();
        assert!(tree.is_empty());
        assert!(!tree.is_withheld());
        assert_eq!(tree.kind(), Some(OptionKind::Square));
    }

    #[test]
    fn test_duplicate_options_keep_first() {
        let generators = [boxed(|_| Some(squares("where", &[1, 1, 2])))];
        let tree = OptionNode::from_generators(&generators).unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_next_choices_grouped_by_prompt() {
        let queen = Arc::new(PieceType::new("queen"));
        let rook = Arc::new(PieceType::new("rook"));
        let choice = Choice::unit("go")
            .then(Choice::piece_type("promote", vec![queen.clone()]))
            .then(Choice::piece_type("promote", vec![rook, queen]))
            .then(squares("drop", &[1]));

        let tree = OptionNode::from_choice(&choice, &[]);
        assert_eq!(tree.kind(), Some(OptionKind::Unit));

        let Some(Some(after)) = tree.child(&OptionValue::Unit) else {
            panic!("unit option should lead somewhere");
        };
        assert!(matches!(after, OptionNode::Message(_)));
        assert_eq!(after.len(), 2);
        assert_eq!(tree.route_count(), 3);
    }

    #[test]
    fn test_move_choice_without_moves_is_empty() {
        let tree = OptionNode::from_choice(&Choice::moves("move"), &[]);
        assert!(tree.is_empty());
        assert_eq!(tree.kind(), Some(OptionKind::Move));
    }
}
