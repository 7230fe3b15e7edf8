//! Move groups and concrete moves.
//!
//! A `MoveGroup` collects every candidate move of one piece to one
//! destination produced by one motion. Its option tree (if any) enumerates
//! the follow-up choices; each route through the tree is one concrete
//! `Move`.
//!
//! | tree                  | moves                                    |
//! |-----------------------|------------------------------------------|
//! | none                  | one move, empty options, action offered   |
//! | empty message node    | one move, no options, action not offered  |
//! | anything else         | one move per route                        |

use std::fmt;
use std::sync::Arc;

use super::motion::{ActionFn, Motion};
use super::piece::PieceId;
use crate::core::{GameError, Square};
use crate::options::{OptionNode, OptionValue, Route};
use crate::state::State;

/// All candidate moves of one piece to one destination.
#[derive(Clone)]
pub struct MoveGroup {
    piece: PieceId,
    from: Square,
    to: Square,
    motion: String,
    action: Option<Arc<ActionFn>>,
    tree: Option<OptionNode>,
}

impl MoveGroup {
    /// Create a group for a move of `piece` from `from` to `to` by `motion`.
    #[must_use]
    pub fn new(piece: PieceId, from: Square, to: Square, motion: &Motion, tree: Option<OptionNode>) -> Self {
        Self {
            piece,
            from,
            to,
            motion: motion.name().to_string(),
            action: motion.action().cloned(),
            tree,
        }
    }

    /// The moving piece.
    #[must_use]
    pub fn piece(&self) -> PieceId {
        self.piece
    }

    /// Origin square.
    #[must_use]
    pub fn from(&self) -> Square {
        self.from
    }

    /// Destination square.
    #[must_use]
    pub fn to(&self) -> Square {
        self.to
    }

    /// Name of the motion that produced this group.
    #[must_use]
    pub fn motion(&self) -> &str {
        &self.motion
    }

    /// Follow-up choices, if any.
    #[must_use]
    pub fn tree(&self) -> Option<&OptionNode> {
        self.tree.as_ref()
    }

    /// The tree when it holds real choices (not absent, not "action withheld").
    #[must_use]
    pub fn choices(&self) -> Option<&OptionNode> {
        self.tree.as_ref().filter(|tree| !tree.is_withheld())
    }

    /// Build the concrete move for `options`.
    #[must_use]
    pub fn to_move(&self, options: Option<Route>) -> Move {
        Move {
            piece: self.piece,
            from: self.from,
            to: self.to,
            motion: self.motion.clone(),
            options,
            action: self.action.clone(),
        }
    }

    /// Every concrete move in this group.
    pub fn moves(&self) -> Vec<Move> {
        match &self.tree {
            None => vec![self.to_move(Some(Route::new()))],
            Some(tree) if tree.is_withheld() => vec![self.to_move(None)],
            Some(tree) => tree.all_routes().map(|route| self.to_move(Some(route))).collect(),
        }
    }

    /// Number of concrete moves.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.tree {
            Some(tree) if !tree.is_withheld() => tree.all_routes().count(),
            _ => 1,
        }
    }

    /// Check if the group holds no moves (a fully pruned tree).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The move selected by `options`, if `options` is a complete route.
    ///
    /// Groups without real choices accept only the empty route.
    #[must_use]
    pub fn move_for(&self, options: &[OptionValue]) -> Option<Move> {
        match &self.tree {
            None => options.is_empty().then(|| self.to_move(Some(Route::new()))),
            Some(tree) if tree.is_withheld() => options.is_empty().then(|| self.to_move(None)),
            Some(tree) => tree
                .contains_route(options)
                .then(|| self.to_move(Some(options.to_vec()))),
        }
    }

    /// Keep only the moves accepted by `keep`.
    ///
    /// Returns `None` when no move survives.
    pub fn filter_moves(&self, mut keep: impl FnMut(&Move) -> bool) -> Option<MoveGroup> {
        match &self.tree {
            Some(tree) if !tree.is_withheld() => {
                let filtered = tree.filter_routes(|route| keep(&self.to_move(Some(route.to_vec()))));
                (!filtered.is_empty()).then(|| MoveGroup {
                    tree: Some(filtered),
                    ..self.clone()
                })
            }
            _ => {
                let only = self.moves().into_iter().next()?;
                keep(&only).then(|| self.clone())
            }
        }
    }
}

impl fmt::Debug for MoveGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveGroup")
            .field("piece", &self.piece)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("motion", &self.motion)
            .field("tree", &self.tree)
            .finish()
    }
}

/// A concrete move: piece, origin, destination and resolved options.
#[derive(Clone)]
pub struct Move {
    piece: PieceId,
    from: Square,
    to: Square,
    motion: String,
    options: Option<Route>,
    action: Option<Arc<ActionFn>>,
}

impl Move {
    /// The moving piece.
    #[must_use]
    pub fn piece(&self) -> PieceId {
        self.piece
    }

    /// Origin square.
    #[must_use]
    pub fn from(&self) -> Square {
        self.from
    }

    /// Destination square.
    #[must_use]
    pub fn to(&self) -> Square {
        self.to
    }

    /// Name of the producing motion.
    #[must_use]
    pub fn motion(&self) -> &str {
        &self.motion
    }

    /// Resolved options; `None` when the action is not offered.
    #[must_use]
    pub fn options(&self) -> Option<&[OptionValue]> {
        self.options.as_deref()
    }

    /// Check if performing this move will run an action.
    #[must_use]
    pub fn runs_action(&self) -> bool {
        self.action.is_some() && self.options.is_some()
    }

    /// Relocate the piece, then run the action if it is offered.
    ///
    /// The two steps are not transactional: if the action fails the piece
    /// has already moved. Callers roll back through the turn journal.
    pub fn perform(&self, state: &mut State) -> Result<(), GameError> {
        state.board_mut().move_piece(self.piece, self.to)?;
        if let (Some(action), Some(options)) = (&self.action, &self.options) {
            action(state, self, options)?;
        }
        Ok(())
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.piece == other.piece
            && self.from == other.from
            && self.to == other.to
            && self.motion == other.motion
            && self.options == other.options
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Move")
            .field("piece", &self.piece)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("motion", &self.motion)
            .field("options", &self.options)
            .finish()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)?;
        if let Some(options) = self.options.as_ref().filter(|o| !o.is_empty()) {
            let names: Vec<_> = options.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", names.join(", "))?;
        }
        Ok(())
    }
}
