//! Choice seeds.
//!
//! A `Choice` is what rule callbacks return to ask for a decision: a prompt,
//! the kind of thing to pick (with its candidates), and optionally further
//! choices to ask after each pick. The option-tree builder expands choices
//! into an `OptionNode` tree.

use std::sync::Arc;

use crate::core::Square;
use crate::pieces::PieceType;

/// What a choice asks the player to pick.
#[derive(Clone, Debug)]
pub enum ChoiceKind {
    /// One of the listed piece types.
    PieceType(Vec<Arc<PieceType>>),
    /// One of the listed squares.
    Square(Vec<Square>),
    /// One of the current player's valid moves.
    Move,
    /// No real alternative; the player acknowledges.
    Unit,
}

/// A prompt plus its candidates.
#[derive(Clone, Debug)]
pub struct Choice {
    pub message: String,
    pub kind: ChoiceKind,
    /// Asked after every option of this choice, in order.
    pub next: Vec<Choice>,
}

impl Choice {
    /// Create a choice.
    pub fn new(message: impl Into<String>, kind: ChoiceKind) -> Self {
        Self {
            message: message.into(),
            kind,
            next: Vec::new(),
        }
    }

    /// Pick a piece type.
    pub fn piece_type(message: impl Into<String>, types: Vec<Arc<PieceType>>) -> Self {
        Self::new(message, ChoiceKind::PieceType(types))
    }

    /// Pick a square.
    pub fn square(message: impl Into<String>, squares: Vec<Square>) -> Self {
        Self::new(message, ChoiceKind::Square(squares))
    }

    /// Pick a valid move.
    pub fn moves(message: impl Into<String>) -> Self {
        Self::new(message, ChoiceKind::Move)
    }

    /// Acknowledge.
    pub fn unit(message: impl Into<String>) -> Self {
        Self::new(message, ChoiceKind::Unit)
    }

    /// Add a follow-up choice.
    #[must_use]
    pub fn then(mut self, next: Choice) -> Self {
        self.next.push(next);
        self
    }
}
