//! Motions: how a piece type moves.
//!
//! A `Motion` is a named triple of callbacks supplied by the rule set:
//!
//! - `generate(state, piece)`: candidate destination squares
//! - `choices`: an ordered chain of follow-up decisions, each seeing the
//!   options chosen so far (e.g. "promote to which piece?")
//! - `action(state, move, options)`: extra board work after the piece has
//!   been relocated (e.g. swap the pawn for the chosen piece)
//!
//! `Motion::slide` and `Motion::leap` build the generators for ordinary
//! riders and leapers.

use std::fmt;
use std::sync::Arc;

use super::moves::Move;
use super::piece::Piece;
use crate::core::{Offset, RuleError, Square};
use crate::options::{Choice, OptionNode, OptionValue};
use crate::state::State;

/// Destination generator.
pub type GenerateFn = dyn Fn(&State, &Piece) -> Vec<Square> + Send + Sync;

/// Follow-up choice generator: `(state, piece, destination, chosen so far)`.
///
/// Returning `None` means "no further choice, the action is not offered".
pub type ChoiceFn = dyn Fn(&State, &Piece, Square, &[OptionValue]) -> Option<Choice> + Send + Sync;

/// Post-relocation action: `(state, move, chosen options)`.
pub type ActionFn = dyn Fn(&mut State, &Move, &[OptionValue]) -> Result<(), RuleError> + Send + Sync;

/// A named way of moving.
#[derive(Clone)]
pub struct Motion {
    name: String,
    generate: Arc<GenerateFn>,
    choices: Vec<Arc<ChoiceFn>>,
    action: Option<Arc<ActionFn>>,
}

impl Motion {
    /// Create a motion from a destination generator.
    ///
    /// The generator may look at any other piece's moves, but never at
    /// those of the piece it runs for: `Piece::moves` panics on that.
    pub fn new(
        name: impl Into<String>,
        generate: impl Fn(&State, &Piece) -> Vec<Square> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            generate: Arc::new(generate),
            choices: Vec::new(),
            action: None,
        }
    }

    /// A rider: moves any distance along each direction until blocked.
    ///
    /// The first enemy or unowned piece on a ray is a destination; own pieces block.
    pub fn slide(name: impl Into<String>, directions: Vec<Offset>) -> Self {
        Self::new(name, move |state, piece| slide_destinations(state, piece, &directions, None))
    }

    /// A rider limited to `max_steps` squares per direction.
    pub fn slide_limited(name: impl Into<String>, directions: Vec<Offset>, max_steps: usize) -> Self {
        Self::new(name, move |state, piece| {
            slide_destinations(state, piece, &directions, Some(max_steps))
        })
    }

    /// A leaper: jumps straight to each offset, ignoring pieces in between.
    pub fn leap(name: impl Into<String>, offsets: Vec<Offset>) -> Self {
        Self::new(name, move |state, piece| leap_destinations(state, piece, &offsets))
    }

    /// Append a follow-up choice generator.
    #[must_use]
    pub fn with_choice(
        mut self,
        choice: impl Fn(&State, &Piece, Square, &[OptionValue]) -> Option<Choice> + Send + Sync + 'static,
    ) -> Self {
        self.choices.push(Arc::new(choice));
        self
    }

    /// Set the post-relocation action.
    #[must_use]
    pub fn with_action(
        mut self,
        action: impl Fn(&mut State, &Move, &[OptionValue]) -> Result<(), RuleError> + Send + Sync + 'static,
    ) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Motion name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The action, if any.
    #[must_use]
    pub fn action(&self) -> Option<&Arc<ActionFn>> {
        self.action.as_ref()
    }

    /// Number of chained choice generators.
    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    /// Candidate destinations for `piece`.
    pub fn destinations(&self, state: &State, piece: &Piece) -> Vec<Square> {
        (self.generate)(state, piece)
    }

    /// Option tree of follow-up choices for a move to `to`.
    ///
    /// `None` when the motion has no choice generators.
    pub fn option_tree(&self, state: &State, piece: &Piece, to: Square) -> Option<OptionNode> {
        let bound: Vec<Box<dyn Fn(&[OptionValue]) -> Option<Choice> + '_>> = self
            .choices
            .iter()
            .map(|choice| {
                Box::new(move |chosen: &[OptionValue]| choice(state, piece, to, chosen))
                    as Box<dyn Fn(&[OptionValue]) -> Option<Choice> + '_>
            })
            .collect();
        OptionNode::from_generators(&bound)
    }
}

impl fmt::Debug for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Motion")
            .field("name", &self.name)
            .field("choices", &self.choices.len())
            .field("action", &self.action.is_some())
            .finish()
    }
}

fn blocks(state: &State, piece: &Piece, square: Square) -> Option<bool> {
    // Some(true): own piece, Some(false): capturable, None: empty.
    state
        .board()
        .at(square)
        .ok()
        .flatten()
        .map(|other| other.owner().is_some() && other.owner() == piece.owner())
}

/// Squares reachable by sliding along `directions`.
pub fn slide_destinations(
    state: &State,
    piece: &Piece,
    directions: &[Offset],
    max_steps: Option<usize>,
) -> Vec<Square> {
    let Some(from) = piece.square() else {
        return Vec::new();
    };
    let board = state.board();
    let limit = max_steps.unwrap_or(usize::MAX);
    let mut out = Vec::new();

    for &direction in directions {
        let mut square = from;
        for _ in 0..limit {
            square = square.offset(direction);
            if !board.contains(square) {
                break;
            }
            match blocks(state, piece, square) {
                None => out.push(square),
                Some(false) => {
                    out.push(square);
                    break;
                }
                Some(true) => break,
            }
        }
    }
    out
}

/// Squares reachable by jumping to each of `offsets`.
pub fn leap_destinations(state: &State, piece: &Piece, offsets: &[Offset]) -> Vec<Square> {
    let Some(from) = piece.square() else {
        return Vec::new();
    };
    offsets
        .iter()
        .map(|&offset| from.offset(offset))
        .filter(|&square| state.board().contains(square))
        .filter(|&square| blocks(state, piece, square) != Some(true))
        .collect()
}
