//! Error types.
//!
//! - `BoardError`: structural board failures. Returned synchronously,
//!   never swallowed by the board itself.
//! - `RuleError`: failures raised by rule callbacks (motion actions,
//!   controller turns).
//! - `GameError`: everything the `Game` and `State` façades can return.

use thiserror::Error;

use super::color::Color;
use super::square::Square;
use crate::pieces::PieceId;

/// Structural board failure. A failed operation leaves the board untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("square {0} is outside the board")]
    OutOfBounds(Square),

    #[error("square {square} is occupied by {occupant}")]
    Occupied { square: Square, occupant: PieceId },

    #[error("square {0} is empty")]
    Empty(Square),

    #[error("{0} is already on the board")]
    AlreadyPlaced(PieceId),

    #[error("{0} is not on the board")]
    NotOnBoard(PieceId),

    #[error("{0} belongs to a different board")]
    ForeignPiece(PieceId),

    #[error("{0} is not registered with this board")]
    UnknownPiece(PieceId),

    #[error("{piece} is already on {square}")]
    SameSquare { piece: PieceId, square: Square },

    #[error("cannot change the owner of {0} while it is on the board")]
    PieceOnBoard(PieceId),
}

/// Failure while parsing a square such as `"B2"`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SquareParseError {
    #[error("square {0:?} has no file letter")]
    MissingFile(String),

    #[error("square {0:?} has no valid rank")]
    InvalidRank(String),

    #[error("square {0:?} is out of range")]
    OutOfRange(String),
}

/// Failure reported by a rule callback.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuleError {
    message: String,
}

impl RuleError {
    /// Create a rule error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<BoardError> for RuleError {
    fn from(err: BoardError) -> Self {
        Self::new(err.to_string())
    }
}

/// Failure returned by `State` and `Game` operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("rule failed: {0}")]
    Rule(#[from] RuleError),

    #[error("route is not a complete path through the turn options: {0}")]
    InvalidRoute(String),

    #[error("no valid move from {from} to {to}")]
    MoveNotAvailable { from: Square, to: Square },

    #[error("unknown piece type {0:?}")]
    UnknownPieceType(String),

    #[error("{color} holds no captured {piece_type}")]
    NoSuchCapture { color: Color, piece_type: String },
}
