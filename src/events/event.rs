//! Board events.
//!
//! Every mutation of a `PieceBoard` is announced as a `BoardEvent`. Pieces,
//! players and the turn journal never write their derived fields directly;
//! they update only in reaction to these events.
//!
//! ## Ordering
//!
//! Within one board operation events fire in a fixed order:
//! 1. the source square is vacated before the destination is occupied;
//! 2. an evicted occupant gets `Removed` then `Captured`;
//! 3. the mover's `Moved` (or the newcomer's `Placed`) comes last.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{Color, Square};
use crate::pieces::PieceId;

/// A single board mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// A piece entered the board.
    Placed {
        piece: PieceId,
        owner: Option<Color>,
        square: Square,
    },

    /// A piece left the board.
    Removed {
        piece: PieceId,
        owner: Option<Color>,
        square: Square,
    },

    /// A piece that was just removed is attributed as a capture.
    Captured {
        piece: PieceId,
        owner: Option<Color>,
        by: Option<Color>,
        from: Square,
    },

    /// A piece on the board changed squares.
    Moved {
        piece: PieceId,
        owner: Option<Color>,
        from: Square,
        to: Square,
    },

    /// An off-board piece changed sides.
    OwnerChanged {
        piece: PieceId,
        previous: Option<Color>,
        current: Option<Color>,
    },
}

impl BoardEvent {
    /// The piece this event is about.
    #[must_use]
    pub const fn piece(&self) -> PieceId {
        match *self {
            BoardEvent::Placed { piece, .. }
            | BoardEvent::Removed { piece, .. }
            | BoardEvent::Captured { piece, .. }
            | BoardEvent::Moved { piece, .. }
            | BoardEvent::OwnerChanged { piece, .. } => piece,
        }
    }

    /// Check if this event concerns `piece`.
    #[must_use]
    pub fn concerns(&self, piece: PieceId) -> bool {
        self.piece() == piece
    }

    /// Short event name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            BoardEvent::Placed { .. } => "placed",
            BoardEvent::Removed { .. } => "removed",
            BoardEvent::Captured { .. } => "captured",
            BoardEvent::Moved { .. } => "moved",
            BoardEvent::OwnerChanged { .. } => "owner-changed",
        }
    }
}

impl fmt::Display for BoardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardEvent::Placed { piece, square, .. } => write!(f, "{piece} placed on {square}"),
            BoardEvent::Removed { piece, square, .. } => {
                write!(f, "{piece} removed from {square}")
            }
            BoardEvent::Captured { piece, by, from, .. } => match by {
                Some(color) => write!(f, "{piece} captured on {from} by {color}"),
                None => write!(f, "{piece} captured on {from}"),
            },
            BoardEvent::Moved { piece, from, to, .. } => write!(f, "{piece} moved {from}-{to}"),
            BoardEvent::OwnerChanged { piece, current, .. } => match current {
                Some(color) => write!(f, "{piece} now belongs to {color}"),
                None => write!(f, "{piece} now has no owner"),
            },
        }
    }
}
