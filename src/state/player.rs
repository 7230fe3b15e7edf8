//! Players.
//!
//! A `Player` is one side of the game. Its live pieces and its captures are
//! derived entirely from the board events it observes; nothing else writes
//! them.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::board::{ListenerId, PieceBoard};
use crate::core::{Color, Offset};
use crate::events::{BoardEvent, Observer};
use crate::pieces::PieceId;

/// One side's derived piece bookkeeping.
#[derive(Clone, Debug)]
pub struct Player {
    color: Color,
    listener: ListenerId,
    pieces: FxHashSet<PieceId>,
    captures: FxHashSet<PieceId>,
}

impl Player {
    /// Create a player fed by board `listener`.
    #[must_use]
    pub fn new(color: Color, listener: ListenerId) -> Self {
        Self {
            color,
            listener,
            pieces: FxHashSet::default(),
            captures: FxHashSet::default(),
        }
    }

    /// This player's colour.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// The board subscription feeding this player.
    #[must_use]
    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    /// Direction this player's pawns advance in.
    #[must_use]
    pub fn forward_direction(&self) -> Offset {
        self.color.forward()
    }

    /// Own pieces currently on the board, in id order.
    #[must_use]
    pub fn pieces(&self) -> Vec<PieceId> {
        let mut pieces: Vec<_> = self.pieces.iter().copied().collect();
        pieces.sort_unstable();
        pieces
    }

    /// Pieces this player has captured and not yet returned, in id order.
    #[must_use]
    pub fn captures(&self) -> Vec<PieceId> {
        let mut captures: Vec<_> = self.captures.iter().copied().collect();
        captures.sort_unstable();
        captures
    }

    /// Check if `piece` is one of this player's live pieces.
    #[must_use]
    pub fn owns(&self, piece: PieceId) -> bool {
        self.pieces.contains(&piece)
    }

    /// Check if `piece` is held as a capture.
    #[must_use]
    pub fn has_captured(&self, piece: PieceId) -> bool {
        self.captures.contains(&piece)
    }

    /// Number of live pieces.
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Captured pieces counted by type name.
    #[must_use]
    pub fn captures_by_type(&self, board: &PieceBoard) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for &id in &self.captures {
            if let Ok(piece) = board.piece(id) {
                *counts.entry(piece.piece_type().name().to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl Observer<BoardEvent> for Player {
    fn handle(&mut self, event: &BoardEvent) {
        match *event {
            BoardEvent::Placed { piece, owner, .. } => {
                if owner == Some(self.color) {
                    self.pieces.insert(piece);
                }
                // A piece coming back into play is nobody's prisoner.
                self.captures.remove(&piece);
            }
            BoardEvent::Removed { piece, owner, .. } => {
                if owner == Some(self.color) {
                    self.pieces.remove(&piece);
                }
            }
            BoardEvent::Captured { piece, by, .. } => {
                if by == Some(self.color) {
                    self.captures.insert(piece);
                }
            }
            BoardEvent::Moved { .. } | BoardEvent::OwnerChanged { .. } => {}
        }
    }
}
