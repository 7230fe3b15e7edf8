//! Piece instances.
//!
//! A `Piece` is created free-standing with a type and an optional owner,
//! registered with a `PieceBoard` (which assigns its `PieceId`) and then
//! placed, moved, captured and possibly placed again.
//!
//! The piece's square is derived: it changes only when the piece observes
//! a board event about itself. Callers never set it.

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::moves::MoveGroup;
use super::piece_type::PieceType;
use crate::board::BoardId;
use crate::core::{Color, Square};
use crate::events::{BoardEvent, Observer};
use crate::state::State;

/// Identifies a piece within the board that registered it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId {
    board: BoardId,
    index: u32,
}

impl PieceId {
    /// Create a piece ID.
    #[must_use]
    pub const fn new(board: BoardId, index: u32) -> Self {
        Self { board, index }
    }

    /// The board that minted this id.
    #[must_use]
    pub const fn board(self) -> BoardId {
        self.board
    }

    /// Arena index within that board.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({}:{})", self.board.raw(), self.index)
    }
}

/// A piece: a type, an optional owner and a derived position.
#[derive(Clone)]
pub struct Piece {
    piece_type: Arc<PieceType>,
    owner: Option<Color>,
    id: Option<PieceId>,
    square: Option<Square>,
    moves: OnceCell<Vec<MoveGroup>>,
    generating: Cell<bool>,
}

impl Piece {
    /// Create a free-standing piece.
    #[must_use]
    pub fn new(piece_type: Arc<PieceType>, owner: Option<Color>) -> Self {
        Self {
            piece_type,
            owner,
            id: None,
            square: None,
            moves: OnceCell::new(),
            generating: Cell::new(false),
        }
    }

    pub(crate) fn register(&mut self, id: PieceId) {
        self.id = Some(id);
    }

    /// The id assigned at registration, `None` while free-standing.
    #[must_use]
    pub fn id(&self) -> Option<PieceId> {
        self.id
    }

    /// This piece's type.
    #[must_use]
    pub fn piece_type(&self) -> &Arc<PieceType> {
        &self.piece_type
    }

    /// The owning colour, if any.
    #[must_use]
    pub fn owner(&self) -> Option<Color> {
        self.owner
    }

    /// Check if this piece belongs to `color`.
    #[must_use]
    pub fn is_owned_by(&self, color: Color) -> bool {
        self.owner == Some(color)
    }

    /// The square this piece stands on.
    #[must_use]
    pub fn square(&self) -> Option<Square> {
        self.square
    }

    /// Check if the piece is on a board.
    #[must_use]
    pub fn is_on_board(&self) -> bool {
        self.square.is_some()
    }

    /// One-character symbol for diagrams.
    #[must_use]
    pub fn symbol(&self) -> char {
        self.piece_type.symbol(self.owner)
    }

    /// Candidate move groups, one per destination.
    ///
    /// Memoized until the next board event this piece observes.
    ///
    /// # Panics
    ///
    /// Panics if one of this piece's own motions asks for its moves while
    /// they are being generated, directly or through `State::moves_of` or
    /// `State::attacked_squares` for the piece's own colour.
    pub fn moves(&self, state: &State) -> &[MoveGroup] {
        if let Some(cached) = self.moves.get() {
            return cached;
        }
        assert!(
            !self.generating.replace(true),
            "a motion of {} asks for its own moves",
            self.piece_type.name()
        );
        let groups = self.piece_type.move_groups(state, self);
        self.generating.set(false);
        self.moves.get_or_init(|| groups)
    }

    /// Check if the move cache is populated.
    #[must_use]
    pub fn has_cached_moves(&self) -> bool {
        self.moves.get().is_some()
    }
}

impl Observer<BoardEvent> for Piece {
    fn handle(&mut self, event: &BoardEvent) {
        // Any board change can alter what this piece may do.
        self.moves.take();

        if self.id != Some(event.piece()) {
            return;
        }
        match *event {
            BoardEvent::Placed { square, .. } => self.square = Some(square),
            BoardEvent::Removed { .. } => self.square = None,
            BoardEvent::Moved { to, .. } => self.square = Some(to),
            BoardEvent::OwnerChanged { current, .. } => self.owner = current,
            BoardEvent::Captured { .. } => {}
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Piece")
            .field("type", &self.piece_type.name())
            .field("owner", &self.owner)
            .field("id", &self.id)
            .field("square", &self.square)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(color) => write!(f, "{color} {}", self.piece_type.name()),
            None => f.write_str(self.piece_type.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece() -> Piece {
        let mut piece = Piece::new(Arc::new(PieceType::new("knight")), Some(Color::Black));
        piece.register(PieceId::new(BoardId::new(9), 0));
        piece
    }

    #[test]
    #[should_panic(expected = "asks for its own moves")]
    fn test_self_referential_motion_panics() {
        use crate::core::GameConfig;
        use crate::pieces::Motion;

        let mut state = State::new(GameConfig::new(4, 4)).unwrap();
        let echo = state.add_piece_type(PieceType::new("echo").with_motion(Motion::new("echo", |state, piece| {
            piece
                .owner()
                .map(|color| state.attacked_squares(color))
                .unwrap_or_default()
        })));
        state.add_piece(&echo, Some(Color::White), Square::new(1, 1)).unwrap();
        let _ = state.moves_of(Color::White);
    }

    #[test]
    fn test_free_standing() {
        let piece = Piece::new(Arc::new(PieceType::new("knight")), None);
        assert_eq!(piece.id(), None);
        assert!(!piece.is_on_board());
        assert_eq!(piece.to_string(), "knight");
    }

    #[test]
    fn test_square_follows_own_events() {
        let mut piece = piece();
        let id = piece.id().unwrap();
        let b2 = Square::new(2, 2);
        let b4 = Square::new(2, 4);

        piece.handle(&BoardEvent::Placed { piece: id, owner: piece.owner(), square: b2 });
        assert_eq!(piece.square(), Some(b2));

        piece.handle(&BoardEvent::Moved { piece: id, owner: piece.owner(), from: b2, to: b4 });
        assert_eq!(piece.square(), Some(b4));

        piece.handle(&BoardEvent::Removed { piece: id, owner: piece.owner(), square: b4 });
        assert!(!piece.is_on_board());
    }

    #[test]
    fn test_ignores_other_pieces() {
        let mut piece = piece();
        let other = PieceId::new(BoardId::new(9), 1);
        piece.handle(&BoardEvent::Placed { piece: other, owner: None, square: Square::new(1, 1) });
        assert_eq!(piece.square(), None);
    }

    #[test]
    fn test_owner_change() {
        let mut piece = piece();
        let id = piece.id().unwrap();
        piece.handle(&BoardEvent::OwnerChanged {
            piece: id,
            previous: Some(Color::Black),
            current: Some(Color::White),
        });
        assert!(piece.is_owned_by(Color::White));
        assert_eq!(piece.symbol(), 'K');
        assert_eq!(piece.to_string(), "white knight");
    }
}
