//! The piece board: a `Board<PieceId>` plus an event bus.
//!
//! `PieceBoard` is the single source of truth for piece placement. It owns
//! every `Piece` in an arena indexed by `PieceId`, enforces occupancy rules,
//! and announces every mutation as a `BoardEvent`.
//!
//! ## Subscribers
//!
//! - Placed pieces are subscribed automatically and unsubscribed when they
//!   leave the board. They receive events inline, which keeps their derived
//!   square and move cache current.
//! - Listeners (players, the turn journal) subscribe with
//!   `subscribe_listener`. Their deliveries are queued in notification order
//!   and drained with `take_deliveries`.
//!
//! ## Failure
//!
//! Every mutating operation checks all preconditions before touching
//! anything: on error the board is unchanged and no event fires.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use log::trace;
use serde::{Deserialize, Serialize};

use super::grid::Board;
use crate::core::{BoardError, Color, Square};
use crate::events::{BoardEvent, EventBus, Observer};
use crate::pieces::{Piece, PieceId};

static NEXT_BOARD_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a `PieceBoard`. Clones of a board share its id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardId(pub u32);

impl BoardId {
    /// Create a board ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    fn fresh() -> Self {
        Self(NEXT_BOARD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle for a queued-delivery subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

/// A board subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subscriber {
    Piece(PieceId),
    Listener(ListenerId),
}

/// An event queued for a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub listener: ListenerId,
    pub event: BoardEvent,
}

/// Board of pieces with event notification.
#[derive(Clone, Debug)]
pub struct PieceBoard {
    id: BoardId,
    grid: Board<PieceId>,
    pieces: Vec<Piece>,
    bus: EventBus<Subscriber>,
    next_listener: u32,
    outbox: Vec<Delivery>,
}

impl PieceBoard {
    /// Create an empty board. Both dimensions must be positive.
    pub fn new(width: i32, height: i32) -> Result<Self, BoardError> {
        Ok(Self {
            id: BoardId::fresh(),
            grid: Board::new(width, height)?,
            pieces: Vec::new(),
            bus: EventBus::new(),
            next_listener: 0,
            outbox: Vec::new(),
        })
    }

    /// This board's identity.
    #[must_use]
    pub fn id(&self) -> BoardId {
        self.id
    }

    /// Number of files.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    /// Number of ranks.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    /// Check if `square` lies on the board.
    #[must_use]
    pub fn contains(&self, square: Square) -> bool {
        self.grid.contains(square)
    }

    /// The underlying grid of piece ids.
    #[must_use]
    pub fn grid(&self) -> &Board<PieceId> {
        &self.grid
    }

    // === Pieces ===

    /// Register a free-standing piece with this board without placing it.
    pub fn add_piece(&mut self, mut piece: Piece) -> PieceId {
        let id = PieceId::new(self.id, self.pieces.len() as u32);
        piece.register(id);
        self.pieces.push(piece);
        id
    }

    /// Register `piece` and place it on `square`.
    ///
    /// Fails without registering anything if the square is unusable.
    pub fn spawn(&mut self, piece: Piece, square: Square) -> Result<PieceId, BoardError> {
        self.check_vacant(square)?;
        let id = self.add_piece(piece);
        self.place(id, square)?;
        Ok(id)
    }

    fn slot(&self, id: PieceId) -> Result<usize, BoardError> {
        if id.board() != self.id {
            return Err(BoardError::ForeignPiece(id));
        }
        let index = id.index() as usize;
        if index >= self.pieces.len() {
            return Err(BoardError::UnknownPiece(id));
        }
        Ok(index)
    }

    /// Look up a registered piece.
    pub fn piece(&self, id: PieceId) -> Result<&Piece, BoardError> {
        self.slot(id).map(|index| &self.pieces[index])
    }

    /// All registered pieces, on or off the board, in registration order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Number of registered pieces, on or off the board.
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Unregister the newest pieces, down to `mark`, while they are off the
    /// board and `keep` does not claim them. Returns how many were dropped.
    ///
    /// Their ids become free for the next registration.
    pub(crate) fn forget_since(&mut self, mark: usize, keep: impl Fn(PieceId) -> bool) -> usize {
        let mut dropped = 0;
        while self.pieces.len() > mark {
            let Some(piece) = self.pieces.last() else {
                break;
            };
            let Some(id) = piece.id() else {
                break;
            };
            if piece.is_on_board() || keep(id) {
                break;
            }
            self.pieces.pop();
            self.bus.unobserve(Subscriber::Piece(id));
            dropped += 1;
        }
        if dropped > 0 {
            trace!("board {}: forgot {dropped} piece(s)", self.id.raw());
        }
        dropped
    }

    /// The piece on `square`, `Ok(None)` if empty.
    pub fn at(&self, square: Square) -> Result<Option<&Piece>, BoardError> {
        Ok(self
            .grid
            .at(square)?
            .map(|id| &self.pieces[id.index() as usize]))
    }

    /// The id of the piece on `square`, `None` if empty or off the board.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.grid.get(square).copied()
    }

    /// Pieces currently on the board, rank by rank from A1.
    pub fn placed(&self) -> impl Iterator<Item = (Square, &Piece)> {
        self.grid
            .items()
            .map(|(square, id)| (square, &self.pieces[id.index() as usize]))
    }

    /// First placed piece matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&Piece) -> bool) -> Option<&Piece> {
        self.placed().map(|(_, p)| p).find(|p| predicate(p))
    }

    // === Mutation ===

    fn check_vacant(&self, square: Square) -> Result<(), BoardError> {
        match self.grid.at(square)? {
            Some(&occupant) => Err(BoardError::Occupied { square, occupant }),
            None => Ok(()),
        }
    }

    fn check_off_board(&self, id: PieceId) -> Result<usize, BoardError> {
        let index = self.slot(id)?;
        if self.pieces[index].is_on_board() {
            return Err(BoardError::AlreadyPlaced(id));
        }
        Ok(index)
    }

    fn on_board_square(&self, id: PieceId) -> Result<Square, BoardError> {
        let index = self.slot(id)?;
        self.pieces[index].square().ok_or(BoardError::NotOnBoard(id))
    }

    /// Place an off-board piece on a vacant square.
    pub fn place(&mut self, id: PieceId, square: Square) -> Result<(), BoardError> {
        let index = self.check_off_board(id)?;
        self.check_vacant(square)?;

        self.grid.place(square, id)?;
        self.bus.observe(Subscriber::Piece(id));
        let owner = self.pieces[index].owner();
        self.emit(BoardEvent::Placed {
            piece: id,
            owner,
            square,
        });
        Ok(())
    }

    /// Remove whatever stands on `square`. Fails if the square is empty.
    pub fn remove_at(&mut self, square: Square) -> Result<PieceId, BoardError> {
        let id = self.grid.at(square)?.copied().ok_or(BoardError::Empty(square))?;
        self.evict(square, id);
        Ok(id)
    }

    /// Place an off-board piece on `square`, capturing any occupant.
    ///
    /// Returns the evicted piece, if any.
    pub fn replace(&mut self, id: PieceId, square: Square) -> Result<Option<PieceId>, BoardError> {
        let index = self.check_off_board(id)?;
        let evicted = self.grid.at(square)?.copied();

        let by = self.pieces[index].owner();
        if let Some(occupant) = evicted {
            self.evict(square, occupant);
            self.announce_capture(occupant, by, square);
        }
        self.place(id, square)?;
        Ok(evicted)
    }

    /// Move a placed piece to `square`, capturing any occupant.
    ///
    /// Returns the captured piece, if any.
    pub fn move_piece(&mut self, id: PieceId, square: Square) -> Result<Option<PieceId>, BoardError> {
        let from = self.on_board_square(id)?;
        if from == square {
            return Err(BoardError::SameSquare { piece: id, square });
        }
        let captured = self.grid.at(square)?.copied();
        let owner = self.pieces[id.index() as usize].owner();

        self.grid.take(from)?;
        if let Some(occupant) = captured {
            self.evict(square, occupant);
            self.announce_capture(occupant, owner, square);
        }
        self.grid.place(square, id)?;
        self.emit(BoardEvent::Moved {
            piece: id,
            owner,
            from,
            to: square,
        });
        Ok(captured)
    }

    /// Remove the piece on `square` and attribute it as captured by `by`.
    pub fn capture_at(&mut self, square: Square, by: Option<Color>) -> Result<PieceId, BoardError> {
        let id = self.remove_at(square)?;
        self.announce_capture(id, by, square);
        Ok(id)
    }

    /// Change the owner of an off-board piece.
    pub fn set_owner(&mut self, id: PieceId, owner: Option<Color>) -> Result<(), BoardError> {
        let index = self.slot(id)?;
        if self.pieces[index].is_on_board() {
            return Err(BoardError::PieceOnBoard(id));
        }
        let previous = self.pieces[index].owner();
        if previous == owner {
            return Ok(());
        }
        let event = BoardEvent::OwnerChanged {
            piece: id,
            previous,
            current: owner,
        };
        // Off-board pieces are not subscribed; tell the piece directly.
        self.pieces[index].handle(&event);
        self.emit(event);
        Ok(())
    }

    fn evict(&mut self, square: Square, id: PieceId) {
        let taken = self.grid.take(square);
        debug_assert_eq!(taken, Ok(Some(id)), "grid out of step at {square}");
        let owner = self.pieces[id.index() as usize].owner();
        self.emit(BoardEvent::Removed {
            piece: id,
            owner,
            square,
        });
        self.bus.unobserve(Subscriber::Piece(id));
    }

    fn announce_capture(&mut self, id: PieceId, by: Option<Color>, from: Square) {
        let owner = self.pieces[id.index() as usize].owner();
        self.emit(BoardEvent::Captured {
            piece: id,
            owner,
            by,
            from,
        });
    }

    fn emit(&mut self, event: BoardEvent) {
        trace!("board {}: {event}", self.id.raw());
        let pieces = &mut self.pieces;
        let outbox = &mut self.outbox;
        self.bus.notify(&event, |subscriber, event| match subscriber {
            Subscriber::Piece(id) => {
                if let Some(piece) = pieces.get_mut(id.index() as usize) {
                    piece.handle(event);
                }
            }
            Subscriber::Listener(listener) => outbox.push(Delivery {
                listener,
                event: *event,
            }),
        });
    }

    // === Listeners ===

    /// Subscribe a new listener. It receives every subsequent event.
    pub fn subscribe_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.bus.observe(Subscriber::Listener(id));
        id
    }

    /// Unsubscribe a listener. Already queued deliveries stay queued.
    pub fn unsubscribe_listener(&mut self, id: ListenerId) -> bool {
        self.bus.unobserve(Subscriber::Listener(id))
    }

    /// Check if `subscriber` is currently subscribed.
    #[must_use]
    pub fn is_observing(&self, subscriber: Subscriber) -> bool {
        self.bus.is_observing(subscriber)
    }

    /// Drain queued listener deliveries, oldest first.
    pub fn take_deliveries(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.outbox)
    }

    /// Diagram of the board using piece symbols.
    #[must_use]
    pub fn pretty(&self) -> String {
        self.grid
            .pretty(|id| self.pieces[id.index() as usize].symbol().to_string())
    }
}

impl fmt::Display for PieceBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (square, piece) in self.placed() {
            writeln!(f, "{square}: {piece}")?;
        }
        Ok(())
    }
}
