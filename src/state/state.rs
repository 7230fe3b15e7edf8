//! The game state.
//!
//! `State` owns the piece board, both players and the turn journal, and
//! keeps the latter two in step with the board: every mutation goes through
//! a `BoardMut` guard, and dropping the guard forwards the queued board
//! events to the players (White first, then Black) and to the journal.
//!
//! ## Move validation
//!
//! Pieces generate candidate moves without regard to legality. A candidate
//! is valid when, after performing it, every registered validator accepts
//! the resulting state. How the candidate is tried depends on the
//! configured `ValidationStrategy`:
//!
//! - `Speculative`: perform it on the live state and undo it through the
//!   journal.
//! - `Snapshot`: perform it on a clone and drop the clone.
//!
//! Either way the live state is observably unchanged afterwards.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use log::{debug, error, trace, warn};
use smallvec::SmallVec;

use super::journal::{RecordedMove, TurnJournal};
use super::player::Player;
use super::validator::StateValidator;
use crate::board::{ListenerId, PieceBoard};
use crate::core::{
    BoardError, Color, ColorMap, GameConfig, GameError, RuleFailurePolicy, Square, ValidationStrategy,
};
use crate::events::{BoardEvent, Observer};
use crate::pieces::{Move, MoveGroup, Piece, PieceId, PieceType};

/// Mutable access to the board of a `State`.
///
/// Board events raised through the guard reach the players and the journal
/// when the guard is dropped.
pub struct BoardMut<'a> {
    state: &'a mut State,
}

impl Deref for BoardMut<'_> {
    type Target = PieceBoard;

    fn deref(&self) -> &PieceBoard {
        &self.state.board
    }
}

impl DerefMut for BoardMut<'_> {
    fn deref_mut(&mut self) -> &mut PieceBoard {
        &mut self.state.board
    }
}

impl Drop for BoardMut<'_> {
    fn drop(&mut self) {
        self.state.sync();
    }
}

/// A point to roll back to with `State::undo_to`.
///
/// Covers the journal and the piece arena: pieces registered after the
/// checkpoint are forgotten again once undo has taken them off the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    entries: usize,
    pieces: usize,
}

/// The complete state of a game in progress.
#[derive(Clone)]
pub struct State {
    config: GameConfig,
    board: PieceBoard,
    players: ColorMap<Player>,
    journal_listener: ListenerId,
    journal: TurnJournal,
    recording: bool,
    /// Arena size at the start of the current turn.
    turn_pieces: usize,
    current: Color,
    turn: u32,
    validators: Vec<Arc<dyn StateValidator>>,
    piece_types: Vec<Arc<PieceType>>,
    valid_moves: Option<Vec<MoveGroup>>,
    generating: bool,
    version: u64,
}

impl State {
    /// Create an empty state with a fresh board.
    pub fn new(config: GameConfig) -> Result<Self, BoardError> {
        let mut board = PieceBoard::new(config.width, config.height)?;
        let white = board.subscribe_listener();
        let black = board.subscribe_listener();
        let journal_listener = board.subscribe_listener();
        let players = ColorMap::new(|color| match color {
            Color::White => Player::new(color, white),
            Color::Black => Player::new(color, black),
        });

        Ok(Self {
            journal: TurnJournal::new(config.first_turn),
            current: config.first_player,
            turn: config.first_turn,
            config,
            board,
            players,
            journal_listener,
            recording: true,
            turn_pieces: 0,
            validators: Vec::new(),
            piece_types: Vec::new(),
            valid_moves: None,
            generating: false,
            version: 0,
        })
    }

    /// The configuration this state was created with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // === Board ===

    /// Read access to the board.
    #[must_use]
    pub fn board(&self) -> &PieceBoard {
        &self.board
    }

    /// Write access to the board.
    pub fn board_mut(&mut self) -> BoardMut<'_> {
        BoardMut { state: self }
    }

    /// Register a new piece of `piece_type` and place it on `square`.
    pub fn add_piece(
        &mut self,
        piece_type: &Arc<PieceType>,
        owner: Option<Color>,
        square: Square,
    ) -> Result<PieceId, BoardError> {
        let piece = Piece::new(Arc::clone(piece_type), owner);
        self.board_mut().spawn(piece, square)
    }

    /// The piece on `square`, if any.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.board.at(square).ok().flatten()
    }

    /// Forward queued board events to the players and the journal.
    fn sync(&mut self) {
        if !self.generating && self.journal.in_setup(self.turn) {
            // Setup pieces belong to no turn.
            self.turn_pieces = self.board.piece_count();
        }
        let deliveries = self.board.take_deliveries();
        if deliveries.is_empty() {
            return;
        }

        let mut journaled: SmallVec<[BoardEvent; 4]> = SmallVec::new();
        for delivery in deliveries {
            if delivery.listener == self.journal_listener {
                journaled.push(delivery.event);
                continue;
            }
            for (_, player) in self.players.iter_mut() {
                if player.listener() == delivery.listener {
                    player.handle(&delivery.event);
                }
            }
        }
        if self.recording && !journaled.is_empty() {
            let kept = self.journal.record_batch(self.turn, &journaled);
            if !kept {
                trace!("setup: {} event(s) not journaled", journaled.len());
            }
        }

        self.valid_moves = None;
        self.version += 1;
    }

    /// Monotonic counter, bumped on every observable change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    // === Players and turns ===

    /// Both players.
    #[must_use]
    pub fn players(&self) -> &ColorMap<Player> {
        &self.players
    }

    /// One player.
    #[must_use]
    pub fn player(&self, color: Color) -> &Player {
        &self.players[color]
    }

    /// The player to move.
    #[must_use]
    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    /// Colour of the player to move.
    #[must_use]
    pub fn current_color(&self) -> Color {
        self.current
    }

    /// Current turn number.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn
    }

    /// Hand the move to the other player.
    pub fn end_turn(&mut self) {
        debug!("turn {} ({}) ends", self.turn, self.current);
        self.current = self.current.opponent();
        self.turn += 1;
        self.turn_pieces = self.board.piece_count();
        self.valid_moves = None;
        self.version += 1;
    }

    // === Piece types ===

    /// Register a piece type so it can be looked up by name.
    ///
    /// Registering a second type with the same name replaces the first.
    pub fn add_piece_type(&mut self, piece_type: PieceType) -> Arc<PieceType> {
        let piece_type = Arc::new(piece_type);
        self.piece_types.retain(|t| t.name() != piece_type.name());
        self.piece_types.push(Arc::clone(&piece_type));
        piece_type
    }

    /// Look up a registered piece type.
    pub fn piece_type(&self, name: &str) -> Result<Arc<PieceType>, GameError> {
        self.piece_types
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| GameError::UnknownPieceType(name.to_string()))
    }

    /// Every registered piece type, in registration order.
    #[must_use]
    pub fn piece_types(&self) -> &[Arc<PieceType>] {
        &self.piece_types
    }

    // === Moves ===

    /// Register a legality predicate. Validators are ANDed in order.
    pub fn add_validator(&mut self, validator: impl StateValidator + 'static) {
        self.validators.push(Arc::new(validator));
        self.valid_moves = None;
        self.version += 1;
    }

    /// Number of registered validators.
    #[must_use]
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Check if the state is currently trying candidate moves.
    ///
    /// Validators and actions can use this to skip expensive work that only
    /// matters for moves really played.
    #[must_use]
    pub fn is_generating_moves(&self) -> bool {
        self.generating
    }

    /// Candidate move groups of every piece of `color`, in piece order.
    ///
    /// Candidates are not checked against the validators.
    #[must_use]
    pub fn moves_of(&self, color: Color) -> Vec<MoveGroup> {
        self.players[color]
            .pieces()
            .into_iter()
            .filter_map(|id| self.board.piece(id).ok())
            .flat_map(|piece| piece.moves(self).iter().cloned())
            .collect()
    }

    /// Squares `color` could move a piece to, sorted and deduplicated.
    #[must_use]
    pub fn attacked_squares(&self, color: Color) -> Vec<Square> {
        let mut squares: Vec<Square> = self.moves_of(color).iter().map(MoveGroup::to).collect();
        squares.sort_unstable_by_key(|s| (s.rank, s.file));
        squares.dedup();
        squares
    }

    /// Check if any candidate move of `color` lands on `square`.
    #[must_use]
    pub fn is_attacked(&self, square: Square, color: Color) -> bool {
        self.moves_of(color).iter().any(|group| group.to() == square)
    }

    /// Valid move groups of the current player.
    ///
    /// Memoized until the next board change or turn change.
    pub fn valid_moves(&mut self) -> &[MoveGroup] {
        if self.valid_moves.is_none() {
            let generated = self.generate_valid_moves();
            self.valid_moves = Some(generated);
        }
        self.valid_moves.as_deref().unwrap_or(&[])
    }

    fn generate_valid_moves(&mut self) -> Vec<MoveGroup> {
        let candidates = self.moves_of(self.current);
        let version = self.version;
        let was_generating = self.generating;
        self.generating = true;

        let mut valid = Vec::with_capacity(candidates.len());
        for group in &candidates {
            if let Some(kept) = group.filter_moves(|mv| self.probe(mv)) {
                valid.push(kept);
            }
        }

        self.generating = was_generating;
        // Every probe was undone.
        self.version = version;
        debug!(
            "{}: {} of {} candidate group(s) valid",
            self.current,
            valid.len(),
            candidates.len()
        );
        valid
    }

    /// Try `mv` and report whether every validator accepts the result.
    fn probe(&mut self, mv: &Move) -> bool {
        match self.config.validation {
            ValidationStrategy::Speculative => {
                let checkpoint = self.checkpoint();
                let accepted = self.try_candidate(mv);
                self.undo_to(checkpoint);
                accepted
            }
            ValidationStrategy::Snapshot => {
                let mut scratch = self.clone();
                scratch.valid_moves = None;
                scratch.try_candidate(mv)
            }
        }
    }

    fn try_candidate(&mut self, mv: &Move) -> bool {
        if let Err(err) = mv.perform(self) {
            warn!("candidate {mv} rejected: {err}");
            return false;
        }
        let validators = self.validators.clone();
        validators.iter().all(|v| v.validate(self, mv))
    }

    /// Perform `mv` for real.
    ///
    /// On failure the configured `RuleFailurePolicy` decides whether the
    /// partial effects are undone; the error is returned either way.
    pub fn apply(&mut self, mv: &Move) -> Result<(), GameError> {
        let checkpoint = self.checkpoint();
        let result = mv.perform(self);
        if let Err(err) = &result {
            warn!("move {mv} failed: {err}");
            if self.config.on_rule_failure == RuleFailurePolicy::Rollback {
                self.undo_to(checkpoint);
            }
        }
        result
    }

    // === Journal and undo ===

    /// The turn journal.
    #[must_use]
    pub fn journal(&self) -> &TurnJournal {
        &self.journal
    }

    /// Move history derived from the journal.
    #[must_use]
    pub fn record(&self) -> Vec<RecordedMove> {
        self.journal.records()
    }

    /// Treat all further board edits as play, even before the first move.
    pub fn finish_setup(&mut self) {
        if self.journal.in_setup(self.turn) {
            self.turn_pieces = self.board.piece_count();
        }
        self.journal.finish_setup();
    }

    /// The current journal position and arena size.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            entries: self.journal.len(),
            pieces: self.board.piece_count(),
        }
    }

    /// Undo every journaled change of the current turn.
    ///
    /// Pieces registered during the turn are forgotten as well.
    pub fn undo_turn(&mut self) {
        let keep = self.journal.len() - self.journal.trailing(self.turn);
        debug!("undo turn {}: {} event(s)", self.turn, self.journal.len() - keep);
        self.undo_to(Checkpoint {
            entries: keep,
            pieces: self.turn_pieces,
        });
    }

    /// Undo journaled changes, newest first, back to `checkpoint`, then
    /// forget the pieces registered since that are now off the board.
    ///
    /// # Panics
    ///
    /// Panics if the board no longer agrees with the journal.
    pub fn undo_to(&mut self, checkpoint: Checkpoint) {
        if self.journal.len() > checkpoint.entries {
            let recording = std::mem::replace(&mut self.recording, false);
            while self.journal.len() > checkpoint.entries {
                let Some(entry) = self.journal.pop() else {
                    break;
                };
                self.revert(entry.event);
            }
            self.recording = recording;
        }

        let players = &self.players;
        let held = |id: PieceId| players.values().any(|player| player.has_captured(id));
        if self.board.forget_since(checkpoint.pieces, held) > 0 {
            self.turn_pieces = self.turn_pieces.min(self.board.piece_count());
            self.valid_moves = None;
        }
    }

    fn revert(&mut self, event: BoardEvent) {
        trace!("undo {event}");
        let result = match event {
            BoardEvent::Moved { piece, from, .. } => match self.board.piece_at(from) {
                Some(occupant) => Err(BoardError::Occupied { square: from, occupant }),
                None => self.board_mut().move_piece(piece, from).map(drop),
            },
            BoardEvent::Placed { piece, owner, square } if self.was_released(piece, owner) => {
                // Back into the captor's hand.
                self.board_mut().capture_at(square, owner).map(drop)
            }
            BoardEvent::Placed { square, .. } => self.board_mut().remove_at(square).map(drop),
            BoardEvent::Removed { piece, square, .. } => self.board_mut().place(piece, square),
            BoardEvent::OwnerChanged { piece, previous, .. } => self.board_mut().set_owner(piece, previous),
            // Re-placing the piece (its Removed event) returns it to play.
            BoardEvent::Captured { .. } => Ok(()),
        };
        if let Err(err) = result {
            error!("cannot undo {event}: {err}");
            panic!("turn journal out of step with the board: {err}");
        }
    }

    /// Check if the placement being undone dropped a capture: the entry
    /// before it handed the same piece to the placing side.
    fn was_released(&self, piece: PieceId, owner: Option<Color>) -> bool {
        matches!(
            self.journal.entries().last().map(|entry| entry.event),
            Some(BoardEvent::OwnerChanged { piece: changed, current, .. })
                if changed == piece && current == owner && owner.is_some()
        )
    }

    // === Captures ===

    /// Return a piece captured by `color` to the board under `color`'s
    /// ownership.
    ///
    /// The lowest-id capture of the named type is used.
    pub fn release_capture(
        &mut self,
        color: Color,
        type_name: &str,
        square: Square,
    ) -> Result<PieceId, GameError> {
        let id = self.players[color]
            .captures()
            .into_iter()
            .find(|&id| {
                self.board
                    .piece(id)
                    .is_ok_and(|piece| piece.piece_type().name() == type_name)
            })
            .ok_or_else(|| GameError::NoSuchCapture {
                color,
                piece_type: type_name.to_string(),
            })?;

        // Check the square first so a failed drop changes nothing.
        if let Some(occupant) = self.board.grid().at(square)?.copied() {
            return Err(BoardError::Occupied { square, occupant }.into());
        }
        self.board_mut().set_owner(id, Some(color))?;
        self.board_mut().place(id, square)?;
        debug!("{color} drops {type_name} on {square}");
        Ok(id)
    }

    // === Display ===

    /// Board diagram followed by the player to move.
    #[must_use]
    pub fn pretty_string(&self) -> String {
        format!("{}Current player: {}\n", self.board.pretty(), self.current)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("turn", &self.turn)
            .field("current", &self.current)
            .field("version", &self.version)
            .field("journal", &self.journal.len())
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        writeln!(f, "Current player: {}", self.current)
    }
}
