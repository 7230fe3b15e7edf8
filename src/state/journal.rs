//! The turn journal.
//!
//! An append-only log of board events tagged with the turn they happened
//! in. It exists so a turn can be undone; `records` derives a move history
//! from it for display.
//!
//! ## Setup
//!
//! Board edits made before the first move of the first turn are setup, not
//! play, and are not journaled. A batch of events (one board operation)
//! containing a `Moved` event is always journaled. `finish_setup` ends the
//! setup phase explicitly for games whose first turn is not a move.

use im::Vector;
use serde::Serialize;
use smallvec::SmallVec;

use crate::core::{Color, Square};
use crate::events::BoardEvent;
use crate::pieces::PieceId;

/// A journaled event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub turn: u32,
    pub event: BoardEvent,
}

/// A captured piece attached to a recorded move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CapturedPiece {
    pub piece: PieceId,
    pub square: Square,
    pub by: Option<Color>,
}

/// One move of the game history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordedMove {
    pub turn: u32,
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
    pub captures: SmallVec<[CapturedPiece; 2]>,
}

/// Turn-tagged event log.
#[derive(Clone, Debug)]
pub struct TurnJournal {
    entries: Vector<JournalEntry>,
    first_turn: u32,
    setup_finished: bool,
}

impl TurnJournal {
    /// Create an empty journal for a game starting at `first_turn`.
    #[must_use]
    pub fn new(first_turn: u32) -> Self {
        Self {
            entries: Vector::new(),
            first_turn,
            setup_finished: false,
        }
    }

    /// Check if board edits are still treated as setup.
    #[must_use]
    pub fn in_setup(&self, turn: u32) -> bool {
        !self.setup_finished && turn == self.first_turn && self.entries.is_empty()
    }

    /// End the setup phase.
    pub fn finish_setup(&mut self) {
        self.setup_finished = true;
    }

    /// Journal the events of one board operation.
    ///
    /// Returns false if the batch was skipped as setup.
    pub fn record_batch(&mut self, turn: u32, events: &[BoardEvent]) -> bool {
        let has_move = events.iter().any(|e| matches!(e, BoardEvent::Moved { .. }));
        if self.in_setup(turn) && !has_move {
            return false;
        }
        for &event in events {
            self.entries.push_back(JournalEntry { turn, event });
        }
        true
    }

    /// Remove and return the newest entry.
    pub fn pop(&mut self) -> Option<JournalEntry> {
        self.entries.pop_back()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the journal is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first. Cloning is O(1).
    #[must_use]
    pub fn entries(&self) -> &Vector<JournalEntry> {
        &self.entries
    }

    /// Number of trailing entries belonging to `turn`.
    #[must_use]
    pub fn trailing(&self, turn: u32) -> usize {
        self.entries.iter().rev().take_while(|e| e.turn == turn).count()
    }

    /// Move history derived from the journal.
    ///
    /// A capture on the square a following move lands on belongs to that
    /// move; any other capture belongs to the latest move of its turn.
    #[must_use]
    pub fn records(&self) -> Vec<RecordedMove> {
        let mut records: Vec<RecordedMove> = Vec::new();
        let mut pending: Vec<(u32, CapturedPiece)> = Vec::new();

        fn attach(records: &mut [RecordedMove], turn: u32, capture: CapturedPiece) -> bool {
            match records.last_mut() {
                Some(last) if last.turn == turn => {
                    last.captures.push(capture);
                    true
                }
                _ => false,
            }
        }

        for entry in &self.entries {
            match entry.event {
                BoardEvent::Captured { piece, by, from, .. } => {
                    pending.push((entry.turn, CapturedPiece { piece, square: from, by }));
                }
                BoardEvent::Moved { piece, from, to, .. } => {
                    let mut own = SmallVec::new();
                    for (turn, capture) in pending.drain(..) {
                        if turn == entry.turn && capture.square == to {
                            own.push(capture);
                        } else if !attach(&mut records, turn, capture) {
                            own.push(capture);
                        }
                    }
                    records.push(RecordedMove {
                        turn: entry.turn,
                        piece,
                        from,
                        to,
                        captures: own,
                    });
                }
                _ => {}
            }
        }
        for (turn, capture) in pending {
            attach(&mut records, turn, capture);
        }
        records
    }
}
