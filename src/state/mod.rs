//! Game state: board, players, turn journal and move validation.
//!
//! - `State`: owns everything and routes board events to players and journal
//! - `Player`: one side's live pieces and captures, derived from events
//! - `TurnJournal`: turn-tagged event log used for undo
//! - `StateValidator`: legality predicates over post-move states

pub mod journal;
pub mod player;
#[allow(clippy::module_inception)]
pub mod state;
pub mod validator;

pub use journal::{CapturedPiece, JournalEntry, RecordedMove, TurnJournal};
pub use player::Player;
pub use state::{BoardMut, Checkpoint, State};
pub use validator::StateValidator;
