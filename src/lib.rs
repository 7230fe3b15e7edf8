//! # rust-boardgame
//!
//! A general-purpose engine for chess-like board games.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: No hardcoded piece types, boards or win conditions.
//!    Games supply motions, validators and a `Controller`.
//!
//! 2. **Event-Sourced**: The piece board is the single source of truth.
//!    Pieces, players and the turn journal change only in reaction to the
//!    board events they observe.
//!
//! 3. **Decisions as Trees**: Every turn decision, however many steps it
//!    takes, is an `OptionNode` tree; one route through it is one turn.
//!
//! ## Architecture
//!
//! - **Speculative Validation**: Candidate moves are performed on the live
//!   state, checked by validators and undone through the turn journal. A
//!   clone-per-candidate strategy is available through `GameConfig`.
//!
//! - **Persistent Data Structures**: The journal uses `im-rs` so state
//!   snapshots stay cheap.
//!
//! ## Modules
//!
//! - `core`: Squares, colours, configuration, RNG, errors
//! - `board`: The generic grid and the event-emitting piece board
//! - `events`: Board events and the event bus
//! - `pieces`: Pieces, piece types, motions and moves
//! - `options`: Option trees for multi-step turn decisions
//! - `state`: Players, turn journal, validators and the game state
//! - `rules`: The `Controller` capability and the `Game` façade
//! - `games`: Ready-made rule sets

pub mod core;
pub mod board;
pub mod events;
pub mod pieces;
pub mod options;
pub mod state;
pub mod rules;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    Square, Offset,
    Color, ColorMap,
    GameConfig, ValidationStrategy, RuleFailurePolicy,
    GameRng,
    BoardError, SquareParseError, RuleError, GameError,
};

pub use crate::board::{Board, BoardId, PieceBoard};

pub use crate::events::{BoardEvent, EventBus, Observer};

pub use crate::pieces::{Motion, Move, MoveGroup, Piece, PieceId, PieceType};

pub use crate::options::{
    Choice, ChoiceKind,
    MoveOption, OptionKind, OptionValue, Route,
    ChoiceNode, MessageNode, OptionNode, OptionVisitor,
};

pub use crate::state::{BoardMut, Checkpoint, Player, RecordedMove, State, StateValidator, TurnJournal};

pub use crate::rules::{Controller, Game, Resolution};
