//! Game configuration.
//!
//! Games configure the engine at startup with a `GameConfig`:
//! - board dimensions
//! - which colour moves first and the number of the first turn
//! - how legality is probed (`ValidationStrategy`)
//! - what happens when a rule callback fails mid-turn (`RuleFailurePolicy`)
//!
//! The engine never hardcodes piece types or rules - games define them.

use serde::{Deserialize, Serialize};

use super::color::Color;

/// How `State::valid_moves` probes a candidate move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStrategy {
    /// Perform the candidate on the live state, validate, then undo it.
    #[default]
    Speculative,
    /// Perform the candidate on a clone of the state; the live state is never touched.
    Snapshot,
}

/// What `Game::play_turn` does when a rule callback fails after the
/// structural move has already been applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleFailurePolicy {
    /// Undo everything the failed turn did before returning the error.
    #[default]
    Rollback,
    /// Leave the board as the failed turn left it.
    KeepPartial,
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of files.
    pub width: i32,

    /// Number of ranks.
    pub height: i32,

    /// Colour to move on the first turn.
    pub first_player: Color,

    /// Number of the first turn.
    pub first_turn: u32,

    /// Legality probing strategy.
    pub validation: ValidationStrategy,

    /// Behaviour on rule callback failure during `play_turn`.
    pub on_rule_failure: RuleFailurePolicy,
}

impl GameConfig {
    /// Create a configuration for a `width` x `height` board.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            first_player: Color::White,
            first_turn: 1,
            validation: ValidationStrategy::default(),
            on_rule_failure: RuleFailurePolicy::default(),
        }
    }

    /// Set the colour that moves first.
    #[must_use]
    pub fn with_first_player(mut self, color: Color) -> Self {
        self.first_player = color;
        self
    }

    /// Set the number of the first turn.
    #[must_use]
    pub fn with_first_turn(mut self, turn: u32) -> Self {
        self.first_turn = turn;
        self
    }

    /// Set the validation strategy.
    #[must_use]
    pub fn with_validation(mut self, strategy: ValidationStrategy) -> Self {
        self.validation = strategy;
        self
    }

    /// Set the rule failure policy.
    #[must_use]
    pub fn with_rule_failure_policy(mut self, policy: RuleFailurePolicy) -> Self {
        self.on_rule_failure = policy;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(8, 8)
    }
}
