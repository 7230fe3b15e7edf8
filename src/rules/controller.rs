//! The rule-provider capability.
//!
//! A `Controller` supplies the game-specific parts of a turn that pieces
//! and validators cannot express on their own:
//! - The first-level decision of each turn (`turn_choice`)
//! - Custom logic after the chosen moves are performed (`turn`)
//! - Whether the game is over and who won (`resolution`)

use serde::{Deserialize, Serialize};

use crate::core::{Color, RuleError};
use crate::options::{Choice, OptionValue};
use crate::state::State;

/// Outcome of the game so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    /// The game is over.
    pub ended: bool,
    /// The winner, if the game ended with one.
    pub winner: Option<Color>,
}

impl Resolution {
    /// The game goes on.
    #[must_use]
    pub const fn ongoing() -> Self {
        Self {
            ended: false,
            winner: None,
        }
    }

    /// The game is over and `color` won.
    #[must_use]
    pub const fn won_by(color: Color) -> Self {
        Self {
            ended: true,
            winner: Some(color),
        }
    }

    /// The game is over without a winner.
    #[must_use]
    pub const fn draw() -> Self {
        Self {
            ended: true,
            winner: None,
        }
    }

    /// Check if the game is over.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }
}

/// Game rules supplied from outside the engine.
///
/// ## Implementation Notes
///
/// - `turn_choice`: return `None` if the current player has nothing to decide
/// - `turn`: runs after every move of the route is performed, before the
///   turn ends; an error fails the whole turn
/// - `resolution`: must not assume the current player can move
pub trait Controller: Send + Sync {
    /// The first-level decision of the current turn.
    fn turn_choice(&self, state: &State) -> Option<Choice>;

    /// Custom turn logic, given the complete route the player chose.
    fn turn(&self, state: &mut State, route: &[OptionValue]) -> Result<(), RuleError> {
        let _ = (state, route);
        Ok(())
    }

    /// Whether the game is over.
    fn resolution(&self, state: &State) -> Resolution;
}
