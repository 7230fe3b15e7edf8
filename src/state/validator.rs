//! Legality predicates.
//!
//! A `StateValidator` looks at the state *after* a candidate move has been
//! performed and decides whether the move is legal. Validators compose by
//! logical AND, in registration order.

use super::State;
use crate::pieces::Move;

/// Legality predicate over the post-move state.
pub trait StateValidator: Send + Sync {
    /// Return false to reject `mv`. `state` already reflects the move.
    fn validate(&self, state: &State, mv: &Move) -> bool;
}

impl<F> StateValidator for F
where
    F: Fn(&State, &Move) -> bool + Send + Sync,
{
    fn validate(&self, state: &State, mv: &Move) -> bool {
        self(state, mv)
    }
}
