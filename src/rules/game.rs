//! The game façade.
//!
//! `Game` pairs a `State` with a `Controller` and drives whole turns:
//!
//! 1. `turn_options` builds the option tree of the current turn from the
//!    controller's turn choice and the state's valid moves.
//! 2. `play_turn` replays one route of that tree: every move option is
//!    resolved against the valid moves and performed with the sub-options
//!    that follow it, then the controller's `turn` runs, then the turn ends.
//! 3. `resolution` asks the controller whether the game is over.

use log::{debug, warn};

use super::controller::{Controller, Resolution};
use crate::core::{GameError, GameRng, RuleFailurePolicy};
use crate::options::{OptionNode, OptionValue, Route};
use crate::state::State;

/// A game in progress.
pub struct Game {
    state: State,
    controller: Box<dyn Controller>,
    /// Turn options and the state version they were built for.
    options: Option<(u64, OptionNode)>,
}

impl Game {
    /// Create a game from a prepared state and a rule provider.
    pub fn new(state: State, controller: impl Controller + 'static) -> Self {
        Self {
            state,
            controller: Box::new(controller),
            options: None,
        }
    }

    /// The game state.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Mutable access to the game state.
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// The rule provider.
    #[must_use]
    pub fn controller(&self) -> &dyn Controller {
        self.controller.as_ref()
    }

    /// Option tree of the current turn.
    ///
    /// Rebuilt only when the state has changed since the last call.
    pub fn turn_options(&mut self) -> &OptionNode {
        let version = self.state.version();
        let fresh = matches!(&self.options, Some((built, _)) if *built == version);
        if !fresh {
            let tree = match self.controller.turn_choice(&self.state) {
                None => OptionNode::empty(),
                Some(choice) => OptionNode::from_choice(&choice, self.state.valid_moves()),
            };
            debug!(
                "turn {}: {} route(s) for {}",
                self.state.turn_number(),
                tree.route_count(),
                self.state.current_color()
            );
            self.options = Some((self.state.version(), tree));
        }
        let (_, tree) = self
            .options
            .get_or_insert_with(|| (version, OptionNode::empty()));
        tree
    }

    /// Play one complete route of the current turn's options.
    ///
    /// On failure the configured `RuleFailurePolicy` decides whether the
    /// moves already performed are undone. The turn does not end.
    pub fn play_turn(&mut self, route: &[OptionValue]) -> Result<(), GameError> {
        if !self.turn_options().contains_route(route) {
            return Err(GameError::InvalidRoute(describe(route)));
        }
        // Whatever the turn does is play, not setup.
        self.state.finish_setup();
        let checkpoint = self.state.checkpoint();

        match self.replay(route) {
            Ok(()) => {
                self.state.end_turn();
                Ok(())
            }
            Err(err) => {
                warn!("turn {} failed: {err}", self.state.turn_number());
                if self.state.config().on_rule_failure == RuleFailurePolicy::Rollback {
                    self.state.undo_to(checkpoint);
                }
                Err(err)
            }
        }
    }

    fn replay(&mut self, route: &[OptionValue]) -> Result<(), GameError> {
        let mut index = 0;
        while index < route.len() {
            let Some(option) = route[index].as_move() else {
                index += 1;
                continue;
            };
            let group = self
                .state
                .valid_moves()
                .iter()
                .find(|g| g.piece() == option.piece && g.from() == option.from && g.to() == option.to)
                .cloned()
                .ok_or(GameError::MoveNotAvailable {
                    from: option.from,
                    to: option.to,
                })?;

            let rest = &route[index + 1..];
            let taken = match group.choices() {
                Some(tree) => tree
                    .walk_prefix(rest)
                    .ok_or_else(|| GameError::InvalidRoute(describe(route)))?,
                None => 0,
            };
            let mv = group
                .move_for(&rest[..taken])
                .ok_or_else(|| GameError::InvalidRoute(describe(route)))?;
            debug!("{}: {mv}", self.state.current_color());
            mv.perform(&mut self.state)?;
            index += 1 + taken;
        }
        self.controller.turn(&mut self.state, route)?;
        Ok(())
    }

    /// Whether the game is over.
    ///
    /// A player left with no turn options at all is stalemated: the game
    /// ends without a winner unless the controller already decided it.
    pub fn resolution(&mut self) -> Resolution {
        let resolution = self.controller.resolution(&self.state);
        if resolution.is_ended() {
            return resolution;
        }
        if self.turn_options().is_empty() {
            debug!("{} has no options: stalemate", self.state.current_color());
            return Resolution::draw();
        }
        resolution
    }

    /// Play a uniformly sampled route of the current turn.
    ///
    /// Returns the route played, or `None` if there was nothing to play.
    pub fn play_random_turn(&mut self, rng: &mut GameRng) -> Result<Option<Route>, GameError> {
        let Some(route) = self.turn_options().sample_route(rng) else {
            return Ok(None);
        };
        self.play_turn(&route)?;
        Ok(Some(route))
    }
}

fn describe(route: &[OptionValue]) -> String {
    let parts: Vec<String> = route.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
