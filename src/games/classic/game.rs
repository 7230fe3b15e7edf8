//! Classic chess rules: king safety, checkmate and the standard setup.

use log::debug;

use super::pieces::{bishop, king, knight, pawn, queen, rook, BISHOP, KING, KNIGHT, PAWN, QUEEN, ROOK};
use crate::core::{BoardError, Color, GameConfig, GameError, Square};
use crate::options::Choice;
use crate::pieces::Move;
use crate::rules::{Controller, Game, Resolution};
use crate::state::State;

/// Prompt of the first-level turn decision.
pub const TURN_PROMPT: &str = "Move a piece";

const BACK_RANK: [&str; 8] = [ROOK, KNIGHT, BISHOP, QUEEN, KING, BISHOP, KNIGHT, ROOK];

/// Check if any king of `color` stands on an attacked square.
#[must_use]
pub fn king_in_check(state: &State, color: Color) -> bool {
    let kings: Vec<Square> = state
        .board()
        .placed()
        .filter(|(_, piece)| piece.is_owned_by(color) && piece.piece_type().name() == KING)
        .map(|(square, _)| square)
        .collect();
    if kings.is_empty() {
        return false;
    }
    let attacked = state.attacked_squares(color.opponent());
    kings.iter().any(|king| attacked.contains(king))
}

/// Validator: a move must not leave the mover's own king in check.
#[must_use]
pub fn king_safety(state: &State, mv: &Move) -> bool {
    let Ok(piece) = state.board().piece(mv.piece()) else {
        return true;
    };
    match piece.owner() {
        Some(color) => !king_in_check(state, color),
        None => true,
    }
}

/// Register the six orthodox piece types and the king-safety validator.
pub fn install(state: &mut State) {
    let queen = state.add_piece_type(queen());
    let rook = state.add_piece_type(rook());
    let bishop = state.add_piece_type(bishop());
    let knight = state.add_piece_type(knight());
    state.add_piece_type(king());
    state.add_piece_type(pawn(vec![queen, rook, bishop, knight]));
    state.add_validator(king_safety);
}

/// Place both armies in the standard opening position.
///
/// The board must be eight files wide and at least four ranks high.
pub fn setup_standard(state: &mut State) -> Result<(), GameError> {
    let (width, height) = (state.board().width(), state.board().height());
    if width != 8 || height < 4 {
        return Err(BoardError::InvalidDimensions {
            width: i64::from(width),
            height: i64::from(height),
        }
        .into());
    }
    let pawn = state.piece_type(PAWN)?;
    for (file, name) in (1..).zip(BACK_RANK) {
        let officer = state.piece_type(name)?;
        state.add_piece(&officer, Some(Color::White), Square::new(file, 1))?;
        state.add_piece(&pawn, Some(Color::White), Square::new(file, 2))?;
        state.add_piece(&pawn, Some(Color::Black), Square::new(file, height - 1))?;
        state.add_piece(&officer, Some(Color::Black), Square::new(file, height))?;
    }
    Ok(())
}

/// Rule provider for classic chess.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassicController;

impl Controller for ClassicController {
    fn turn_choice(&self, _state: &State) -> Option<Choice> {
        Some(Choice::moves(TURN_PROMPT))
    }

    fn resolution(&self, state: &State) -> Resolution {
        let color = state.current_color();
        if !king_in_check(state, color) {
            return Resolution::ongoing();
        }
        // Probe a copy: the live state is not ours to mutate here.
        let mut probe = state.clone();
        if probe.valid_moves().is_empty() {
            debug!("{color} is checkmated");
            Resolution::won_by(color.opponent())
        } else {
            Resolution::ongoing()
        }
    }
}

/// Builder for classic chess games.
pub struct ClassicGameBuilder {
    config: GameConfig,
    standard_position: bool,
}

impl Default for ClassicGameBuilder {
    fn default() -> Self {
        Self {
            config: GameConfig::default(),
            standard_position: true,
        }
    }
}

impl ClassicGameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from an empty board instead of the standard position.
    #[must_use]
    pub fn empty_board(mut self) -> Self {
        self.standard_position = false;
        self
    }

    /// Build the game.
    pub fn build(self) -> Result<Game, GameError> {
        let mut state = State::new(self.config)?;
        install(&mut state);
        if self.standard_position {
            setup_standard(&mut state)?;
        }
        Ok(Game::new(state, ClassicController))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{MoveOption, OptionValue};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, from: &str, to: &str) {
        let piece = game.state().board().piece_at(sq(from)).unwrap();
        let route = vec![OptionValue::Move(MoveOption {
            piece,
            from: sq(from),
            to: sq(to),
        })];
        game.play_turn(&route).unwrap();
    }

    #[test]
    fn test_standard_position() {
        let mut game = ClassicGameBuilder::new().build().unwrap();
        assert_eq!(game.state().player(Color::White).piece_count(), 16);
        assert_eq!(game.state().player(Color::Black).piece_count(), 16);
        assert_eq!(game.state_mut().valid_moves().len(), 20);
        assert_eq!(game.turn_options().len(), 20);
        assert!(game.state().journal().is_empty());
    }

    #[test]
    fn test_standard_position_needs_eight_files() {
        let result = ClassicGameBuilder::new().config(GameConfig::new(6, 6)).build();
        assert!(matches!(
            result,
            Err(GameError::Board(BoardError::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn test_fools_mate() {
        let mut game = ClassicGameBuilder::new().build().unwrap();
        play(&mut game, "F2", "F3");
        play(&mut game, "E7", "E5");
        play(&mut game, "G2", "G4");
        assert_eq!(game.resolution(), Resolution::ongoing());
        play(&mut game, "D8", "H4");

        assert!(king_in_check(game.state(), Color::White));
        assert_eq!(game.resolution(), Resolution::won_by(Color::Black));
    }

    #[test]
    fn test_controller_turn_choice() {
        let state = State::new(GameConfig::default()).unwrap();
        let choice = ClassicController.turn_choice(&state).unwrap();
        assert_eq!(choice.message, TURN_PROMPT);
    }
}
