//! Game façade integration tests.
//!
//! These tests drive whole turns through `Game`: building turn options,
//! replaying routes, rule failures and game resolution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rust_boardgame::core::{
    Color, GameConfig, GameError, GameRng, Offset, RuleError, RuleFailurePolicy, Square,
};
use rust_boardgame::games::classic::{self, ClassicController, ClassicGameBuilder};
use rust_boardgame::options::{Choice, MoveOption, OptionValue, Route};
use rust_boardgame::pieces::{Motion, PieceType};
use rust_boardgame::rules::{Controller, Game, Resolution};
use rust_boardgame::state::State;

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn move_option(state: &State, from: &str, to: &str) -> OptionValue {
    let piece = state.board().piece_at(sq(from)).unwrap();
    OptionValue::Move(MoveOption { piece, from: sq(from), to: sq(to) })
}

/// A rook-only game whose controller asks for a move then a confirmation.
struct ConfirmingController {
    seen: Arc<AtomicUsize>,
    fail: bool,
}

impl Controller for ConfirmingController {
    fn turn_choice(&self, _state: &State) -> Option<Choice> {
        Some(Choice::moves("move").then(Choice::unit("confirm")))
    }

    fn turn(&self, _state: &mut State, route: &[OptionValue]) -> Result<(), RuleError> {
        self.seen.store(route.len(), Ordering::SeqCst);
        if self.fail {
            return Err(RuleError::new("the referee objects"));
        }
        Ok(())
    }

    fn resolution(&self, _state: &State) -> Resolution {
        Resolution::ongoing()
    }
}

fn rook_game(fail: bool, policy: RuleFailurePolicy) -> (Game, Arc<AtomicUsize>) {
    let config = GameConfig::new(4, 4).with_rule_failure_policy(policy);
    let mut state = State::new(config).unwrap();
    let rook = state.add_piece_type(
        PieceType::new("rook").with_motion(Motion::slide("slide", Offset::ORTHOGONAL.to_vec())),
    );
    state.add_piece(&rook, Some(Color::White), sq("A1")).unwrap();
    state.add_piece(&rook, Some(Color::Black), sq("D4")).unwrap();
    let seen = Arc::new(AtomicUsize::new(0));
    let controller = ConfirmingController { seen: Arc::clone(&seen), fail };
    (Game::new(state, controller), seen)
}

// =============================================================================
// Turn options
// =============================================================================

/// Test the opening options of classic chess.
#[test]
fn test_classic_opening_options() {
    let mut game = ClassicGameBuilder::new().build().unwrap();
    let options = game.turn_options();
    assert_eq!(options.message(), Some(classic::TURN_PROMPT));
    assert_eq!(options.route_count(), 20);
}

/// Test that turn options are reused until the state changes.
#[test]
fn test_turn_options_cached_per_version() {
    let (mut game, _) = rook_game(false, RuleFailurePolicy::Rollback);
    let first = game.turn_options().clone();
    let version = game.state().version();
    assert_eq!(game.turn_options(), &first);
    assert_eq!(game.state().version(), version);

    game.state_mut().end_turn();
    assert_ne!(game.turn_options(), &first);
}

/// Test that follow-up choices hang under every move.
#[test]
fn test_move_then_confirm() {
    let (mut game, _) = rook_game(false, RuleFailurePolicy::Rollback);
    // Six rook moves, each followed by one confirmation.
    assert_eq!(game.turn_options().route_count(), 6);
    assert!(game.turn_options().all_routes().all(|route| route.len() == 2));
}

// =============================================================================
// Playing turns
// =============================================================================

/// Test that a played route moves the piece and ends the turn.
#[test]
fn test_play_turn() {
    let (mut game, seen) = rook_game(false, RuleFailurePolicy::Rollback);
    let route = vec![move_option(game.state(), "A1", "A3"), OptionValue::Unit];
    game.play_turn(&route).unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert!(game.state().board().piece_at(sq("A3")).is_some());
    assert_eq!(game.state().current_color(), Color::Black);
    assert_eq!(game.state().turn_number(), 2);
    assert_eq!(game.state().record().len(), 1);
}

/// Test that an incomplete or unknown route is rejected without effect.
#[test]
fn test_invalid_route() {
    let (mut game, seen) = rook_game(false, RuleFailurePolicy::Rollback);
    let before = game.state().board().to_string();

    let incomplete = vec![move_option(game.state(), "A1", "A3")];
    assert!(matches!(game.play_turn(&incomplete), Err(GameError::InvalidRoute(_))));

    let off_tree = vec![move_option(game.state(), "A1", "B2"), OptionValue::Unit];
    assert!(matches!(game.play_turn(&off_tree), Err(GameError::InvalidRoute(_))));

    assert_eq!(game.state().board().to_string(), before);
    assert_eq!(seen.load(Ordering::SeqCst), 0);
    assert_eq!(game.state().current_color(), Color::White);
}

/// Test that a failing controller turn is rolled back by default.
#[test]
fn test_rule_failure_rolls_back() {
    let (mut game, _) = rook_game(true, RuleFailurePolicy::Rollback);
    let before = game.state().board().to_string();
    let route = vec![move_option(game.state(), "A1", "D1"), OptionValue::Unit];

    let err = game.play_turn(&route).unwrap_err();
    assert_eq!(err, GameError::Rule(RuleError::new("the referee objects")));
    assert_eq!(game.state().board().to_string(), before);
    assert_eq!(game.state().current_color(), Color::White);
    assert!(game.state().journal().is_empty());
}

/// Test that a failing controller turn can keep its partial effects.
#[test]
fn test_rule_failure_keeps_partial() {
    let (mut game, _) = rook_game(true, RuleFailurePolicy::KeepPartial);
    let route = vec![move_option(game.state(), "A1", "D1"), OptionValue::Unit];

    assert!(game.play_turn(&route).is_err());
    assert!(game.state().board().piece_at(sq("D1")).is_some());
    assert!(game.state().board().piece_at(sq("A1")).is_none());
    assert_eq!(game.state().current_color(), Color::White);

    // The partial turn can still be undone by hand.
    game.state_mut().undo_turn();
    assert!(game.state().board().piece_at(sq("A1")).is_some());
}

/// Test promotion through a piece-type choice under the move.
#[test]
fn test_promotion_route() {
    let mut game = ClassicGameBuilder::new().empty_board().build().unwrap();
    {
        let state = game.state_mut();
        let pawn = state.piece_type(classic::PAWN).unwrap();
        let king = state.piece_type(classic::KING).unwrap();
        state.add_piece(&pawn, Some(Color::White), sq("A7")).unwrap();
        state.add_piece(&king, Some(Color::White), sq("C1")).unwrap();
        state.add_piece(&king, Some(Color::Black), sq("H5")).unwrap();
    }

    let push = move_option(game.state(), "A7", "A8");
    let promotions: Vec<Route> = game
        .turn_options()
        .all_routes()
        .filter(|route| route[0] == push)
        .collect();
    assert_eq!(promotions.len(), 4);

    let queen = game.state().piece_type(classic::QUEEN).unwrap();
    game.play_turn(&[push, OptionValue::PieceType(queen)]).unwrap();

    let promoted = game.state().piece_at(sq("A8")).unwrap();
    assert_eq!(promoted.piece_type().name(), classic::QUEEN);
    assert_eq!(promoted.owner(), Some(Color::White));
    assert_eq!(game.state().player(Color::White).piece_count(), 2);
}

// =============================================================================
// Resolution
// =============================================================================

/// Test that a player without options is stalemated.
#[test]
fn test_stalemate() {
    let config = GameConfig::default().with_first_player(Color::Black);
    let mut game = ClassicGameBuilder::new().config(config).empty_board().build().unwrap();
    {
        let state = game.state_mut();
        let king = state.piece_type(classic::KING).unwrap();
        let queen = state.piece_type(classic::QUEEN).unwrap();
        state.add_piece(&king, Some(Color::Black), sq("H8")).unwrap();
        state.add_piece(&queen, Some(Color::White), sq("G6")).unwrap();
        state.add_piece(&king, Some(Color::White), sq("F7")).unwrap();
    }

    assert!(!classic::king_in_check(game.state(), Color::Black));
    assert!(game.turn_options().is_empty());
    assert_eq!(game.resolution(), Resolution::draw());
}

/// Test that the controller decides checkmate.
#[test]
fn test_checkmate() {
    let config = GameConfig::default().with_first_player(Color::Black);
    let mut game = ClassicGameBuilder::new().config(config).empty_board().build().unwrap();
    {
        let state = game.state_mut();
        let king = state.piece_type(classic::KING).unwrap();
        let rook = state.piece_type(classic::ROOK).unwrap();
        state.add_piece(&king, Some(Color::Black), sq("H8")).unwrap();
        state.add_piece(&rook, Some(Color::White), sq("A8")).unwrap();
        state.add_piece(&rook, Some(Color::White), sq("B7")).unwrap();
        state.add_piece(&king, Some(Color::White), sq("E1")).unwrap();
    }

    assert_eq!(ClassicController.resolution(game.state()), Resolution::won_by(Color::White));
    assert_eq!(game.resolution(), Resolution::won_by(Color::White));
}

/// Test that random playouts are reproducible from a seed.
#[test]
fn test_random_playout_deterministic() {
    fn playout(mut rng: GameRng) -> Vec<Route> {
        let mut game = ClassicGameBuilder::new().build().unwrap();
        let mut routes = Vec::new();
        for _ in 0..6 {
            if game.resolution().is_ended() {
                break;
            }
            match game.play_random_turn(&mut rng).unwrap() {
                Some(route) => routes.push(route),
                None => break,
            }
        }
        routes
    }

    let mut master = GameRng::new(11);
    let first = playout(master.fork());
    let second = playout(master.fork());
    assert_eq!(first.len(), 6);

    // Replaying the same forks gives the same games.
    let mut again = GameRng::new(11);
    assert_eq!(playout(again.fork()), first);
    assert_eq!(playout(again.fork()), second);
}
