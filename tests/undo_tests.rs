//! Turn journal and undo integration tests.
//!
//! These tests verify that undoing a turn restores the board, the players
//! and the journal exactly as they were at the start of the turn.

use std::sync::Arc;

use proptest::prelude::*;

use rust_boardgame::core::{Color, GameConfig, Offset, Square};
use rust_boardgame::pieces::{Motion, PieceId, PieceType};
use rust_boardgame::state::State;

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn rook_type() -> PieceType {
    PieceType::new("rook").with_motion(Motion::slide("slide", Offset::ORTHOGONAL.to_vec()))
}

fn new_state() -> (State, Arc<PieceType>) {
    let mut state = State::new(GameConfig::default()).unwrap();
    let rook = state.add_piece_type(rook_type());
    (state, rook)
}

type Snapshot = (Vec<(Square, PieceId)>, Vec<Option<Color>>, [Vec<PieceId>; 4]);

fn snapshot(state: &State) -> Snapshot {
    let placed = state
        .board()
        .placed()
        .filter_map(|(square, piece)| piece.id().map(|id| (square, id)))
        .collect();
    let owners = state.board().pieces().map(|p| p.owner()).collect();
    let white = state.player(Color::White);
    let black = state.player(Color::Black);
    (
        placed,
        owners,
        [white.pieces(), black.pieces(), white.captures(), black.captures()],
    )
}

// =============================================================================
// Single turn
// =============================================================================

/// Test that a simple move followed by undo restores everything.
#[test]
fn test_simple_move_undo() {
    let (mut state, rook) = new_state();
    let id = state.add_piece(&rook, Some(Color::White), sq("B2")).unwrap();
    let before = snapshot(&state);

    state.board_mut().move_piece(id, sq("B7")).unwrap();
    assert_ne!(snapshot(&state), before);

    state.undo_turn();
    assert_eq!(snapshot(&state), before);
    assert_eq!(state.board().piece(id).unwrap().square(), Some(sq("B2")));
    assert!(state.journal().is_empty());
}

/// Test that a capturing move followed by undo re-places the captured piece.
#[test]
fn test_capture_undo() {
    let (mut state, rook) = new_state();
    let white = state.add_piece(&rook, Some(Color::White), sq("B2")).unwrap();
    let black = state.add_piece(&rook, Some(Color::Black), sq("B7")).unwrap();
    let before = snapshot(&state);

    state.board_mut().move_piece(white, sq("B7")).unwrap();
    assert!(state.player(Color::White).has_captured(black));
    assert!(state.player(Color::Black).pieces().is_empty());

    state.undo_turn();
    assert_eq!(snapshot(&state), before);
    assert_eq!(state.board().piece(black).unwrap().square(), Some(sq("B7")));
}

/// Test that a two-capture chain unwinds with one undo.
#[test]
fn test_capture_chain_undo() {
    let (mut state, rook) = new_state();
    let a = state.add_piece(&rook, Some(Color::White), sq("A1")).unwrap();
    let b = state.add_piece(&rook, Some(Color::Black), sq("A5")).unwrap();
    let c = state.add_piece(&rook, Some(Color::Black), sq("E5")).unwrap();
    let before = snapshot(&state);

    state.board_mut().move_piece(a, sq("A5")).unwrap();
    state.board_mut().move_piece(a, sq("E5")).unwrap();
    assert_eq!(state.player(Color::White).captures(), vec![b, c]);

    state.undo_turn();
    assert_eq!(snapshot(&state), before);
    assert_eq!(state.board().piece_at(sq("A1")), Some(a));
    assert_eq!(state.board().piece_at(sq("A5")), Some(b));
    assert_eq!(state.board().piece_at(sq("E5")), Some(c));
}

/// Test that undoing a replace restores the evicted piece.
#[test]
fn test_replace_undo() {
    let (mut state, rook) = new_state();
    let a = state.add_piece(&rook, Some(Color::White), sq("A1")).unwrap();
    let target = state.add_piece(&rook, Some(Color::Black), sq("D4")).unwrap();
    state.finish_setup();
    let before = snapshot(&state);

    let newcomer = state.board_mut().add_piece(rust_boardgame::pieces::Piece::new(
        Arc::clone(&rook),
        Some(Color::White),
    ));
    state.board_mut().replace(newcomer, sq("D4")).unwrap();
    assert_eq!(state.board().piece_at(sq("D4")), Some(newcomer));

    state.undo_turn();
    assert_eq!(state.board().piece_at(sq("D4")), Some(target));
    assert_eq!(state.board().piece_at(sq("A1")), Some(a));
    // Registered during the turn, so forgotten with it.
    assert!(state.board().piece(newcomer).is_err());
    assert_eq!(state.board().piece_count(), 2);
    let (placed, _, players) = snapshot(&state);
    assert_eq!((placed, players), (before.0, before.2));
}

/// Test that undo with an empty journal does nothing.
#[test]
fn test_undo_empty_journal() {
    let (mut state, rook) = new_state();
    state.add_piece(&rook, Some(Color::White), sq("A1")).unwrap();
    let before = snapshot(&state);
    let version = state.version();

    state.undo_turn();
    assert_eq!(snapshot(&state), before);
    assert_eq!(state.version(), version);
}

// =============================================================================
// Across turns
// =============================================================================

/// Test that only the current turn is undone.
#[test]
fn test_undo_only_current_turn() {
    let (mut state, rook) = new_state();
    let white = state.add_piece(&rook, Some(Color::White), sq("A1")).unwrap();
    let black = state.add_piece(&rook, Some(Color::Black), sq("H8")).unwrap();

    state.board_mut().move_piece(white, sq("A4")).unwrap();
    state.end_turn();
    let after_first = snapshot(&state);

    state.board_mut().move_piece(black, sq("H4")).unwrap();
    state.board_mut().move_piece(black, sq("A4")).unwrap();
    state.undo_turn();

    assert_eq!(snapshot(&state), after_first);
    assert_eq!(state.journal().len(), 1);

    // The previous turn is history; a second undo in this turn has nothing to do.
    state.undo_turn();
    assert_eq!(snapshot(&state), after_first);
}

/// Test that a released capture goes back to its captor on undo.
#[test]
fn test_release_capture_undo() {
    let (mut state, rook) = new_state();
    let white = state.add_piece(&rook, Some(Color::White), sq("A1")).unwrap();
    let black = state.add_piece(&rook, Some(Color::Black), sq("A8")).unwrap();
    state.board_mut().move_piece(white, sq("A8")).unwrap();
    state.end_turn();
    state.end_turn();

    state.release_capture(Color::White, "rook", sq("D4")).unwrap();
    assert_eq!(state.board().piece(black).unwrap().owner(), Some(Color::White));

    state.undo_turn();
    let piece = state.board().piece(black).unwrap();
    assert!(!piece.is_on_board());
    assert_eq!(piece.owner(), Some(Color::Black));
    assert!(state.player(Color::White).has_captured(black));
    assert!(!state.player(Color::White).owns(black));
}

/// Test that the derived record attaches captures to their moves.
#[test]
fn test_record() {
    let (mut state, rook) = new_state();
    let white = state.add_piece(&rook, Some(Color::White), sq("A1")).unwrap();
    let black = state.add_piece(&rook, Some(Color::Black), sq("A8")).unwrap();

    state.board_mut().move_piece(white, sq("A3")).unwrap();
    state.end_turn();
    state.board_mut().move_piece(black, sq("A3")).unwrap();

    let record = state.record();
    assert_eq!(record.len(), 2);
    assert_eq!((record[0].turn, record[0].from, record[0].to), (1, sq("A1"), sq("A3")));
    assert!(record[0].captures.is_empty());
    assert_eq!(record[1].turn, 2);
    assert_eq!(record[1].captures.len(), 1);
    assert_eq!(record[1].captures[0].piece, white);
    assert_eq!(record[1].captures[0].by, Some(Color::Black));
}

// =============================================================================
// Properties
// =============================================================================

fn square_strategy() -> impl Strategy<Value = Square> {
    (1..=8i32, 1..=8i32).prop_map(|(file, rank)| Square::new(file, rank))
}

proptest! {
    /// Any sequence of moves within one turn undoes to the turn start.
    #[test]
    fn prop_moves_undo_to_turn_start(
        steps in prop::collection::vec((0..4usize, square_strategy()), 1..12)
    ) {
        let (mut state, rook) = new_state();
        let ids = [
            state.add_piece(&rook, Some(Color::White), sq("A1")).unwrap(),
            state.add_piece(&rook, Some(Color::White), sq("C3")).unwrap(),
            state.add_piece(&rook, Some(Color::Black), sq("F6")).unwrap(),
            state.add_piece(&rook, Some(Color::Black), sq("H8")).unwrap(),
        ];
        let before = snapshot(&state);

        for (index, to) in steps {
            // Failures (captured movers, same square) leave the board as is.
            let _ = state.board_mut().move_piece(ids[index], to);
        }
        state.undo_turn();

        prop_assert_eq!(snapshot(&state), before);
        prop_assert!(state.journal().is_empty());
    }
}
