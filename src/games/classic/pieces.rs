//! Orthodox chess pieces.

use std::sync::Arc;

use crate::core::{Offset, RuleError, Square};
use crate::options::{Choice, OptionValue};
use crate::pieces::{Motion, Move, Piece, PieceType};
use crate::state::State;

pub const ROOK: &str = "rook";
pub const KNIGHT: &str = "knight";
pub const BISHOP: &str = "bishop";
pub const QUEEN: &str = "queen";
pub const KING: &str = "king";
pub const PAWN: &str = "pawn";

/// Prompt offered when a pawn reaches the last rank.
pub const PROMOTION_PROMPT: &str = "Promote to";

#[must_use]
pub fn rook() -> PieceType {
    PieceType::new(ROOK).with_motion(Motion::slide("slide", Offset::ORTHOGONAL.to_vec()))
}

#[must_use]
pub fn knight() -> PieceType {
    PieceType::new(KNIGHT)
        .with_symbols('N', 'n')
        .with_motion(Motion::leap("leap", Offset::KNIGHT.to_vec()))
}

#[must_use]
pub fn bishop() -> PieceType {
    PieceType::new(BISHOP).with_motion(Motion::slide("slide", Offset::DIAGONAL.to_vec()))
}

#[must_use]
pub fn queen() -> PieceType {
    PieceType::new(QUEEN).with_motion(Motion::slide("slide", Offset::king_steps().collect()))
}

#[must_use]
pub fn king() -> PieceType {
    PieceType::new(KING).with_motion(Motion::leap("step", Offset::king_steps().collect()))
}

/// A pawn promoting to any of `promotions` on the last rank.
#[must_use]
pub fn pawn(promotions: Vec<Arc<PieceType>>) -> PieceType {
    PieceType::new(PAWN)
        .with_motion(promoting(Motion::new("push", push), &promotions))
        .with_motion(Motion::new("double push", double_push))
        .with_motion(promoting(Motion::new("capture", pawn_captures), &promotions))
}

fn promoting(motion: Motion, promotions: &[Arc<PieceType>]) -> Motion {
    let promotions = promotions.to_vec();
    motion
        .with_choice(move |state, piece, to, _| {
            is_last_rank(state, piece, to).then(|| Choice::piece_type(PROMOTION_PROMPT, promotions.clone()))
        })
        .with_action(promote)
}

fn is_last_rank(state: &State, piece: &Piece, square: Square) -> bool {
    match piece.owner().map(|owner| owner.forward().y) {
        Some(1) => square.rank == state.board().height(),
        Some(_) => square.rank == 1,
        None => false,
    }
}

fn is_empty(state: &State, square: Square) -> bool {
    state.board().contains(square) && state.piece_at(square).is_none()
}

fn push(state: &State, piece: &Piece) -> Vec<Square> {
    let (Some(from), Some(owner)) = (piece.square(), piece.owner()) else {
        return Vec::new();
    };
    let to = from.offset(owner.forward());
    if is_empty(state, to) {
        vec![to]
    } else {
        Vec::new()
    }
}

fn double_push(state: &State, piece: &Piece) -> Vec<Square> {
    let (Some(from), Some(owner)) = (piece.square(), piece.owner()) else {
        return Vec::new();
    };
    let forward = owner.forward();
    // Start rank: one step in from the owner's back rank.
    let back_rank = from.offset(-forward * 2).rank;
    if back_rank != 0 && back_rank != state.board().height() + 1 {
        return Vec::new();
    }
    let over = from.offset(forward);
    let to = over.offset(forward);
    if is_empty(state, over) && is_empty(state, to) {
        vec![to]
    } else {
        Vec::new()
    }
}

fn pawn_captures(state: &State, piece: &Piece) -> Vec<Square> {
    let (Some(from), Some(owner)) = (piece.square(), piece.owner()) else {
        return Vec::new();
    };
    let forward = owner.forward();
    [Offset::new(-1, forward.y), Offset::new(1, forward.y)]
        .into_iter()
        .map(|offset| from.offset(offset))
        .filter(|&to| {
            state
                .piece_at(to)
                .is_some_and(|target| target.owner().is_some() && target.owner() != Some(owner))
        })
        .collect()
}

/// Swap the pawn that just arrived for a new piece of the chosen type.
fn promote(state: &mut State, mv: &Move, options: &[OptionValue]) -> Result<(), RuleError> {
    let Some(target) = options.iter().find_map(OptionValue::as_piece_type).cloned() else {
        return Ok(());
    };
    let owner = state.board().piece(mv.piece())?.owner();

    let mut board = state.board_mut();
    board.remove_at(mv.to())?;
    let promoted = board.add_piece(Piece::new(target, owner));
    board.place(promoted, mv.to())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Color, GameConfig};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn destinations(state: &State, square: &str) -> Vec<Square> {
        let piece = state.piece_at(sq(square)).unwrap();
        let mut out: Vec<_> = piece.moves(state).iter().map(|g| g.to()).collect();
        out.sort();
        out
    }

    #[test]
    fn test_pawn_first_move() {
        let mut state = State::new(GameConfig::default()).unwrap();
        let pawn = state.add_piece_type(pawn(Vec::new()));
        state.add_piece(&pawn, Some(Color::White), sq("E2")).unwrap();
        state.add_piece(&pawn, Some(Color::Black), sq("D7")).unwrap();
        assert_eq!(destinations(&state, "E2"), vec![sq("E3"), sq("E4")]);
        assert_eq!(destinations(&state, "D7"), vec![sq("D5"), sq("D6")]);
    }

    #[test]
    fn test_pawn_blocked_and_capturing() {
        let mut state = State::new(GameConfig::default()).unwrap();
        let pawn = state.add_piece_type(pawn(Vec::new()));
        let rook = state.add_piece_type(rook());
        state.add_piece(&pawn, Some(Color::White), sq("E3")).unwrap();
        state.add_piece(&rook, Some(Color::Black), sq("E4")).unwrap();
        state.add_piece(&rook, Some(Color::Black), sq("F4")).unwrap();
        state.add_piece(&rook, Some(Color::White), sq("D4")).unwrap();
        assert_eq!(destinations(&state, "E3"), vec![sq("F4")]);
    }

    #[test]
    fn test_promotion_choice_only_on_last_rank() {
        let mut state = State::new(GameConfig::default()).unwrap();
        let queen = state.add_piece_type(queen());
        let pawn = state.add_piece_type(pawn(vec![queen]));
        state.add_piece(&pawn, Some(Color::White), sq("A7")).unwrap();
        state.add_piece(&pawn, Some(Color::White), sq("C5")).unwrap();

        let promoting = state.piece_at(sq("A7")).unwrap();
        let groups = promoting.moves(&state);
        assert_eq!(groups.len(), 1);
        let tree = groups[0].choices().unwrap();
        assert_eq!(tree.message(), Some(PROMOTION_PROMPT));
        assert_eq!(tree.len(), 1);

        let plain = state.piece_at(sq("C5")).unwrap();
        let groups = plain.moves(&state);
        assert!(groups[0].choices().is_none());
        assert_eq!(groups[0].moves()[0].options(), None);
    }

    #[test]
    fn test_knight_symbol() {
        assert_eq!(knight().symbol(Some(Color::White)), 'N');
        assert_eq!(knight().symbol(Some(Color::Black)), 'n');
        assert_eq!(king().symbol(Some(Color::White)), 'K');
    }
}
