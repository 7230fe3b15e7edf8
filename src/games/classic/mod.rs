//! Classic chess on the engine.
//!
//! The reference rule set:
//! - Rook, knight, bishop, queen, king and pawn
//! - Pawns push one or two squares, capture diagonally and promote on the
//!   last rank through a piece-type choice
//! - A move may not leave the mover's king attacked
//! - Checkmate wins; a player with no moves and no check is stalemated
//!
//! Castling and en passant are not part of this rule set.

mod game;
mod pieces;

pub use game::{
    install, king_in_check, king_safety, setup_standard, ClassicController, ClassicGameBuilder, TURN_PROMPT,
};
pub use pieces::{
    bishop, king, knight, pawn, queen, rook, BISHOP, KING, KNIGHT, PAWN, PROMOTION_PROMPT, QUEEN, ROOK,
};
