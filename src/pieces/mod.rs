//! Pieces, piece types, motions and moves.
//!
//! ## Key Types
//!
//! - `PieceType`: immutable identity plus an ordered list of `Motion`s
//! - `Piece`: an instance with an owner and a derived square
//! - `MoveGroup`: candidate moves to one destination
//! - `Move`: one fully resolved move

pub mod piece;
pub mod piece_type;
pub mod motion;
pub mod moves;

pub use piece::{Piece, PieceId};
pub use piece_type::PieceType;
pub use motion::{
    leap_destinations, slide_destinations, ActionFn, ChoiceFn, GenerateFn, Motion,
};
pub use moves::{Move, MoveGroup};
