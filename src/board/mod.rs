//! Boards: the generic grid and the event-emitting piece board.

pub mod grid;
pub mod pieceboard;

pub use grid::Board;
pub use pieceboard::{BoardId, Delivery, ListenerId, PieceBoard, Subscriber};
