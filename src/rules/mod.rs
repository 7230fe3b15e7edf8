//! Rule providers and the game façade.
//!
//! Games implement `Controller` to define:
//! - The decision offered at the start of each turn
//! - Custom logic run after the chosen moves
//! - Win/loss conditions
//!
//! `Game` calls into the controller but never interprets game-specific
//! concepts directly.

pub mod controller;
pub mod game;

pub use controller::{Controller, Resolution};
pub use game::Game;
