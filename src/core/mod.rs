//! Core engine types: squares, colours, configuration, RNG, errors.
//!
//! This module contains the fundamental building blocks that are game-agnostic.
//! Games configure these via `GameConfig` rather than modifying the core.

pub mod square;
pub mod color;
pub mod config;
pub mod rng;
pub mod error;

pub use square::{Square, Offset};
pub use color::{Color, ColorMap};
pub use config::{GameConfig, ValidationStrategy, RuleFailurePolicy};
pub use rng::GameRng;
pub use error::{BoardError, SquareParseError, RuleError, GameError};
