//! Ready-made rule sets.
//!
//! - `classic`: orthodox chess, the reference game for the engine

pub mod classic;

pub use classic::{ClassicController, ClassicGameBuilder};
