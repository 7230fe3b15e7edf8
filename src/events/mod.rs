//! Event-driven synchronisation between the board and its dependents.
//!
//! - `BoardEvent`: tagged union of board mutations
//! - `EventBus`: ordered, synchronous subscriber registry
//! - `Observer`: the receiving side

pub mod event;
pub mod bus;

pub use event::BoardEvent;
pub use bus::{EventBus, Observer};
