//! Option trees: nested, multi-step turn decisions.
//!
//! A turn may need any number of sequential decisions ("which piece?",
//! "where to?", "promote to?"). An `OptionNode` tree holds every
//! combination; a `Route` is one complete combination.
//!
//! ## Operations
//!
//! - `all_routes`: lazily enumerate every route
//! - `filter_routes`: prune routes failing a predicate, keeping the rest intact
//! - `len`: branching factor at a node
//! - `accept`: dispatch on the node kind with an `OptionVisitor`
//! - `walk_prefix` / `contains_route`: resolve a route against the tree

pub mod value;
pub mod choice;
pub mod node;
pub mod routes;
pub mod builder;

pub use value::{MoveOption, OptionItem, OptionKey, OptionKind, OptionValue, Route};
pub use choice::{Choice, ChoiceKind};
pub use node::{Branch, ChoiceNode, MessageNode, OptionNode, OptionVisitor};
pub use routes::Routes;
