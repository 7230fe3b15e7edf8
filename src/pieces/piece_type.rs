//! Piece types.
//!
//! A `PieceType` is an immutable identity (its name), a pair of display
//! symbols and an ordered list of `Motion`s. Piece instances share their type
//! through an `Arc`.

use std::fmt;
use std::hash::{Hash, Hasher};

use log::debug;
use rustc_hash::FxHashMap;

use super::moves::MoveGroup;
use super::motion::Motion;
use super::piece::Piece;
use crate::core::{Color, Square};
use crate::state::State;

/// Named piece kind with its motions.
#[derive(Clone)]
pub struct PieceType {
    name: String,
    white_symbol: char,
    black_symbol: char,
    motions: Vec<Motion>,
}

impl PieceType {
    /// Create a piece type without motions.
    ///
    /// Symbols default to the first letter of the name, upper case for
    /// White and lower case for Black.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let letter = name.chars().next().unwrap_or('?');
        Self {
            white_symbol: letter.to_ascii_uppercase(),
            black_symbol: letter.to_ascii_lowercase(),
            name,
            motions: Vec::new(),
        }
    }

    /// Set the diagram symbols.
    #[must_use]
    pub fn with_symbols(mut self, white: char, black: char) -> Self {
        self.white_symbol = white;
        self.black_symbol = black;
        self
    }

    /// Append a motion. Motions run in the order they were added.
    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motions.push(motion);
        self
    }

    /// Type name, also its identity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Diagram symbol for a piece owned by `owner`.
    #[must_use]
    pub fn symbol(&self, owner: Option<Color>) -> char {
        match owner {
            Some(Color::Black) => self.black_symbol,
            _ => self.white_symbol,
        }
    }

    /// Motions in evaluation order.
    #[must_use]
    pub fn motions(&self) -> &[Motion] {
        &self.motions
    }

    /// Run every motion for `piece` and group the results by destination.
    ///
    /// A later motion reaching a destination already produced by an earlier
    /// one replaces it; the destination keeps its first-seen position.
    pub fn move_groups(&self, state: &State, piece: &Piece) -> Vec<MoveGroup> {
        let (Some(id), Some(from)) = (piece.id(), piece.square()) else {
            return Vec::new();
        };

        let mut groups: Vec<MoveGroup> = Vec::new();
        let mut by_destination: FxHashMap<Square, usize> = FxHashMap::default();

        for motion in &self.motions {
            for to in motion.destinations(state, piece) {
                let group = MoveGroup::new(id, from, to, motion, motion.option_tree(state, piece, to));
                match by_destination.get(&to) {
                    Some(&slot) => groups[slot] = group,
                    None => {
                        by_destination.insert(to, groups.len());
                        groups.push(group);
                    }
                }
            }
        }

        debug!("{} on {from}: {} destinations", self.name, groups.len());
        groups
    }
}

impl PartialEq for PieceType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PieceType {}

impl Hash for PieceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieceType")
            .field("name", &self.name)
            .field("motions", &self.motions.iter().map(Motion::name).collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
