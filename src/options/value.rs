//! Option values: the things a player can pick.
//!
//! There are exactly four kinds of option. Each has a canonical key used to
//! deduplicate siblings and to match route elements against tree branches:
//! piece types compare by name, squares and moves structurally.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::Square;
use crate::pieces::{PieceId, PieceType};

/// A fully resolved sequence of choices, root to leaf.
pub type Route = Vec<OptionValue>;

/// The four option categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    PieceType,
    Square,
    Move,
    Unit,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::PieceType => "piece type",
            OptionKind::Square => "square",
            OptionKind::Move => "move",
            OptionKind::Unit => "unit",
        };
        f.write_str(name)
    }
}

/// Choosing a move: which piece goes where.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveOption {
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
}

impl fmt::Display for MoveOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// One pickable value.
#[derive(Clone, Debug)]
pub enum OptionValue {
    PieceType(Arc<PieceType>),
    Square(Square),
    Move(MoveOption),
    /// Acknowledge a prompt that offers no real alternative.
    Unit,
}

/// Canonical identity of an option value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Name(String),
    Square(Square),
    Move(MoveOption),
    Unit,
}

impl OptionValue {
    /// Which of the four categories this value belongs to.
    #[must_use]
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::PieceType(_) => OptionKind::PieceType,
            OptionValue::Square(_) => OptionKind::Square,
            OptionValue::Move(_) => OptionKind::Move,
            OptionValue::Unit => OptionKind::Unit,
        }
    }

    /// Canonical key.
    #[must_use]
    pub fn key(&self) -> OptionKey {
        match self {
            OptionValue::PieceType(ty) => OptionKey::Name(ty.name().to_string()),
            OptionValue::Square(square) => OptionKey::Square(*square),
            OptionValue::Move(mv) => OptionKey::Move(*mv),
            OptionValue::Unit => OptionKey::Unit,
        }
    }

    /// The piece type, if this is a piece type option.
    #[must_use]
    pub fn as_piece_type(&self) -> Option<&Arc<PieceType>> {
        match self {
            OptionValue::PieceType(ty) => Some(ty),
            _ => None,
        }
    }

    /// The square, if this is a square option.
    #[must_use]
    pub fn as_square(&self) -> Option<Square> {
        match self {
            OptionValue::Square(square) => Some(*square),
            _ => None,
        }
    }

    /// The move, if this is a move option.
    #[must_use]
    pub fn as_move(&self) -> Option<MoveOption> {
        match self {
            OptionValue::Move(mv) => Some(*mv),
            _ => None,
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OptionValue {}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::PieceType(ty) => f.write_str(ty.name()),
            OptionValue::Square(square) => write!(f, "{square}"),
            OptionValue::Move(mv) => write!(f, "{mv}"),
            OptionValue::Unit => f.write_str("ok"),
        }
    }
}

impl From<Square> for OptionValue {
    fn from(square: Square) -> Self {
        OptionValue::Square(square)
    }
}

impl From<Arc<PieceType>> for OptionValue {
    fn from(ty: Arc<PieceType>) -> Self {
        OptionValue::PieceType(ty)
    }
}

impl From<MoveOption> for OptionValue {
    fn from(mv: MoveOption) -> Self {
        OptionValue::Move(mv)
    }
}

/// A value type that can label the branches of a choice node.
pub trait OptionItem: Clone + fmt::Debug + PartialEq {
    /// The category of this item type.
    const KIND: OptionKind;

    /// Convert to the generic value.
    fn to_value(&self) -> OptionValue;

    /// Extract from a generic value of the matching kind.
    fn from_value(value: &OptionValue) -> Option<Self>;

    /// Canonical key.
    fn key(&self) -> OptionKey {
        self.to_value().key()
    }
}

impl OptionItem for Arc<PieceType> {
    const KIND: OptionKind = OptionKind::PieceType;

    fn to_value(&self) -> OptionValue {
        OptionValue::PieceType(Arc::clone(self))
    }

    fn from_value(value: &OptionValue) -> Option<Self> {
        value.as_piece_type().cloned()
    }

    fn key(&self) -> OptionKey {
        OptionKey::Name(self.name().to_string())
    }
}

impl OptionItem for Square {
    const KIND: OptionKind = OptionKind::Square;

    fn to_value(&self) -> OptionValue {
        OptionValue::Square(*self)
    }

    fn from_value(value: &OptionValue) -> Option<Self> {
        value.as_square()
    }
}

impl OptionItem for MoveOption {
    const KIND: OptionKind = OptionKind::Move;

    fn to_value(&self) -> OptionValue {
        OptionValue::Move(*self)
    }

    fn from_value(value: &OptionValue) -> Option<Self> {
        value.as_move()
    }
}

impl OptionItem for () {
    const KIND: OptionKind = OptionKind::Unit;

    fn to_value(&self) -> OptionValue {
        OptionValue::Unit
    }

    fn from_value(value: &OptionValue) -> Option<Self> {
        matches!(value, OptionValue::Unit).then_some(())
    }
}
