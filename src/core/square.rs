//! Board coordinates.
//!
//! ## Square
//!
//! A 1-based `(file, rank)` pair. File 1 is `A`, rank 1 is the bottom row
//! from White's point of view. Squares are plain values: a square outside a
//! given board is still a valid `Square`, the board decides containment.
//!
//! ## Offset
//!
//! A signed delta between squares, used by motions to walk rays and jumps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg};
use std::str::FromStr;

use super::error::SquareParseError;

/// A board coordinate, 1-based on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub file: i32,
    pub rank: i32,
}

impl Square {
    /// Create a square from a 1-based file and rank.
    #[must_use]
    pub const fn new(file: i32, rank: i32) -> Self {
        Self { file, rank }
    }

    /// The square reached by applying `offset` to this one.
    ///
    /// The result may lie outside any board.
    #[must_use]
    pub const fn offset(self, offset: Offset) -> Self {
        Self {
            file: self.file + offset.x,
            rank: self.rank + offset.y,
        }
    }

    /// The offset that leads from `self` to `other`.
    #[must_use]
    pub const fn delta_to(self, other: Square) -> Offset {
        Offset::new(other.file - self.file, other.rank - self.rank)
    }

    /// File letter(s), `A` for file 1. Files past `Z` continue as `AA`, `AB`...
    #[must_use]
    pub fn file_name(self) -> String {
        if self.file < 1 {
            return format!("?{}", self.file);
        }
        let mut n = self.file;
        let mut letters = Vec::new();
        while n > 0 {
            n -= 1;
            letters.push(char::from(b'A' + (n % 26) as u8));
            n /= 26;
        }
        letters.iter().rev().collect()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_name(), self.rank)
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    /// Parse algebraic notation such as `"B2"` or `"a10"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphabetic())
            .map_or(s.len(), |(i, _)| i);
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() {
            return Err(SquareParseError::MissingFile(s.to_string()));
        }
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(SquareParseError::InvalidRank(s.to_string()));
        }

        let file = letters
            .chars()
            .try_fold(0i32, |acc, c| {
                let value = i32::from(c.to_ascii_uppercase() as u8 - b'A' + 1);
                acc.checked_mul(26).and_then(|v| v.checked_add(value))
            })
            .ok_or_else(|| SquareParseError::OutOfRange(s.to_string()))?;
        let rank: i32 = digits
            .parse()
            .map_err(|_| SquareParseError::OutOfRange(s.to_string()))?;
        if rank < 1 {
            return Err(SquareParseError::InvalidRank(s.to_string()));
        }

        Ok(Self::new(file, rank))
    }
}

/// A signed displacement between two squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// Create a new offset.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Orthogonal unit steps: up, right, down, left.
    pub const ORTHOGONAL: [Offset; 4] = [
        Offset::new(0, 1),
        Offset::new(1, 0),
        Offset::new(0, -1),
        Offset::new(-1, 0),
    ];

    /// Diagonal unit steps.
    pub const DIAGONAL: [Offset; 4] = [
        Offset::new(1, 1),
        Offset::new(1, -1),
        Offset::new(-1, -1),
        Offset::new(-1, 1),
    ];

    /// The eight knight jumps.
    pub const KNIGHT: [Offset; 8] = [
        Offset::new(1, 2),
        Offset::new(2, 1),
        Offset::new(2, -1),
        Offset::new(1, -2),
        Offset::new(-1, -2),
        Offset::new(-2, -1),
        Offset::new(-2, 1),
        Offset::new(-1, 2),
    ];

    /// All eight neighbouring steps.
    #[must_use]
    pub fn king_steps() -> impl Iterator<Item = Offset> {
        Self::ORTHOGONAL.into_iter().chain(Self::DIAGONAL)
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<i32> for Offset {
    type Output = Offset;

    fn mul(self, rhs: i32) -> Offset {
        Offset::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+}, {:+})", self.x, self.y)
    }
}
