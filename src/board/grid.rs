//! Generic rectangular grid.
//!
//! `Board<T>` maps every square of a `width` x `height` rectangle to an
//! optional item. Empty cells are `None`, so any `T` (including one with a
//! meaningful "zero" value) can be stored.

use std::fmt::Write as _;

use crate::core::{BoardError, Square};

/// Rectangular grid of optional items, indexed by 1-based `Square`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board<T> {
    width: i32,
    height: i32,
    /// `rows[rank - 1][file - 1]`; every row has `width` cells.
    rows: Vec<Vec<Option<T>>>,
}

impl<T> Board<T> {
    /// Create an empty board. Both dimensions must be positive.
    pub fn new(width: i32, height: i32) -> Result<Self, BoardError> {
        if width <= 0 || height <= 0 {
            return Err(BoardError::InvalidDimensions {
                width: i64::from(width),
                height: i64::from(height),
            });
        }
        let rows = (0..height)
            .map(|_| std::iter::repeat_with(|| None).take(width as usize).collect())
            .collect();
        Ok(Self {
            width,
            height,
            rows,
        })
    }

    /// Number of files.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of ranks.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Check if `square` lies on the board.
    #[must_use]
    pub fn contains(&self, square: Square) -> bool {
        (1..=self.width).contains(&square.file) && (1..=self.height).contains(&square.rank)
    }

    fn cell(&self, square: Square) -> Result<&Option<T>, BoardError> {
        if !self.contains(square) {
            return Err(BoardError::OutOfBounds(square));
        }
        Ok(&self.rows[(square.rank - 1) as usize][(square.file - 1) as usize])
    }

    fn cell_mut(&mut self, square: Square) -> Result<&mut Option<T>, BoardError> {
        if !self.contains(square) {
            return Err(BoardError::OutOfBounds(square));
        }
        Ok(&mut self.rows[(square.rank - 1) as usize][(square.file - 1) as usize])
    }

    /// The item at `square`, `Ok(None)` if the square is empty.
    pub fn at(&self, square: Square) -> Result<Option<&T>, BoardError> {
        self.cell(square).map(Option::as_ref)
    }

    /// The item at `square`, `None` if empty or off the board.
    #[must_use]
    pub fn get(&self, square: Square) -> Option<&T> {
        self.cell(square).ok().and_then(Option::as_ref)
    }

    /// Put `item` on `square`, returning the previous occupant.
    pub fn place(&mut self, square: Square, item: T) -> Result<Option<T>, BoardError> {
        self.cell_mut(square).map(|cell| cell.replace(item))
    }

    /// Empty `square`, returning what was there.
    pub fn take(&mut self, square: Square) -> Result<Option<T>, BoardError> {
        self.cell_mut(square).map(Option::take)
    }

    /// Every square of the board, rank by rank from A1.
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        let width = self.width;
        (1..=self.height).flat_map(move |rank| (1..=width).map(move |file| Square::new(file, rank)))
    }

    /// Occupied squares and their items, rank by rank from A1.
    pub fn items(&self) -> impl Iterator<Item = (Square, &T)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().filter_map(move |(f, cell)| {
                cell.as_ref()
                    .map(|item| (Square::new(f as i32 + 1, r as i32 + 1), item))
            })
        })
    }

    /// Number of occupied squares.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.items().count()
    }

    /// Text diagram with the top rank first.
    ///
    /// `cell` renders an occupant; it should return at most two characters.
    pub fn pretty(&self, cell: impl Fn(&T) -> String) -> String {
        let bar = "-".repeat((self.width as usize + 1) * 3 + 1);
        let mut out = String::new();

        out.push_str(&bar);
        out.push('\n');
        out.push_str("|  |");
        for file in 1..=self.width {
            let _ = write!(out, "{:<2}|", Square::new(file, 1).file_name());
        }
        out.push('\n');
        out.push_str(&bar);
        out.push('\n');

        for rank in (1..=self.height).rev() {
            let _ = write!(out, "|{rank:>2}|");
            for file in 1..=self.width {
                let text = self.get(Square::new(file, rank)).map_or_else(String::new, &cell);
                let _ = write!(out, "{text:<2}|");
            }
            out.push('\n');
        }
        out.push_str(&bar);
        out.push('\n');
        out
    }
}
