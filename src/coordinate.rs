//! Board coordinates and their `B7`-style text form.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::GridError;
use crate::config::BOARD_SIZE;

/// Zero-based board position.
///
/// Field order makes the derived ordering column-major, which is the order
/// targets are listed in (`A1, A2, ..., A10, B1, ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    col: u8,
    row: u8,
}

impl Coordinate {
    /// Build a coordinate without bounds checking; grids reject out-of-range ones.
    pub const fn new(row: u8, col: u8) -> Self {
        Self { col, row }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Offset by `(dr, dc)`, or `None` when the result leaves the board.
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Self> {
        let r = self.row as i16 + dr as i16;
        let c = self.col as i16 + dc as i16;
        if r < 0 || c < 0 || r >= BOARD_SIZE as i16 || c >= BOARD_SIZE as i16 {
            return None;
        }
        Some(Self::new(r as u8, c as u8))
    }

    /// In-bounds cells touching this one, diagonals included.
    pub fn neighbours(self) -> impl Iterator<Item = Coordinate> {
        (-1i8..=1)
            .flat_map(|dr| (-1i8..=1).map(move |dc| (dr, dc)))
            .filter(|&(dr, dc)| dr != 0 || dc != 0)
            .filter_map(move |(dr, dc)| self.offset(dr, dc))
    }

    /// `true` when the two cells are distinct and touch, diagonals included.
    pub fn touches(&self, other: &Coordinate) -> bool {
        self != other && self.row.abs_diff(other.row) <= 1 && self.col.abs_diff(other.col) <= 1
    }

    /// Every cell of the board in column-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE).flat_map(|c| (0..BOARD_SIZE).map(move |r| Coordinate::new(r, c)))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row as u16 + 1)
    }
}

impl FromStr for Coordinate {
    type Err = GridError;

    /// Parse a column letter followed by a row number, e.g. ` b10 `.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .ok_or(GridError::MalformedCoordinate)?
            .to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            return Err(GridError::MalformedCoordinate);
        }
        let col = letter as u8 - b'A';
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GridError::MalformedCoordinate);
        }
        let row: u8 = digits.parse().map_err(|_| GridError::MalformedCoordinate)?;
        if col >= BOARD_SIZE || row == 0 || row > BOARD_SIZE {
            return Err(GridError::MalformedCoordinate);
        }
        Ok(Coordinate::new(row - 1, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    #[test]
    fn parses_case_insensitive_with_whitespace() {
        assert_eq!("B3".parse(), Ok(Coordinate::new(2, 1)));
        assert_eq!("  j10\t".parse(), Ok(Coordinate::new(9, 9)));
        assert_eq!("a1".parse(), Ok(Coordinate::new(0, 0)));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "  ", "3B", "K1", "A0", "A11", "A", "AA1", "A1x", "A+1", "A01x", "Ж1"] {
            assert_eq!(
                bad.parse::<Coordinate>(),
                Err(GridError::MalformedCoordinate),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for c in Coordinate::all() {
            assert_eq!(c.to_string().parse(), Ok(c));
        }
    }

    #[test]
    fn ordering_is_column_then_row() {
        let mut cells: Vec<Coordinate> = ["B1", "A10", "A2", "A1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        cells.sort();
        let labels: Vec<_> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels, ["A1", "A2", "A10", "B1"]);
    }

    #[test]
    fn corner_has_three_neighbours() {
        assert_eq!(Coordinate::new(0, 0).neighbours().count(), 3);
        assert_eq!(Coordinate::new(4, 4).neighbours().count(), 8);
        assert_eq!(Coordinate::new(0, 5).neighbours().count(), 5);
    }
}
