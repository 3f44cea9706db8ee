//! Ship definitions: a fixed line of segments that takes damage and sinks.

use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{CellState, GridError, HitOutcome};
use crate::coordinate::Coordinate;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Cell matrix indexed `[row][col]`.
pub type Cells = [[CellState; crate::config::BOARD_SIZE as usize];
    crate::config::BOARD_SIZE as usize];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Segment {
    at: Coordinate,
    hit: bool,
}

/// A ship placed on a grid. The segment list is fixed at construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    segments: Vec<Segment>,
    orientation: Orientation,
}

impl Ship {
    /// Lay out a ship of `length` starting at `anchor` and extending right
    /// (horizontal) or down (vertical).
    pub fn line(anchor: Coordinate, length: usize, orientation: Orientation) -> Result<Self, GridError> {
        if length == 0 {
            return Err(GridError::InvalidShipShape);
        }
        let (dr, dc) = match orientation {
            Orientation::Horizontal => (0, 1),
            Orientation::Vertical => (1, 0),
        };
        let mut segments = Vec::with_capacity(length);
        for i in 0..length {
            let r = anchor.row() as usize + dr * i;
            let c = anchor.col() as usize + dc * i;
            let at = Coordinate::new(
                u8::try_from(r).map_err(|_| GridError::ShipOutOfBounds)?,
                u8::try_from(c).map_err(|_| GridError::ShipOutOfBounds)?,
            );
            if !at.in_bounds() {
                return Err(GridError::ShipOutOfBounds);
            }
            segments.push(Segment { at, hit: false });
        }
        Ok(Ship {
            segments,
            orientation,
        })
    }

    /// Build a ship from an explicit list of cells, which must form one
    /// contiguous straight line in any order.
    pub fn from_cells(cells: &[Coordinate]) -> Result<Self, GridError> {
        let mut sorted: Vec<Coordinate> = cells.to_vec();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != cells.len() || sorted.is_empty() {
            return Err(GridError::InvalidShipShape);
        }
        if sorted.iter().any(|c| !c.in_bounds()) {
            return Err(GridError::ShipOutOfBounds);
        }
        let first = sorted[0];
        let orientation = if sorted.iter().all(|c| c.row() == first.row()) {
            Orientation::Horizontal
        } else if sorted.iter().all(|c| c.col() == first.col()) {
            Orientation::Vertical
        } else {
            return Err(GridError::InvalidShipShape);
        };
        // column-major sort keeps vertical runs in row order; horizontal runs
        // are in column order because the row is shared
        let contiguous = sorted.windows(2).all(|w| match orientation {
            Orientation::Horizontal => w[1].col() == w[0].col() + 1,
            Orientation::Vertical => w[1].row() == w[0].row() + 1,
        });
        if !contiguous {
            return Err(GridError::InvalidShipShape);
        }
        Self::line(first, sorted.len(), orientation)
    }

    pub fn length(&self) -> usize {
        self.segments.len()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupied cells in placement order.
    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.segments.iter().map(|s| s.at)
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        self.segments.iter().any(|s| s.at == at)
    }

    /// Segments not yet hit.
    pub fn alive_segments(&self) -> usize {
        self.segments.iter().filter(|s| !s.hit).count()
    }

    /// Check if the ship is sunk (all segments hit).
    pub fn is_sunk(&self) -> bool {
        self.alive_segments() == 0
    }

    /// `true` if any cell of `other` is this ship's cell or touches one.
    pub fn conflicts_with(&self, other: &Ship) -> bool {
        self.cells()
            .any(|a| other.cells().any(|b| a == b || a.touches(&b)))
    }

    /// Register a shot at `at`. Returns `None` when `at` is not an alive segment.
    ///
    /// Updates `cells` to `ShipHitPartial`, or on the final segment marks the
    /// whole ship `ShipSunk` and splashes the surrounding water.
    pub fn hit(&mut self, at: Coordinate, cells: &mut Cells) -> Option<HitOutcome> {
        let segment = self.segments.iter_mut().find(|s| s.at == at && !s.hit)?;
        segment.hit = true;
        cells[at.row() as usize][at.col() as usize] = CellState::ShipHitPartial;
        if self.is_sunk() {
            self.splash(cells);
            Some(HitOutcome::Sunk)
        } else {
            Some(HitOutcome::Hit)
        }
    }

    /// Mark every segment sunk and every touching water cell as a miss.
    /// Cells that hold ship states are left alone, so repeating is harmless.
    pub fn splash(&self, cells: &mut Cells) {
        for at in self.cells() {
            cells[at.row() as usize][at.col() as usize] = CellState::ShipSunk;
        }
        for at in self.cells() {
            for n in at.neighbours() {
                let cell = &mut cells[n.row() as usize][n.col() as usize];
                if *cell == CellState::Water {
                    *cell = CellState::Miss;
                }
            }
        }
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.segments.first().map(|s| s.at);
        write!(
            f,
            "Ship {{ length: {}, origin: {:?}, orientation: {:?}, alive: {} }}",
            self.length(),
            first,
            self.orientation,
            self.alive_segments(),
        )
    }
}
