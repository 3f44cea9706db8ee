//! One player's board: the cell matrix plus the ships placed on it.

use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{CellState, GridError, HitOutcome};
use crate::config::BOARD_SIZE;
use crate::coordinate::Coordinate;
use crate::ship::{Cells, Ship};

const N: usize = BOARD_SIZE as usize;

/// How much of a grid the viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    /// Owner's view, ships visible.
    Full,
    /// Opponent's view, undamaged ship cells shown as water.
    Restricted,
}

/// Read-only copy of a grid's cell states, handed to renderers.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    cells: Cells,
}

impl GridSnapshot {
    pub fn cell(&self, at: Coordinate) -> Option<CellState> {
        at.in_bounds()
            .then(|| self.cells[at.row() as usize][at.col() as usize])
    }

    /// Rows top to bottom, each left to right.
    pub fn rows(&self) -> impl Iterator<Item = &[CellState; N]> + '_ {
        self.cells.iter()
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().flatten().filter(|&&c| c == state).count()
    }
}

impl fmt::Debug for GridSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                let ch = match cell {
                    CellState::Water => '.',
                    CellState::ShipAlive => 'O',
                    CellState::Miss => '*',
                    CellState::ShipHitPartial => 'x',
                    CellState::ShipSunk => '#',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Main grid state: cell matrix and ship list.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Cells,
    ships: Vec<Ship>,
}

impl Grid {
    /// Create an all-water grid with no ships.
    pub fn new() -> Self {
        Self {
            cells: [[CellState::Water; N]; N],
            ships: Vec::new(),
        }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn cell(&self, at: Coordinate) -> Option<CellState> {
        at.in_bounds()
            .then(|| self.cells[at.row() as usize][at.col() as usize])
    }

    /// Check that `ship` neither overlaps nor touches any placed ship.
    pub fn check_placement(&self, ship: &Ship) -> Result<(), GridError> {
        if ship.cells().any(|c| !c.in_bounds()) {
            return Err(GridError::ShipOutOfBounds);
        }
        for placed in &self.ships {
            if ship.cells().any(|c| placed.contains(c)) {
                return Err(GridError::ShipOverlaps);
            }
            if ship.conflicts_with(placed) {
                return Err(GridError::ShipTooClose);
            }
        }
        Ok(())
    }

    /// Place a ship, marking its cells `ShipAlive`.
    pub fn place(&mut self, ship: Ship) -> Result<(), GridError> {
        self.check_placement(&ship)?;
        for at in ship.cells() {
            self.cells[at.row() as usize][at.col() as usize] = CellState::ShipAlive;
        }
        self.ships.push(ship);
        Ok(())
    }

    /// Fire at `at`.
    pub fn resolve(&mut self, at: Coordinate) -> Result<HitOutcome, GridError> {
        let state = self.cell(at).ok_or(GridError::InvalidCoordinate)?;
        match state {
            CellState::Water => {
                self.cells[at.row() as usize][at.col() as usize] = CellState::Miss;
                Ok(HitOutcome::Miss)
            }
            CellState::ShipAlive => {
                for ship in self.ships.iter_mut() {
                    if let Some(outcome) = ship.hit(at, &mut self.cells) {
                        return Ok(outcome);
                    }
                }
                // a ShipAlive cell with no owning ship; nothing to damage
                Err(GridError::AlreadyResolved)
            }
            CellState::Miss | CellState::ShipHitPartial | CellState::ShipSunk => {
                Err(GridError::AlreadyResolved)
            }
        }
    }

    /// Cells that can still be fired at, in column-then-row order.
    pub fn available_targets(&self) -> Vec<Coordinate> {
        Coordinate::all()
            .filter(|&c| self.cells[c.row() as usize][c.col() as usize].is_targetable())
            .collect()
    }

    /// Ship segments not yet hit, across all ships.
    pub fn alive_unit_count(&self) -> usize {
        self.ships.iter().map(Ship::alive_segments).sum()
    }

    /// Returns `true` when all ships are sunk.
    pub fn all_sunk(&self) -> bool {
        self.alive_unit_count() == 0
    }

    pub fn snapshot(&self, view: View) -> GridSnapshot {
        let mut cells = self.cells;
        if view == View::Restricted {
            for cell in cells.iter_mut().flatten() {
                if *cell == CellState::ShipAlive {
                    *cell = CellState::Water;
                }
            }
        }
        GridSnapshot { cells }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{ ships: {:?} }}", self.ships)?;
        fmt::Debug::fmt(&self.snapshot(View::Full), f)
    }
}
