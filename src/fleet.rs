//! Random fleet layout with the no-touching rule.

use rand::Rng;

use crate::common::PlacementError;
use crate::config::{FleetConfig, PlacementLimits, BOARD_SIZE};
use crate::coordinate::Coordinate;
use crate::grid::Grid;
use crate::ship::{Orientation, Ship};

/// Places a configured fleet onto grids by rejection sampling.
#[derive(Debug, Clone)]
pub struct FleetPlacer {
    fleet: FleetConfig,
    limits: PlacementLimits,
}

impl FleetPlacer {
    pub fn new(fleet: FleetConfig, limits: PlacementLimits) -> Self {
        Self { fleet, limits }
    }

    pub fn fleet(&self) -> &FleetConfig {
        &self.fleet
    }

    /// Lay the whole fleet onto a fresh grid.
    pub fn place<R: Rng>(&self, rng: &mut R) -> Result<Grid, PlacementError> {
        let mut grid = Grid::new();
        self.populate(&mut grid, rng)?;
        Ok(grid)
    }

    /// Add the whole fleet to `grid`. On failure `grid` is left untouched.
    pub fn populate<R: Rng>(&self, grid: &mut Grid, rng: &mut R) -> Result<(), PlacementError> {
        let mut failed_length = 0;
        for _ in 0..self.limits.fleet_attempts {
            let mut scratch = grid.clone();
            match self.try_fleet(&mut scratch, rng) {
                Ok(()) => {
                    *grid = scratch;
                    return Ok(());
                }
                Err(length) => {
                    log::debug!("fleet layout stuck on a ship of length {length}, restarting");
                    failed_length = length;
                }
            }
        }
        Err(PlacementError {
            length: failed_length,
            attempts: self.limits.fleet_attempts,
        })
    }

    /// One pass over the fleet; returns the length of the ship that did not fit.
    fn try_fleet<R: Rng>(&self, grid: &mut Grid, rng: &mut R) -> Result<(), usize> {
        for &length in self.fleet.lengths() {
            let ship = random_ship(grid, rng, length, self.limits.ship_attempts).ok_or(length)?;
            grid.place(ship).map_err(|_| length)?;
        }
        Ok(())
    }
}

/// Returns a randomly oriented ship of `length` that fits on `grid` without
/// touching existing ships, or `None` after `attempts` rejected samples.
pub fn random_ship<R: Rng>(grid: &Grid, rng: &mut R, length: usize, attempts: usize) -> Option<Ship> {
    let size = BOARD_SIZE as usize;
    if length == 0 || length > size {
        return None;
    }
    for _ in 0..attempts {
        let orient = if rng.random() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let max_r = if orient == Orientation::Vertical {
            size - length
        } else {
            size - 1
        };
        let max_c = if orient == Orientation::Horizontal {
            size - length
        } else {
            size - 1
        };
        let r = rng.random_range(0..=max_r);
        let c = rng.random_range(0..=max_c);
        let Ok(ship) = Ship::line(Coordinate::new(r as u8, c as u8), length, orient) else {
            continue;
        };
        if grid.check_placement(&ship).is_ok() {
            return Some(ship);
        }
    }
    None
}
