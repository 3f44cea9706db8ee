//! Board constants and tunable game settings.

use alloc::vec::Vec;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;

pub const BOARD_SIZE: u8 = 10;

/// Number of cells on a board.
pub const BOARD_CELLS: usize = BOARD_SIZE as usize * BOARD_SIZE as usize;

/// Classic fleet: one 5, two 4s, three 3s, four 2s.
pub const CLASSIC_FLEET: [usize; 10] = [5, 4, 4, 3, 3, 3, 2, 2, 2, 2];

pub const DEFAULT_TICK: Duration = Duration::from_secs(15);
pub const DEFAULT_FORFEIT_AFTER: Duration = Duration::from_secs(60);
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Ship lengths placed on every grid, in placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetConfig {
    lengths: Vec<usize>,
}

impl FleetConfig {
    pub fn new(lengths: Vec<usize>) -> Result<Self, ConfigError> {
        if lengths.is_empty() {
            return Err(ConfigError::EmptyFleet);
        }
        if let Some(&bad) = lengths
            .iter()
            .find(|&&len| len == 0 || len > BOARD_SIZE as usize)
        {
            return Err(ConfigError::ShipLength(bad));
        }
        Ok(Self { lengths })
    }

    pub fn classic() -> Self {
        Self {
            lengths: CLASSIC_FLEET.to_vec(),
        }
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Total number of ship segments in the fleet.
    pub fn total_cells(&self) -> usize {
        self.lengths.iter().sum()
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self::classic()
    }
}

/// When the inactivity timer starts counting from zero again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerReset {
    /// Any successful shot resets the timer, including a miss that hands the turn over.
    #[default]
    EveryHit,
    /// Only shots that swap the active and passive roles reset the timer.
    TurnChange,
}

/// Retry limits for random fleet placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementLimits {
    /// Random anchors tried for one ship before the whole fleet is restarted.
    pub ship_attempts: usize,
    /// Whole-fleet restarts before placement gives up.
    pub fleet_attempts: usize,
}

impl Default for PlacementLimits {
    fn default() -> Self {
        Self {
            ship_attempts: 200,
            fleet_attempts: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub fleet: FleetConfig,
    /// Interval between inactivity ticks.
    pub tick: Duration,
    /// Inactivity after which the active player forfeits.
    pub forfeit_after: Duration,
    pub timer_reset: TimerReset,
    pub placement: PlacementLimits,
    /// Fixed RNG seed for reproducible fleets.
    pub seed: Option<u64>,
    pub leaderboard_size: usize,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        FleetConfig::new(self.fleet.lengths.clone())?;
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        if self.forfeit_after < self.tick {
            return Err(ConfigError::ThresholdBelowTick);
        }
        if self.placement.ship_attempts == 0 || self.placement.fleet_attempts == 0 {
            return Err(ConfigError::NoPlacementAttempts);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fleet: FleetConfig::classic(),
            tick: DEFAULT_TICK,
            forfeit_after: DEFAULT_FORFEIT_AFTER,
            timer_reset: TimerReset::default(),
            placement: PlacementLimits::default(),
            seed: None,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }
}
