//! Common types for the game core: cell states, shot outcomes and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// State of a single grid square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Water,
    ShipAlive,
    Miss,
    ShipHitPartial,
    ShipSunk,
}

impl CellState {
    /// `true` while the cell may still be fired upon.
    pub fn is_targetable(self) -> bool {
        matches!(self, CellState::Water | CellState::ShipAlive)
    }
}

/// Result of a shot that was accepted by a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Shot landed in open water.
    Miss,
    /// Shot struck a ship segment, ship still afloat.
    Hit,
    /// Shot struck the last alive segment of a ship.
    Sunk,
}

impl HitOutcome {
    /// `true` for outcomes that keep the shooter's turn.
    pub fn is_hit(self) -> bool {
        !matches!(self, HitOutcome::Miss)
    }
}

/// Errors returned by coordinate parsing, grid resolution and ship placement.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("unrecognised cell, use a column A-J followed by a row 1-10, e.g. B7")]
    MalformedCoordinate,
    #[error("that cell is outside the board")]
    InvalidCoordinate,
    #[error("that cell has already been fired upon")]
    AlreadyResolved,
    #[error("ship placement is out of bounds")]
    ShipOutOfBounds,
    #[error("ship placement overlaps another ship")]
    ShipOverlaps,
    #[error("ship placement touches another ship")]
    ShipTooClose,
    #[error("ship cells must form one straight unbroken line")]
    InvalidShipShape,
}

/// The fleet could not be laid out within the configured retry limits.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unable to place a ship of length {length} after {attempts} fleet attempts")]
pub struct PlacementError {
    pub length: usize,
    pub attempts: usize,
}

/// Errors surfaced to players by sessions and the dispatcher.
///
/// The `Display` text is what the requester is told.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("It's not your turn!")]
    NotYourTurn,
    #[error("The game is already finished!")]
    GameAlreadyFinished,
    #[error("This game already has two players.")]
    AlreadyFull,
    #[error("You don't have a game in progress! Send start-session to begin.")]
    NoActiveGame,
    #[error("Wait for an opponent to join first.")]
    OpponentNotJoined,
    #[error("You are already in this game.")]
    AlreadyInSession,
    #[error("Invalid shot: {0}")]
    Grid(#[from] GridError),
    #[error("Could not set up the board: {0}")]
    Placement(#[from] PlacementError),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fleet must contain at least one ship")]
    EmptyFleet,
    #[error("ship length {0} does not fit the board")]
    ShipLength(usize),
    #[error("inactivity tick must be non-zero")]
    ZeroTick,
    #[error("forfeit threshold must be at least one tick")]
    ThresholdBelowTick,
    #[error("placement retry limits must be non-zero")]
    NoPlacementAttempts,
}
