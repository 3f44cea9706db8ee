//! Commonly used types and utilities for ease of import.

pub use crate::{
    CellState, Coordinate, FleetConfig, FleetPlacer, GameConfig, GameError, Grid, GridError, HitOutcome,
    TimerReset, View,
};

pub use crate::{Dispatcher, Identity, Inbound, MemoryStatsStore, Notifier, PlayerId, StatisticsStore};

pub use crate::transport::{console::ConsoleNotifier, in_memory::RecordingNotifier};
