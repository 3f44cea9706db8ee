#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod common;
mod config;
mod coordinate;
mod fleet;
mod grid;
mod ship;

#[cfg(feature = "std")]
pub mod command;
#[cfg(feature = "std")]
pub mod dispatcher;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
mod notice;
#[cfg(feature = "std")]
mod player;
#[cfg(feature = "std")]
pub mod prelude;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod stats;
#[cfg(feature = "std")]
pub mod timer;
#[cfg(feature = "std")]
pub mod transport;

pub use common::*;
pub use config::*;
pub use coordinate::*;
pub use fleet::*;
pub use grid::*;
pub use ship::*;

#[cfg(feature = "std")]
pub use command::Command;
#[cfg(feature = "std")]
pub use dispatcher::{Dispatcher, Inbound, SessionInfo, Shot, StartOutcome};
#[cfg(feature = "std")]
pub use logging::{init_logging, parse_level, LOG_ENV};
#[cfg(feature = "std")]
pub use notice::*;
#[cfg(feature = "std")]
pub use player::*;
#[cfg(feature = "std")]
pub use session::{Finish, FinishReason, Session, SessionId, SessionStatus, ShotReport, TickOutcome};
#[cfg(feature = "std")]
pub use stats::{MemoryStatsStore, PlayerRecord, Rank, StatisticsStore};
#[cfg(feature = "std")]
pub use timer::{InactivityTimer, TimerCheck, TimerDriver};
#[cfg(feature = "std")]
pub use transport::Notifier;
