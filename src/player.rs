//! Player identities and per-session player state.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{Arc, Mutex};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::{HitOutcome, PlacementError};
use crate::fleet::FleetPlacer;
use crate::grid::Grid;

/// Stable chat-side user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player as seen by the game: id plus the name shown to the opponent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: PlayerId,
    pub name: String,
}

impl Identity {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
        }
    }
}

/// Transport-issued handle of a sent message; opaque to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle(pub u64);

/// Last text and last board picture sent to a player in this session.
#[derive(Debug, Default)]
pub struct MessageSlots {
    pub text: Option<MessageHandle>,
    pub board: Option<MessageHandle>,
    closed: bool,
}

impl MessageSlots {
    /// Empty both slots, returning what they held. Handles recorded after
    /// this are bounced back by [`MessageSlots::record`].
    pub fn drain(&mut self) -> Vec<MessageHandle> {
        self.closed = true;
        self.text.take().into_iter().chain(self.board.take()).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Store a freshly sent handle. Returns the handle that must now be
    /// deleted: the one it displaced, or `handle` itself once drained.
    pub fn record(&mut self, board: bool, handle: MessageHandle) -> Option<MessageHandle> {
        if self.closed {
            return Some(handle);
        }
        let slot = if board { &mut self.board } else { &mut self.text };
        slot.replace(handle)
    }
}

/// Shared slot cell; filled in by the delivery code after a send completes.
pub type SharedSlots = Arc<Mutex<MessageSlots>>;

/// One side of a match.
#[derive(Debug)]
pub struct PlayerState {
    identity: Identity,
    grid: Grid,
    streak: u32,
    units_destroyed: u32,
    messages: SharedSlots,
}

impl PlayerState {
    pub fn new(identity: Identity, grid: Grid) -> Self {
        Self {
            identity,
            grid,
            streak: 0,
            units_destroyed: 0,
            messages: SharedSlots::default(),
        }
    }

    /// Wrap `identity` with a freshly laid out fleet.
    pub fn with_random_fleet<R: Rng>(
        identity: Identity,
        placer: &FleetPlacer,
        rng: &mut R,
    ) -> Result<Self, PlacementError> {
        Ok(Self::new(identity, placer.place(rng)?))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn id(&self) -> PlayerId {
        self.identity.id
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Consecutive hits in the current turn.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Enemy ship segments destroyed by this player in this session.
    pub fn units_destroyed(&self) -> u32 {
        self.units_destroyed
    }

    /// Update the streak after one of this player's shots.
    pub(crate) fn record_shot(&mut self, outcome: HitOutcome) {
        if outcome.is_hit() {
            self.streak += 1;
            self.units_destroyed += 1;
        } else {
            self.streak = 0;
        }
    }

    pub fn messages(&self) -> SharedSlots {
        Arc::clone(&self.messages)
    }

    /// Take every tracked message handle, leaving the slots empty.
    pub(crate) fn take_messages(&self) -> Vec<MessageHandle> {
        match self.messages.lock() {
            Ok(mut slots) => slots.drain(),
            Err(poisoned) => poisoned.into_inner().drain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_hands_back_the_displaced_handle() {
        let mut slots = MessageSlots::default();
        assert_eq!(slots.record(false, MessageHandle(1)), None);
        assert_eq!(slots.record(true, MessageHandle(2)), None);
        assert_eq!(slots.record(false, MessageHandle(3)), Some(MessageHandle(1)));
        assert_eq!(slots.text, Some(MessageHandle(3)));
        assert_eq!(slots.board, Some(MessageHandle(2)));
    }

    #[test]
    fn drained_slots_bounce_new_handles() {
        let mut slots = MessageSlots::default();
        slots.record(true, MessageHandle(4));
        assert_eq!(slots.drain(), vec![MessageHandle(4)]);
        assert!(slots.is_closed());
        assert_eq!(slots.record(false, MessageHandle(5)), Some(MessageHandle(5)));
        assert_eq!(slots.text, None);
        assert!(slots.drain().is_empty());
    }
}
