//! Outbound notifications produced by session transitions.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::grid::GridSnapshot;
use crate::player::PlayerId;

/// Board picture request: what to draw, its caption and the cells the
/// viewer may fire at next (empty when it is not their turn).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub snapshot: GridSnapshot,
    pub caption: String,
    pub targets: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeBody {
    Text(String),
    Board(BoardView),
}

/// A message for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub to: PlayerId,
    pub body: NoticeBody,
    /// Tracked notices replace the previous message of the same kind and are
    /// deleted when the session is disposed. Final results are untracked.
    pub tracked: bool,
}

impl Notice {
    pub fn text(to: PlayerId, text: impl Into<String>) -> Self {
        Self {
            to,
            body: NoticeBody::Text(text.into()),
            tracked: true,
        }
    }

    pub fn board(to: PlayerId, view: BoardView) -> Self {
        Self {
            to,
            body: NoticeBody::Board(view),
            tracked: true,
        }
    }

    pub fn untracked(mut self) -> Self {
        self.tracked = false;
        self
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.body {
            NoticeBody::Text(t) => Some(t),
            NoticeBody::Board(_) => None,
        }
    }
}
