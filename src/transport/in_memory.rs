use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::notice::BoardView;
use crate::player::{MessageHandle, PlayerId};
use crate::transport::Notifier;

/// Something the notifier was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Text {
        to: PlayerId,
        handle: MessageHandle,
        text: String,
    },
    Board {
        to: PlayerId,
        handle: MessageHandle,
        view: BoardView,
    },
    Deleted {
        to: PlayerId,
        handle: MessageHandle,
    },
}

impl Delivery {
    pub fn recipient(&self) -> PlayerId {
        match self {
            Delivery::Text { to, .. } | Delivery::Board { to, .. } | Delivery::Deleted { to, .. } => *to,
        }
    }
}

/// Notifier that keeps every delivery in memory. Used by tests and the simulator.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    log: Mutex<Vec<Delivery>>,
    next_handle: AtomicU64,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn log(&self) -> MutexGuard<'_, Vec<Delivery>> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Transport is shut down"));
        }
        Ok(())
    }

    fn issue(&self) -> MessageHandle {
        MessageHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log().clone()
    }

    /// Texts sent to `player`, oldest first.
    pub fn texts(&self, player: PlayerId) -> Vec<String> {
        self.log()
            .iter()
            .filter_map(|d| match d {
                Delivery::Text { to, text, .. } if *to == player => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent board picture sent to `player`.
    pub fn last_board(&self, player: PlayerId) -> Option<BoardView> {
        self.log().iter().rev().find_map(|d| match d {
            Delivery::Board { to, view, .. } if *to == player => Some(view.clone()),
            _ => None,
        })
    }

    /// Handles sent to `player` and not deleted since.
    pub fn live_messages(&self, player: PlayerId) -> Vec<MessageHandle> {
        let log = self.log();
        let deleted: Vec<MessageHandle> = log
            .iter()
            .filter_map(|d| match d {
                Delivery::Deleted { handle, .. } => Some(*handle),
                _ => None,
            })
            .collect();
        log.iter()
            .filter(|d| d.recipient() == player)
            .filter_map(|d| match d {
                Delivery::Text { handle, .. } | Delivery::Board { handle, .. } => Some(*handle),
                Delivery::Deleted { .. } => None,
            })
            .filter(|h| !deleted.contains(h))
            .collect()
    }

    pub fn clear(&self) {
        self.log().clear();
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, player: PlayerId, text: &str) -> anyhow::Result<MessageHandle> {
        self.check()?;
        let handle = self.issue();
        self.log().push(Delivery::Text {
            to: player,
            handle,
            text: text.to_string(),
        });
        Ok(handle)
    }

    async fn notify_with_board_view(&self, player: PlayerId, view: &BoardView) -> anyhow::Result<MessageHandle> {
        self.check()?;
        let handle = self.issue();
        self.log().push(Delivery::Board {
            to: player,
            handle,
            view: view.clone(),
        });
        Ok(handle)
    }

    async fn delete(&self, player: PlayerId, handle: MessageHandle) -> anyhow::Result<()> {
        self.check()?;
        self.log().push(Delivery::Deleted { to: player, handle });
        Ok(())
    }
}
