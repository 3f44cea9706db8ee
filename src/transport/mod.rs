//! Outbound chat transport seam and its implementations.

use crate::notice::BoardView;
use crate::player::{MessageHandle, PlayerId};

/// Sends, and deletes, messages in a player's chat.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, player: PlayerId, text: &str) -> anyhow::Result<MessageHandle>;
    async fn notify_with_board_view(&self, player: PlayerId, view: &BoardView) -> anyhow::Result<MessageHandle>;
    async fn delete(&self, player: PlayerId, handle: MessageHandle) -> anyhow::Result<()>;
}

pub mod console;
pub mod in_memory;
