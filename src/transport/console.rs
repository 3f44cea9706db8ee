use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::CellState;
use crate::config::BOARD_SIZE;
use crate::notice::BoardView;
use crate::player::{MessageHandle, PlayerId};
use crate::transport::Notifier;

/// Notifier that prints every message to stdout, prefixed with the recipient.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    next_handle: AtomicU64,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&self) -> MessageHandle {
        MessageHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Plain-text picture of a board view.
pub fn render_board(view: &BoardView) -> String {
    let mut out = String::new();
    out.push_str("    ");
    for c in 0..BOARD_SIZE {
        out.push(' ');
        out.push((b'A' + c) as char);
    }
    out.push('\n');
    for (r, row) in view.snapshot.rows().enumerate() {
        out.push_str(&format!("  {:2}", r + 1));
        for cell in row {
            let ch = match cell {
                CellState::Water => '.',
                CellState::ShipAlive => 'S',
                CellState::Miss => 'o',
                CellState::ShipHitPartial => 'X',
                CellState::ShipSunk => '#',
            };
            out.push(' ');
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, player: PlayerId, text: &str) -> anyhow::Result<MessageHandle> {
        println!("[to {player}] {text}");
        Ok(self.issue())
    }

    async fn notify_with_board_view(&self, player: PlayerId, view: &BoardView) -> anyhow::Result<MessageHandle> {
        println!("[to {player}] {}", view.caption);
        print!("{}", render_board(view));
        if !view.targets.is_empty() {
            println!("[to {player}] {} cells left to fire at", view.targets.len());
        }
        Ok(self.issue())
    }

    async fn delete(&self, _player: PlayerId, _handle: MessageHandle) -> anyhow::Result<()> {
        Ok(())
    }
}
