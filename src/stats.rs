//! Win/loss statistics: the store seam and an in-memory implementation with
//! optional snapshot file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::player::{Identity, PlayerId};

/// Per-player counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub games_won: u32,
    pub surrender_wins: u32,
    pub units_destroyed: u32,
}

impl PlayerRecord {
    fn new(player: &Identity) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            games_won: 0,
            surrender_wins: 0,
            units_destroyed: 0,
        }
    }

    /// Victories plus wins by opponent surrender.
    pub fn total_wins(&self) -> u32 {
        self.games_won + self.surrender_wins
    }
}

/// Leaderboard position: 1-based rank out of `total` ranked players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub rank: usize,
    pub total: usize,
}

/// Persistence of statistics. Callers treat every failure as non-fatal.
#[async_trait::async_trait]
pub trait StatisticsStore: Send + Sync {
    async fn increment_win(&self, player: &Identity) -> anyhow::Result<()>;
    async fn increment_surrender_win(&self, player: &Identity) -> anyhow::Result<()>;
    async fn increment_units_destroyed(&self, player: &Identity) -> anyhow::Result<()>;
    /// Best `top_n` records, best first.
    async fn query_leaderboard(&self, top_n: usize) -> anyhow::Result<Vec<PlayerRecord>>;
    async fn query_record(&self, player: PlayerId) -> anyhow::Result<Option<PlayerRecord>>;
    /// `None` when the player has no record yet.
    async fn query_rank(&self, player: PlayerId) -> anyhow::Result<Option<Rank>>;
}

#[derive(Debug, Clone, Copy)]
enum Counter {
    Win,
    SurrenderWin,
    UnitDestroyed,
}

/// Statistics kept in memory, optionally mirrored to a bincode snapshot file.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    records: Mutex<HashMap<PlayerId, PlayerRecord>>,
    path: Option<PathBuf>,
    /// Serializes snapshot writes so an older snapshot never lands last.
    writer: tokio::sync::Mutex<()>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the snapshot at `path` if it exists; every later mutation rewrites it.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let list: Vec<PlayerRecord> = bincode::deserialize(&bytes)
                    .map_err(|e| anyhow::anyhow!("corrupt statistics file {}: {}", path.display(), e))?;
                list.into_iter().map(|r| (r.id, r)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::info!("loaded {} statistics records from {}", records.len(), path.display());
        Ok(Self {
            records: Mutex::new(records),
            path: Some(path),
            writer: tokio::sync::Mutex::new(()),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PlayerId, PlayerRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All records in leaderboard order.
    fn ranked(&self) -> Vec<PlayerRecord> {
        let mut list: Vec<PlayerRecord> = self.lock().values().cloned().collect();
        list.sort_by(|a, b| {
            b.total_wins()
                .cmp(&a.total_wins())
                .then(b.units_destroyed.cmp(&a.units_destroyed))
                .then(a.id.cmp(&b.id))
        });
        list
    }

    async fn bump(&self, player: &Identity, counter: Counter) -> anyhow::Result<()> {
        let _writer = self.writer.lock().await;
        let snapshot = {
            let mut records = self.lock();
            let record = records
                .entry(player.id)
                .or_insert_with(|| PlayerRecord::new(player));
            record.name.clone_from(&player.name);
            match counter {
                Counter::Win => record.games_won += 1,
                Counter::SurrenderWin => record.surrender_wins += 1,
                Counter::UnitDestroyed => record.units_destroyed += 1,
            }
            self.path.as_ref().map(|_| records.values().cloned().collect::<Vec<_>>())
        };
        if let (Some(path), Some(list)) = (&self.path, snapshot) {
            let bytes = bincode::serialize(&list)
                .map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
            tokio::fs::write(path, bytes).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StatisticsStore for MemoryStatsStore {
    async fn increment_win(&self, player: &Identity) -> anyhow::Result<()> {
        self.bump(player, Counter::Win).await
    }

    async fn increment_surrender_win(&self, player: &Identity) -> anyhow::Result<()> {
        self.bump(player, Counter::SurrenderWin).await
    }

    async fn increment_units_destroyed(&self, player: &Identity) -> anyhow::Result<()> {
        self.bump(player, Counter::UnitDestroyed).await
    }

    async fn query_leaderboard(&self, top_n: usize) -> anyhow::Result<Vec<PlayerRecord>> {
        let mut list = self.ranked();
        list.truncate(top_n);
        Ok(list)
    }

    async fn query_record(&self, player: PlayerId) -> anyhow::Result<Option<PlayerRecord>> {
        Ok(self.lock().get(&player).cloned())
    }

    async fn query_rank(&self, player: PlayerId) -> anyhow::Result<Option<Rank>> {
        let list = self.ranked();
        let total = list.len();
        Ok(list
            .iter()
            .position(|r| r.id == player)
            .map(|i| Rank { rank: i + 1, total }))
    }
}
