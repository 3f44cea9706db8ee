use seabattle::{Identity, MemoryStatsStore, PlayerId, Rank, StatisticsStore};

fn snapshot_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("seabattle-{}-{}.bin", tag, std::process::id()))
}

#[tokio::test]
async fn leaderboard_orders_by_wins_then_units() -> anyhow::Result<()> {
    let store = MemoryStatsStore::new();
    let ann = Identity::new(10, "ann");
    let bob = Identity::new(20, "bob");
    let cid = Identity::new(5, "cid");

    store.increment_win(&ann).await?;
    store.increment_surrender_win(&bob).await?;
    for _ in 0..3 {
        store.increment_units_destroyed(&bob).await?;
    }
    store.increment_win(&cid).await?;
    store.increment_surrender_win(&cid).await?;

    let board = store.query_leaderboard(10).await?;
    let order: Vec<&str> = board.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["cid", "bob", "ann"]);
    assert_eq!(board[0].total_wins(), 2);

    assert_eq!(store.query_leaderboard(1).await?.len(), 1);
    assert_eq!(
        store.query_rank(ann.id).await?,
        Some(Rank { rank: 3, total: 3 })
    );
    assert_eq!(store.query_rank(PlayerId(99)).await?, None);
    Ok(())
}

#[tokio::test]
async fn ties_break_by_id() -> anyhow::Result<()> {
    let store = MemoryStatsStore::new();
    store.increment_win(&Identity::new(7, "late")).await?;
    store.increment_win(&Identity::new(3, "early")).await?;
    let board = store.query_leaderboard(5).await?;
    assert_eq!(board[0].id, PlayerId(3));
    assert_eq!(board[1].id, PlayerId(7));
    Ok(())
}

#[tokio::test]
async fn record_tracks_latest_name() -> anyhow::Result<()> {
    let store = MemoryStatsStore::new();
    store.increment_units_destroyed(&Identity::new(1, "old name")).await?;
    store.increment_win(&Identity::new(1, "new name")).await?;
    let record = store.query_record(PlayerId(1)).await?.unwrap();
    assert_eq!(record.name, "new name");
    assert_eq!(record.games_won, 1);
    assert_eq!(record.units_destroyed, 1);
    Ok(())
}

#[tokio::test]
async fn snapshot_survives_reopen() -> anyhow::Result<()> {
    let path = snapshot_path("reopen");
    let _ = std::fs::remove_file(&path);

    let store = MemoryStatsStore::open(&path).await?;
    assert!(store.query_leaderboard(10).await?.is_empty());
    let ann = Identity::new(1, "ann");
    store.increment_win(&ann).await?;
    store.increment_units_destroyed(&ann).await?;
    drop(store);

    let reopened = MemoryStatsStore::open(&path).await?;
    let record = reopened.query_record(ann.id).await?.unwrap();
    assert_eq!(record.games_won, 1);
    assert_eq!(record.units_destroyed, 1);

    std::fs::remove_file(&path)?;
    Ok(())
}

#[tokio::test]
async fn corrupt_snapshot_is_an_error() -> anyhow::Result<()> {
    let path = snapshot_path("corrupt");
    std::fs::write(&path, [0xff, 0xff, 0xff])?;
    assert!(MemoryStatsStore::open(&path).await.is_err());
    std::fs::remove_file(&path)?;
    Ok(())
}
