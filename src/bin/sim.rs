use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::{rngs::SmallRng, SeedableRng};
use seabattle::{
    transport::in_memory::RecordingNotifier, Dispatcher, GameConfig, HitOutcome, Identity, MemoryStatsStore,
    StatisticsStore,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <seed>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;

    let notifier = Arc::new(RecordingNotifier::new());
    let stats = Arc::new(MemoryStatsStore::new());
    let config = GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    };
    let dispatcher = Dispatcher::new(config, notifier.clone(), stats.clone())?;
    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(1));

    let bots = [Identity::new(1, "alpha"), Identity::new(2, "bravo")];
    for bot in &bots {
        dispatcher.start_session(bot).await?;
    }

    let mut shots = [0usize; 2];
    let mut hits = [0usize; 2];
    let finish = loop {
        let info = dispatcher
            .session_of(bots[0].id)
            .await
            .ok_or_else(|| anyhow::anyhow!("session vanished before a winner"))?;
        let idx = if info.active == bots[0].id { 0 } else { 1 };
        let shooter = &bots[idx];
        let view = notifier
            .last_board(shooter.id)
            .ok_or_else(|| anyhow::anyhow!("no board for {}", shooter.name))?;
        let target = *view
            .targets
            .choose(&mut rng)
            .ok_or_else(|| anyhow::anyhow!("no targets left for {}", shooter.name))?;

        let shot = dispatcher.hit(shooter, target).await?;
        shots[idx] += 1;
        if shot.outcome != HitOutcome::Miss {
            hits[idx] += 1;
        }
        if let Some(finish) = shot.finish {
            break finish;
        }
    };

    let leaderboard = stats.query_leaderboard(2).await?;
    let result = json!({
        "seed": seed,
        "winner": finish.winner.name,
        "loser": finish.loser.name,
        "alpha": {"shots": shots[0], "hits": hits[0]},
        "bravo": {"shots": shots[1], "hits": hits[1]},
        "leaderboard": leaderboard,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
