#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::path::PathBuf;
#[cfg(feature = "std")]
use std::sync::Arc;

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use seabattle::{
    init_logging, transport::console::ConsoleNotifier, Dispatcher, FleetConfig, GameConfig, Identity, Inbound,
    MemoryStatsStore, StatisticsStore, TimerReset,
};
#[cfg(feature = "std")]
use tokio::io::{AsyncBufReadExt, BufReader};
#[cfg(feature = "std")]
use tokio::sync::mpsc;
#[cfg(feature = "std")]
use tokio::time::Duration;

/// Host naval combat matches. Reads `<player-id>[:name] <command>` lines from stdin.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[arg(long, value_delimiter = ',', help = "Ship lengths (e.g., --fleet 5,4,4,3,3,3,2,2,2,2)")]
    fleet: Option<Vec<usize>>,
    #[arg(long, default_value_t = 15, help = "Seconds between inactivity reminders")]
    tick_secs: u64,
    #[arg(long, default_value_t = 60, help = "Seconds of inactivity before the active player forfeits")]
    forfeit_secs: u64,
    #[arg(long, help = "Fix RNG seed for reproducible fleets (e.g., --seed 12345)")]
    seed: Option<u64>,
    #[arg(long, help = "Keep statistics in this file across restarts")]
    stats_file: Option<PathBuf>,
    #[arg(long, default_value_t = 64)]
    inbox_capacity: usize,
    #[arg(long, help = "Reset the inactivity timer only when the turn passes")]
    reset_on_turn_change: bool,
}

#[cfg(feature = "std")]
impl Cli {
    fn config(&self) -> anyhow::Result<GameConfig> {
        let mut config = GameConfig::default();
        if let Some(lengths) = &self.fleet {
            config.fleet = FleetConfig::new(lengths.clone())?;
        }
        config.tick = Duration::from_secs(self.tick_secs);
        config.forfeit_after = Duration::from_secs(self.forfeit_secs);
        config.seed = self.seed;
        if self.reset_on_turn_change {
            config.timer_reset = TimerReset::TurnChange;
        }
        config.validate()?;
        Ok(config)
    }
}

/// `42 hit b3` or `42:alice hit b3`.
#[cfg(feature = "std")]
fn parse_line(line: &str) -> Option<Inbound> {
    let (who, text) = line.trim().split_once(char::is_whitespace)?;
    let (id, name) = match who.split_once(':') {
        Some((id, name)) => (id, name.to_string()),
        None => (who, format!("player{who}")),
    };
    let id: i64 = id.parse().ok()?;
    Some(Inbound {
        player: Identity::new(id, name),
        text: text.trim().to_string(),
    })
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = cli.config()?;

    let stats: Arc<dyn StatisticsStore> = match &cli.stats_file {
        Some(path) => Arc::new(MemoryStatsStore::open(path).await?),
        None => Arc::new(MemoryStatsStore::new()),
    };
    let dispatcher = Dispatcher::new(config, Arc::new(ConsoleNotifier::new()), stats)?;

    let (tx, rx) = mpsc::channel(cli.inbox_capacity.max(1));
    let server = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.serve(rx).await }
    });

    println!("Ready. Send `<player-id>[:name] <command>`, e.g. `1:alice start-session`.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Some(msg) => {
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            None => eprintln!("Expected `<player-id>[:name] <command>`, got {:?}", line),
        }
    }

    drop(tx);
    server.await?;
    Ok(())
}
