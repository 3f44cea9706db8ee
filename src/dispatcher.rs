//! Matchmaking and command routing.
//!
//! Every registry and session transition happens under one registry lock, so
//! a timer forfeit and a concurrent shot are strictly ordered. Transport and
//! statistics I/O runs after the lock is released; its failures are logged and
//! swallowed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, Weak};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::command::Command;
use crate::common::{ConfigError, GameError, HitOutcome};
use crate::config::GameConfig;
use crate::coordinate::Coordinate;
use crate::fleet::FleetPlacer;
use crate::notice::{Notice, NoticeBody};
use crate::player::{Identity, MessageHandle, MessageSlots, PlayerId, PlayerState, SharedSlots};
use crate::session::{Finish, FinishReason, Session, SessionId, SessionStatus, TickOutcome};
use crate::stats::StatisticsStore;
use crate::timer::TimerDriver;
use crate::transport::Notifier;

/// One chat message addressed to the bot.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub player: Identity,
    pub text: String,
}

/// What `start-session` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// New session opened, waiting for an opponent.
    Created(SessionId),
    /// Seated as the second player of a waiting session.
    Joined(SessionId),
    /// The player already has a live session; nothing changed.
    AlreadyPlaying(SessionId, SessionStatus),
}

/// Result of an accepted shot, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shot {
    pub outcome: HitOutcome,
    pub streak: u32,
    pub finish: Option<Finish>,
}

/// Read-only summary of a player's current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub status: SessionStatus,
    pub active: PlayerId,
    pub players: Vec<PlayerId>,
}

struct Registry {
    sessions: HashMap<SessionId, Session>,
    players: HashMap<PlayerId, SessionId>,
    /// Players whose last session ended, until their next `start-session`.
    finished: HashMap<PlayerId, SessionId>,
    next_id: u64,
    rng: SmallRng,
}

impl Registry {
    /// Drop a finished session from the arena and the player index, leaving
    /// a tombstone so late shots are told the game is over.
    fn remove(&mut self, id: SessionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        for p in session.players() {
            if self.players.get(&p.id()) == Some(&id) {
                self.players.remove(&p.id());
                self.finished.insert(p.id(), id);
            }
        }
        Some(session)
    }

    /// Session `player` is playing in, or the error for a shot without one.
    fn live_session_of(&self, player: PlayerId) -> Result<SessionId, GameError> {
        match (self.players.get(&player), self.finished.get(&player)) {
            (Some(&id), _) => Ok(id),
            (None, Some(_)) => Err(GameError::GameAlreadyFinished),
            (None, None) => Err(GameError::NoActiveGame),
        }
    }
}

/// A notice plus the slot cell to record its handle in.
struct Outgoing {
    notice: Notice,
    slots: Option<SharedSlots>,
}

/// I/O to perform once the registry lock is released.
#[derive(Default)]
struct Effects {
    cleanup: Vec<(PlayerId, MessageHandle)>,
    outgoing: Vec<Outgoing>,
    units: Vec<Identity>,
    finish: Option<Finish>,
}

struct Shared {
    registry: Mutex<Registry>,
    notifier: Arc<dyn Notifier>,
    stats: Arc<dyn StatisticsStore>,
    config: GameConfig,
    placer: FleetPlacer,
    /// Dispatcher's own replies, deleted on the player's next command.
    replies: StdMutex<HashMap<PlayerId, Vec<MessageHandle>>>,
}

/// Routes player commands to sessions. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

fn lock_slots(slots: &SharedSlots) -> MutexGuard<'_, MessageSlots> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Pair each notice with its recipient's slots, when tracked.
fn route(session: &Session, notices: Vec<Notice>) -> Vec<Outgoing> {
    notices
        .into_iter()
        .map(|notice| {
            let slots = notice
                .tracked
                .then(|| session.player(notice.to).map(PlayerState::messages))
                .flatten();
            Outgoing { notice, slots }
        })
        .collect()
}

fn untracked(notices: Vec<Notice>) -> Vec<Outgoing> {
    notices
        .into_iter()
        .map(|notice| Outgoing { notice, slots: None })
        .collect()
}

impl Dispatcher {
    pub fn new(
        config: GameConfig,
        notifier: Arc<dyn Notifier>,
        stats: Arc<dyn StatisticsStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            }
        };
        let placer = FleetPlacer::new(config.fleet.clone(), config.placement);
        Ok(Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry {
                    sessions: HashMap::new(),
                    players: HashMap::new(),
                    finished: HashMap::new(),
                    next_id: 1,
                    rng,
                }),
                notifier,
                stats,
                config,
                placer,
                replies: StdMutex::new(HashMap::new()),
            }),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.shared.config
    }

    /// Handle one chat message. Returns `true` if it was a game command.
    pub async fn handle_command(&self, player: &Identity, text: &str) -> bool {
        let Some(command) = Command::parse(text) else {
            return false;
        };
        log::debug!("{} ({}) sent {:?}", player.name, player.id, command);
        self.clear_replies(player.id).await;
        match command {
            Command::StartSession => match self.start_session(player).await {
                Ok(StartOutcome::AlreadyPlaying(_, SessionStatus::AwaitingOpponent)) => {
                    self.reply(player.id, "You already started a game. Still waiting for an opponent.")
                        .await
                }
                Ok(StartOutcome::AlreadyPlaying(_, _)) => {
                    self.reply(player.id, "You already have a game in progress!").await
                }
                Ok(_) => {}
                Err(e) => self.reply(player.id, &e.to_string()).await,
            },
            Command::Hit(Ok(at)) => {
                if let Err(e) = self.hit(player, at).await {
                    self.reply(player.id, &e.to_string()).await;
                }
            }
            Command::Hit(Err(e)) => {
                self.reply(player.id, &GameError::from(e).to_string()).await;
            }
            Command::Leaderboard => self.leaderboard(player).await,
            Command::MyStatistics => self.my_statistics(player).await,
        }
        true
    }

    /// Create, join, or report the player's session.
    pub async fn start_session(&self, player: &Identity) -> Result<StartOutcome, GameError> {
        let shared = &self.shared;
        let mut effects = Effects::default();
        let outcome = {
            let mut guard = shared.registry.lock().await;
            let reg = &mut *guard;

            if let Some(&id) = reg.players.get(&player.id) {
                match reg.sessions.get(&id).map(Session::status) {
                    Some(status) => return Ok(StartOutcome::AlreadyPlaying(id, status)),
                    None => {
                        reg.players.remove(&player.id);
                    }
                }
            }
            reg.finished.remove(&player.id);

            let waiting = reg
                .sessions
                .values()
                .filter(|s| s.status() == SessionStatus::AwaitingOpponent && !s.contains(player.id))
                .map(Session::id)
                .min();

            let state = PlayerState::with_random_fleet(player.clone(), &shared.placer, &mut reg.rng)
                .map_err(|e| {
                    log::warn!("fleet placement failed for {}: {}", player.id, e);
                    GameError::from(e)
                })?;

            match waiting.and_then(|id| reg.sessions.get_mut(&id)) {
                Some(session) => {
                    let id = session.id();
                    let notices = session.join(state, Instant::now())?;
                    session.attach_driver(self.spawn_timer(id));
                    effects.outgoing = route(session, notices);
                    reg.players.insert(player.id, id);
                    StartOutcome::Joined(id)
                }
                None => {
                    let id = SessionId(reg.next_id);
                    reg.next_id += 1;
                    let (session, notices) = Session::new(id, state, &shared.config);
                    effects.outgoing = route(&session, notices);
                    reg.sessions.insert(id, session);
                    reg.players.insert(player.id, id);
                    log::info!("session {} opened by {}", id, player.name);
                    StartOutcome::Created(id)
                }
            }
        };
        self.apply(effects).await;
        Ok(outcome)
    }

    /// Fire at `at` in the player's session.
    pub async fn hit(&self, player: &Identity, at: Coordinate) -> Result<Shot, GameError> {
        let mut effects = Effects::default();
        let shot = {
            let mut guard = self.shared.registry.lock().await;
            let reg = &mut *guard;
            let id = reg.live_session_of(player.id)?;
            let session = reg.sessions.get_mut(&id).ok_or(GameError::NoActiveGame)?;
            let report = session.hit(player.id, at, Instant::now())?;
            if report.outcome.is_hit() {
                effects.units.push(player.clone());
            }
            match &report.finish {
                Some(finish) => {
                    effects.cleanup = session.dispose();
                    effects.outgoing = untracked(report.notices);
                    effects.finish = Some(finish.clone());
                    reg.remove(id);
                }
                None => effects.outgoing = route(session, report.notices),
            }
            Shot {
                outcome: report.outcome,
                streak: report.streak,
                finish: report.finish,
            }
        };
        self.apply(effects).await;
        Ok(shot)
    }

    /// Apply one inactivity tick. Returns `false` once the timer should stop.
    async fn on_tick(&self, id: SessionId) -> bool {
        let mut effects = Effects::default();
        let keep_running = {
            let mut guard = self.shared.registry.lock().await;
            let reg = &mut *guard;
            let Some(session) = reg.sessions.get_mut(&id) else {
                return false;
            };
            match session.tick(Instant::now()) {
                TickOutcome::Ignored => !session.is_finished(),
                TickOutcome::Reminder {
                    remaining_secs,
                    notices,
                } => {
                    log::debug!("session {} reminder, {}s left", id, remaining_secs);
                    effects.outgoing = route(session, notices);
                    true
                }
                TickOutcome::Forfeit { finish, notices } => {
                    // this task is the driver; let it run to completion
                    drop(session.detach_driver());
                    effects.cleanup = session.dispose();
                    effects.outgoing = untracked(notices);
                    effects.finish = Some(finish);
                    reg.remove(id);
                    false
                }
            }
        };
        self.apply(effects).await;
        keep_running
    }

    fn spawn_timer(&self, id: SessionId) -> TimerDriver {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        TimerDriver::spawn(self.shared.config.tick, move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(shared) => Dispatcher { shared }.on_tick(id).await,
                    None => false,
                }
            }
        })
    }

    /// Summary of the session `player` is registered to.
    pub async fn session_of(&self, player: PlayerId) -> Option<SessionInfo> {
        self.inspect(player, |s| SessionInfo {
            id: s.id(),
            status: s.status(),
            active: s.active_player().id(),
            players: s.players().iter().map(PlayerState::id).collect(),
        })
        .await
    }

    /// Run `f` against the player's session under the registry lock.
    pub async fn inspect<T>(&self, player: PlayerId, f: impl FnOnce(&Session) -> T) -> Option<T> {
        let guard = self.shared.registry.lock().await;
        let id = guard.players.get(&player)?;
        guard.sessions.get(id).map(f)
    }

    pub async fn session_count(&self) -> usize {
        self.shared.registry.lock().await.sessions.len()
    }

    /// Players currently registered to a session.
    pub async fn current_players(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.shared.registry.lock().await.players.keys().copied().collect();
        ids.sort();
        ids
    }

    async fn leaderboard(&self, player: &Identity) {
        let stats = &self.shared.stats;
        let text = match stats.query_leaderboard(self.shared.config.leaderboard_size).await {
            Ok(records) if records.is_empty() => "No games have been played yet.".to_string(),
            Ok(records) => {
                let mut text = String::from("Leaderboard:");
                for (i, r) in records.iter().enumerate() {
                    text.push_str(&format!(
                        "\n{}. {}: {} wins ({} by surrender), {} units destroyed",
                        i + 1,
                        r.name,
                        r.total_wins(),
                        r.surrender_wins,
                        r.units_destroyed
                    ));
                }
                text
            }
            Err(e) => {
                log::warn!("leaderboard query failed: {}", e);
                "Statistics are unavailable right now.".to_string()
            }
        };
        self.reply(player.id, &text).await;
    }

    async fn my_statistics(&self, player: &Identity) {
        let stats = &self.shared.stats;
        let text = match (stats.query_record(player.id).await, stats.query_rank(player.id).await) {
            (Ok(Some(r)), Ok(rank)) => {
                let mut text = format!(
                    "{}, you have {} victories, {} wins by surrender and {} units destroyed.",
                    player.name, r.games_won, r.surrender_wins, r.units_destroyed
                );
                if let Some(rank) = rank {
                    text.push_str(&format!(" Rank {} of {}.", rank.rank, rank.total));
                }
                text
            }
            (Ok(None), _) => "You have no statistics yet. Play a game first!".to_string(),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("statistics query for {} failed: {}", player.id, e);
                "Statistics are unavailable right now.".to_string()
            }
        };
        self.reply(player.id, &text).await;
    }

    /// Send a dispatcher reply, remembered for deletion on the next command.
    async fn reply(&self, to: PlayerId, text: &str) {
        match self.shared.notifier.notify(to, text).await {
            Ok(handle) => self.replies().entry(to).or_default().push(handle),
            Err(e) => log::warn!("reply to {} failed: {}", to, e),
        }
    }

    async fn clear_replies(&self, player: PlayerId) {
        let handles = self.replies().remove(&player).unwrap_or_default();
        for handle in handles {
            if let Err(e) = self.shared.notifier.delete(player, handle).await {
                log::warn!("deleting reply for {} failed: {}", player, e);
            }
        }
    }

    fn replies(&self) -> MutexGuard<'_, HashMap<PlayerId, Vec<MessageHandle>>> {
        self.shared
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn apply(&self, effects: Effects) {
        let Effects {
            cleanup,
            outgoing,
            units,
            finish,
        } = effects;
        let notifier = &self.shared.notifier;
        for (player, handle) in cleanup {
            if let Err(e) = notifier.delete(player, handle).await {
                log::warn!("cleanup delete for {} failed: {}", player, e);
            }
        }
        for out in outgoing {
            self.deliver(out).await;
        }
        let stats = &self.shared.stats;
        for player in units {
            if let Err(e) = stats.increment_units_destroyed(&player).await {
                log::warn!("recording destroyed unit for {} failed: {}", player.id, e);
            }
        }
        if let Some(finish) = finish {
            let res = match finish.reason {
                FinishReason::Victory => stats.increment_win(&finish.winner).await,
                FinishReason::Surrender => stats.increment_surrender_win(&finish.winner).await,
            };
            if let Err(e) = res {
                log::warn!("recording win for {} failed: {}", finish.winner.id, e);
            }
        }
    }

    /// Send one notice, replacing the previous message of the same kind.
    /// Tracked notices for a session that was disposed meanwhile are dropped,
    /// or deleted again if the dispose raced the send.
    async fn deliver(&self, out: Outgoing) {
        let notifier = &self.shared.notifier;
        let Outgoing { notice, slots } = out;
        let is_board = matches!(notice.body, NoticeBody::Board(_));
        let mut previous = None;
        if let Some(s) = &slots {
            let mut slots = lock_slots(s);
            if slots.is_closed() {
                log::debug!("dropping notice for {}, session already over", notice.to);
                return;
            }
            previous = if is_board { slots.board.take() } else { slots.text.take() };
        }
        if let Some(handle) = previous {
            if let Err(e) = notifier.delete(notice.to, handle).await {
                log::warn!("deleting previous message for {} failed: {}", notice.to, e);
            }
        }
        let sent = match &notice.body {
            NoticeBody::Text(text) => notifier.notify(notice.to, text).await,
            NoticeBody::Board(view) => notifier.notify_with_board_view(notice.to, view).await,
        };
        let handle = match sent {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("notifying {} failed: {}", notice.to, e);
                return;
            }
        };
        let stale = slots.as_ref().and_then(|s| lock_slots(s).record(is_board, handle));
        if let Some(stale) = stale {
            if let Err(e) = notifier.delete(notice.to, stale).await {
                log::warn!("deleting stale message for {} failed: {}", notice.to, e);
            }
        }
    }

    /// Dispose every live session and tell its players the host is going away.
    pub async fn shutdown(&self) {
        let (cleanup, players) = {
            let mut guard = self.shared.registry.lock().await;
            let reg = &mut *guard;
            let mut cleanup = Vec::new();
            let mut players = Vec::new();
            for (_, mut session) in reg.sessions.drain() {
                cleanup.extend(session.dispose());
                players.extend(session.players().iter().map(|p| p.identity().clone()));
            }
            reg.players.clear();
            reg.finished.clear();
            (cleanup, players)
        };
        log::info!("dispatcher shutting down, {} players notified", players.len());
        self.apply(Effects {
            cleanup,
            ..Effects::default()
        })
        .await;
        let pending: Vec<PlayerId> = self.replies().keys().copied().collect();
        for player in pending {
            self.clear_replies(player).await;
        }
        for player in players {
            let text = format!("The host is shutting down. Thanks for playing, {}!", player.name);
            if let Err(e) = self.shared.notifier.notify(player.id, &text).await {
                log::warn!("shutdown notice to {} failed: {}", player.id, e);
            }
        }
    }

    /// Consume inbound messages until the channel closes, then shut down.
    ///
    /// Each player gets a worker task fed by its own queue, so one player's
    /// commands are handled in arrival order while different players run
    /// concurrently. Workers live until the inbox closes.
    pub async fn serve(&self, mut inbox: mpsc::Receiver<Inbound>) {
        let mut tasks = JoinSet::new();
        let mut queues: HashMap<PlayerId, mpsc::UnboundedSender<Inbound>> = HashMap::new();
        while let Some(msg) = inbox.recv().await {
            let player = msg.player.id;
            let queue = queues.entry(player).or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                tasks.spawn(self.clone().work_queue(rx));
                tx
            });
            if let Err(mpsc::error::SendError(lost)) = queue.send(msg) {
                log::warn!("worker for {} is gone, dropping {:?}", player, lost.text);
                queues.remove(&player);
            }
            while let Some(res) = tasks.try_join_next() {
                if let Err(e) = res {
                    log::warn!("command task failed: {}", e);
                }
            }
        }
        drop(queues);
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                log::warn!("command task failed: {}", e);
            }
        }
        self.shutdown().await;
    }

    async fn work_queue(self, mut queue: mpsc::UnboundedReceiver<Inbound>) {
        while let Some(msg) = queue.recv().await {
            if !self.handle_command(&msg.player, &msg.text).await {
                log::debug!("ignored message from {}: {:?}", msg.player.id, msg.text);
            }
        }
    }
}
