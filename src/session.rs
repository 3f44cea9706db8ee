//! Turn state machine for one match between two players.

use std::fmt;

use tokio::time::Instant;

use crate::common::{GameError, HitOutcome};
use crate::config::{GameConfig, TimerReset};
use crate::coordinate::Coordinate;
use crate::grid::View;
use crate::notice::{BoardView, Notice};
use crate::player::{Identity, MessageHandle, PlayerId, PlayerState};
use crate::timer::{whole_seconds, InactivityTimer, TimerCheck, TimerDriver};

/// Arena key of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Every segment of the loser's fleet was destroyed.
    Victory,
    /// The active player let the inactivity timer run out.
    Surrender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    AwaitingOpponent,
    InProgress,
    Finished(FinishReason),
}

/// How a match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finish {
    pub session: SessionId,
    pub reason: FinishReason,
    pub winner: Identity,
    pub loser: Identity,
}

/// Result of an accepted shot.
#[derive(Debug)]
pub struct ShotReport {
    pub outcome: HitOutcome,
    /// Shooter's streak after this shot.
    pub streak: u32,
    pub finish: Option<Finish>,
    pub notices: Vec<Notice>,
}

/// Result of an inactivity tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// Nothing to do: not running, or the tick raced a reset.
    Ignored,
    Reminder {
        remaining_secs: u64,
        notices: Vec<Notice>,
    },
    Forfeit {
        finish: Finish,
        notices: Vec<Notice>,
    },
}

pub struct Session {
    id: SessionId,
    /// Creator first, joiner second.
    players: Vec<PlayerState>,
    active: usize,
    status: SessionStatus,
    timer: InactivityTimer,
    timer_reset: TimerReset,
    driver: Option<TimerDriver>,
    disposed: bool,
}

impl Session {
    /// Open a session for its first player. Returns the greeting notices.
    pub fn new(id: SessionId, creator: PlayerState, config: &GameConfig) -> (Self, Vec<Notice>) {
        let notices = vec![
            Notice::board(
                creator.id(),
                BoardView {
                    snapshot: creator.grid().snapshot(View::Full),
                    caption: "Your fleet".to_string(),
                    targets: Vec::new(),
                },
            ),
            Notice::text(creator.id(), "Waiting for another player..."),
        ];
        let session = Self {
            id,
            players: vec![creator],
            active: 0,
            status: SessionStatus::AwaitingOpponent,
            timer: InactivityTimer::new(config.tick, config.forfeit_after),
            timer_reset: config.timer_reset,
            driver: None,
            disposed: false,
        };
        (session, notices)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, SessionStatus::Finished(_))
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// Player whose turn it is.
    pub fn active_player(&self) -> &PlayerState {
        &self.players[self.active]
    }

    /// Defending player, `None` while waiting for an opponent.
    pub fn passive_player(&self) -> Option<&PlayerState> {
        self.players.get(1 - self.active)
    }

    pub fn timer(&self) -> &InactivityTimer {
        &self.timer
    }

    /// Seat the second player and start the match. The creator moves first.
    pub fn join(&mut self, joiner: PlayerState, now: Instant) -> Result<Vec<Notice>, GameError> {
        if self.status != SessionStatus::AwaitingOpponent {
            return Err(GameError::AlreadyFull);
        }
        if self.contains(joiner.id()) {
            return Err(GameError::AlreadyInSession);
        }
        self.players.push(joiner);
        self.active = 0;
        self.status = SessionStatus::InProgress;
        self.timer.reset(now);
        log::info!(
            "session {} started: {} vs {}",
            self.id,
            self.players[0].name(),
            self.players[1].name()
        );

        let (creator, joiner) = (&self.players[0], &self.players[1]);
        let mut notices = vec![
            Notice::text(
                creator.id(),
                format!("{} joined the game. Your move.", joiner.name()),
            ),
            Notice::text(
                joiner.id(),
                format!(
                    "You joined the game, your opponent is {}. Waiting for their move.",
                    creator.name()
                ),
            ),
        ];
        notices.extend(self.board_notices());
        Ok(notices)
    }

    /// Fire at `at` on behalf of `requester`.
    pub fn hit(&mut self, requester: PlayerId, at: Coordinate, now: Instant) -> Result<ShotReport, GameError> {
        match self.status {
            SessionStatus::Finished(_) => return Err(GameError::GameAlreadyFinished),
            SessionStatus::AwaitingOpponent if self.contains(requester) => {
                return Err(GameError::OpponentNotJoined)
            }
            SessionStatus::AwaitingOpponent => return Err(GameError::NotYourTurn),
            SessionStatus::InProgress => {}
        }
        if self.active_player().id() != requester {
            return Err(GameError::NotYourTurn);
        }

        let passive = 1 - self.active;
        let outcome = self.players[passive].grid_mut().resolve(at)?;
        self.players[self.active].record_shot(outcome);
        let streak = self.players[self.active].streak();

        match self.timer_reset {
            TimerReset::EveryHit => self.reset_timer(now),
            TimerReset::TurnChange if !outcome.is_hit() => self.reset_timer(now),
            TimerReset::TurnChange => {}
        }

        if outcome.is_hit() && self.players[passive].grid().all_sunk() {
            let finish = self.finish(FinishReason::Victory);
            let notices = self.victory_notices();
            return Ok(ShotReport {
                outcome,
                streak,
                finish: Some(finish),
                notices,
            });
        }

        let shooter = self.players[self.active].name().to_string();
        let (shooter_id, target_id) = (self.players[self.active].id(), self.players[passive].id());
        let mut notices = match outcome {
            HitOutcome::Hit => {
                let mut text = format!("Hit at {at}!");
                if streak > 1 {
                    text.push_str(&format!(" That's {streak} hits in a row!"));
                }
                text.push_str(" Fire again.");
                vec![
                    Notice::text(shooter_id, text),
                    Notice::text(target_id, format!("{shooter} hit your ship at {at}!")),
                ]
            }
            HitOutcome::Sunk => vec![
                Notice::text(shooter_id, format!("Sunk at {at}! Fire again.")),
                Notice::text(target_id, format!("{shooter} sank your ship at {at}!")),
            ],
            HitOutcome::Miss => vec![
                Notice::text(shooter_id, format!("Miss at {at}.")),
                Notice::text(target_id, format!("{shooter} missed at {at}. Your turn.")),
            ],
        };
        if outcome == HitOutcome::Miss {
            self.active = passive;
        }
        notices.extend(self.board_notices());
        Ok(ShotReport {
            outcome,
            streak,
            finish: None,
            notices,
        })
    }

    /// Apply an inactivity tick observed at `now`.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.status != SessionStatus::InProgress {
            return TickOutcome::Ignored;
        }
        match self.timer.check(now) {
            TimerCheck::Idle | TimerCheck::Stale => TickOutcome::Ignored,
            TimerCheck::Remaining(left) => {
                let secs = whole_seconds(left);
                let (active, passive) = self.roles();
                let notices = vec![
                    Notice::text(
                        active.id(),
                        format!(
                            "{} is waiting for your move. Hurry, the game ends in {secs} seconds.",
                            passive.name()
                        ),
                    ),
                    Notice::text(
                        passive.id(),
                        format!("Waiting for {}'s move. They have {secs} seconds left.", active.name()),
                    ),
                ];
                TickOutcome::Reminder {
                    remaining_secs: secs,
                    notices,
                }
            }
            TimerCheck::Expired => {
                let finish = self.finish(FinishReason::Surrender);
                let notices = self.surrender_notices();
                TickOutcome::Forfeit { finish, notices }
            }
        }
    }

    /// Attach the task driving this session's ticks.
    pub fn attach_driver(&mut self, driver: TimerDriver) {
        if let Some(old) = self.driver.replace(driver) {
            old.stop();
        }
    }

    /// Release the driver without aborting it. Used from inside its own tick.
    pub fn detach_driver(&mut self) -> Option<TimerDriver> {
        self.driver.take()
    }

    /// Stop the timer and hand back every tracked message for deletion.
    /// Later calls return nothing.
    pub fn dispose(&mut self) -> Vec<(PlayerId, MessageHandle)> {
        if self.disposed {
            return Vec::new();
        }
        self.disposed = true;
        self.timer.stop();
        if let Some(driver) = self.driver.take() {
            driver.stop();
        }
        self.players
            .iter()
            .flat_map(|p| p.take_messages().into_iter().map(move |h| (p.id(), h)))
            .collect()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn reset_timer(&mut self, now: Instant) {
        self.timer.reset(now);
        if let Some(driver) = &self.driver {
            driver.restart();
        }
    }

    fn roles(&self) -> (&PlayerState, &PlayerState) {
        (&self.players[self.active], &self.players[1 - self.active])
    }

    fn finish(&mut self, reason: FinishReason) -> Finish {
        self.status = SessionStatus::Finished(reason);
        self.timer.stop();
        let (active, passive) = self.roles();
        let (winner, loser) = match reason {
            FinishReason::Victory => (active, passive),
            FinishReason::Surrender => (passive, active),
        };
        log::info!(
            "session {} finished by {:?}: {} beat {}",
            self.id,
            reason,
            winner.name(),
            loser.name()
        );
        Finish {
            session: self.id,
            reason,
            winner: winner.identity().clone(),
            loser: loser.identity().clone(),
        }
    }

    /// Board for the shooter (opponent's grid, restricted, with targets) and
    /// for the defender (own grid, full).
    fn board_notices(&self) -> Vec<Notice> {
        let (active, passive) = self.roles();
        vec![
            Notice::board(
                active.id(),
                BoardView {
                    snapshot: passive.grid().snapshot(View::Restricted),
                    caption: format!("{}'s fleet", passive.name()),
                    targets: passive.grid().available_targets(),
                },
            ),
            Notice::board(
                passive.id(),
                BoardView {
                    snapshot: passive.grid().snapshot(View::Full),
                    caption: format!("Your fleet. Waiting for {}'s move.", active.name()),
                    targets: Vec::new(),
                },
            ),
        ]
    }

    fn reveal(&self, viewer: &PlayerState, owner: &PlayerState) -> Notice {
        Notice::board(
            viewer.id(),
            BoardView {
                snapshot: owner.grid().snapshot(View::Full),
                caption: format!("{}'s fleet", owner.name()),
                targets: Vec::new(),
            },
        )
        .untracked()
    }

    fn victory_notices(&self) -> Vec<Notice> {
        let (winner, loser) = self.roles();
        vec![
            self.reveal(winner, loser),
            self.reveal(loser, winner),
            Notice::text(
                winner.id(),
                format!(
                    "Congratulations on your victory, {}! {}'s fleet is destroyed.",
                    winner.name(),
                    loser.name()
                ),
            )
            .untracked(),
            Notice::text(
                loser.id(),
                format!("{} destroyed your fleet. Defeat.", winner.name()),
            )
            .untracked(),
        ]
    }

    fn surrender_notices(&self) -> Vec<Notice> {
        let (loser, winner) = self.roles();
        vec![
            self.reveal(loser, winner),
            Notice::text(
                loser.id(),
                format!(
                    "Time is up, you surrendered and lost the game. {} wins.",
                    winner.name()
                ),
            )
            .untracked(),
            Notice::text(
                winner.id(),
                format!("{} surrendered, so you win!", loser.name()),
            )
            .untracked(),
        ]
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("status", &self.status)
            .field(
                "players",
                &self.players.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("active", &self.active)
            .finish()
    }
}
