//! Session broker (C8): the single serialisation point described in section
//! 5. It owns the match state, the seating controller, and the queue, and
//! is the only component permitted to mutate them. Every public method is
//! one suspension point (inbound message, clock tick, bot-move callback)
//! and returns the resulting snapshot, or `None` when the event was dropped.

use crate::bot::{Bot, BotMove};
use crate::config::Config;
use crate::error::EngineFault;
use crate::hex::Hex;
use crate::match_state::{Match, Outcome, Phase};
use crate::piece::{Color, Piece, Species};
use crate::queue::{JoinOutcome, Seating, SessionId};
use crate::validator::{self, Action};
use itertools::Itertools;
use log::{debug, error, info, warn};
use std::time::Duration;

/// Ingress messages (section 6): one per suspension point the broker
/// accepts from outside the engine.
#[derive(Debug, Clone)]
pub enum Ingress {
    JoinAsHuman { session: SessionId, name: String },
    JoinVsBot { session: SessionId, name: String },
    GameAction { session: SessionId, action: Action },
    Forfeit { session: SessionId },
    Disconnect { session: SessionId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatView {
    pub session: SessionId,
    pub nickname: String,
    pub hand: [(Species, u8); 5],
    pub wins: u32,
    pub is_bot: bool,
}

/// The broadcast-after-every-commit snapshot (section 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Vec<(Hex, Vec<Piece>)>,
    pub white: Option<SeatView>,
    pub black: Option<SeatView>,
    pub queue: Vec<String>,
    pub turn_number: u32,
    pub current_player: Color,
    pub winner: Option<WireOutcome>,
    pub log: Vec<String>,
    pub time_left: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireOutcome {
    White,
    Black,
    Draw,
}

/// The broker's single entry point for "what should happen next" after
/// seating changes: callers schedule a bot move, a rotation timer, or
/// nothing, and hand the result back in at the right suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    None,
    BotToMove,
    RotationPending,
}

pub struct Engine {
    config: Config,
    seating: Seating,
    current: Option<Match>,
    bot: Bot,
}

impl Engine {
    pub fn new(config: Config) -> Engine {
        let bot = Bot::new(config.bot_search_depth, config.bot_pondering_time, config.bot_max_pondering_time);
        Engine { config, seating: Seating::new(), current: None, bot }
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.current.as_ref().map(|m| build_snapshot(m, &self.seating))
    }

    /// How long a caller should wait after a match goes Terminal before
    /// invoking [`Engine::rotate_and_start`] (section 4.6). The broker has
    /// no internal timer of its own -- rotation is caller-driven, like the
    /// bot's scheduling delay.
    pub fn rotation_delay(&self) -> Duration {
        self.config.rotation_delay
    }

    /// Dispatches one ingress message. Returns the resulting snapshot, or
    /// `None` if the event was silently dropped (no match active, sender
    /// not seated, or the action was rejected).
    pub fn handle(&mut self, msg: Ingress) -> Option<Snapshot> {
        match msg {
            Ingress::JoinAsHuman { session, name } => self.join_as_human(session, name),
            Ingress::JoinVsBot { session, name } => self.join_vs_bot(session, name),
            Ingress::GameAction { session, action } => self.game_action(session, action),
            Ingress::Forfeit { session } => self.forfeit(session),
            Ingress::Disconnect { session } => self.disconnect(session),
        }
    }

    fn join_as_human(&mut self, session: SessionId, name: String) -> Option<Snapshot> {
        if self.seating.queue_len() >= self.config.max_queue_len {
            warn!("session {session} dropped: queue is full ({} waiting)", self.config.max_queue_len);
            return self.snapshot();
        }

        match self.seating.join_as_human(session, name) {
            JoinOutcome::MatchReady | JoinOutcome::InterruptedBotMatch => {
                info!("seats filled, starting a new match");
                self.start_match();
            }
            JoinOutcome::Waiting => info!("session {session} waiting for an opponent"),
            JoinOutcome::Queued { position } => info!("session {session} queued at position {position}"),
        }
        self.snapshot()
    }

    fn join_vs_bot(&mut self, session: SessionId, name: String) -> Option<Snapshot> {
        match self.seating.join_vs_bot(session, name) {
            Ok(_bot_color) => {
                info!("session {session} started a bot match");
                self.start_match();
                self.snapshot()
            }
            Err(reason) => {
                warn!("bot match request from {session} rejected: {reason}");
                None
            }
        }
    }

    fn game_action(&mut self, session: SessionId, action: Action) -> Option<Snapshot> {
        let color = self.seating.color_of(session)?;
        let state = self.current.as_mut()?;

        match validator::apply_action(state, color, action) {
            Ok(()) => {
                debug!("{color} committed {action:?} at turn {}", state.turn_number);
                self.after_commit();
                self.snapshot()
            }
            Err(err) => {
                warn!("rejected {action:?} from session {session}: {err}");
                None
            }
        }
    }

    fn forfeit(&mut self, session: SessionId) -> Option<Snapshot> {
        self.game_action(session, Action::Forfeit)
    }

    /// A seated human's transport-level disconnect (section 4.6 / 7 kind 5).
    pub fn disconnect(&mut self, session: SessionId) -> Option<Snapshot> {
        match self.seating.disconnect(session) {
            Some(color) => {
                if let Some(state) = self.current.as_mut()
                    && !state.is_terminal()
                {
                    state.commit_forfeit(color);
                    info!("session {session} disconnected, {color} forfeits");
                    self.after_commit();
                }
                self.snapshot()
            }
            None => {
                info!("session {session} disconnected, bot match torn down");
                self.current = None;
                None
            }
        }
    }

    /// The clock tick suspension point (once per second): commits a PASS if
    /// the move clock has expired.
    pub fn tick(&mut self) -> Option<Snapshot> {
        let state = self.current.as_mut()?;
        if !state.clock_expired() {
            return None;
        }
        state.commit_timeout_pass();
        debug!("move clock expired, committed a timeout pass at turn {}", state.turn_number);
        self.after_commit();
        self.snapshot()
    }

    /// The bot-move callback suspension point, fired after its scheduled
    /// delay (section 4.7). A no-op if the match ended or it is no longer
    /// the bot's turn in the meantime (cancellation, section 5).
    pub fn bot_move(&mut self) -> Option<Snapshot> {
        let state = self.current.as_ref()?;
        if state.is_terminal() {
            return None;
        }
        let color = state.current_color;
        if !self.seating.seat(color).is_some_and(|s| s.is_bot) {
            return None;
        }

        let chosen = self.bot.choose_move(state)?;
        let action = match chosen {
            BotMove::Place { species, hex } => Action::Place { species, hex },
            BotMove::Move { from, to } => Action::Move { from, to },
            BotMove::Pass => {
                // The bot never explicitly passes through the validator;
                // a stalled search just lets the move clock expire.
                return None;
            }
        };

        let state = self.current.as_mut()?;
        match validator::apply_action(state, color, action) {
            Ok(()) => {
                debug!("bot ({color}) committed {action:?}");
                self.after_commit();
                self.snapshot()
            }
            Err(err) => {
                warn!("bot proposed an illegal action, forcing a draw: {err}");
                state.force_draw("bot proposed an illegal action");
                self.after_commit();
                self.snapshot()
            }
        }
    }

    /// Whether the state after the most recent commit calls for scheduling
    /// a bot move (section 4.7's "After each human move that leaves it as
    /// the bot's turn").
    pub fn scheduled(&self) -> Scheduled {
        let Some(state) = &self.current else { return Scheduled::None };
        if state.is_terminal() {
            return Scheduled::RotationPending;
        }
        if self.seating.seat(state.current_color).is_some_and(|s| s.is_bot) {
            return Scheduled::BotToMove;
        }
        Scheduled::None
    }

    /// Rotates seating and starts the next match. Called by the caller
    /// after the rotation delay (section 4.4/4.6) elapses on a Terminal
    /// match.
    pub fn rotate_and_start(&mut self) -> Option<Snapshot> {
        let state = self.current.as_ref()?;
        if !state.is_terminal() {
            return None;
        }
        if let Some(Outcome::Winner(winner)) = state.outcome {
            self.seating.rotate(winner);
        } else {
            // A draw retains seating as-is; both sides rematch.
        }
        self.start_match();
        self.snapshot()
    }

    fn start_match(&mut self) {
        let mut state = self.current.take().unwrap_or_default();
        state.start();
        state.set_move_clock(self.config.move_clock);
        self.current = Some(state);
        let waiting = self.seating.queue_names().join(", ");
        info!("match started (queue: {})", if waiting.is_empty() { "empty" } else { &waiting });
    }

    /// Runs after every commit (human, bot, timeout, or forfeit). Checks the
    /// One-Hive invariant the validator is supposed to guarantee held before
    /// ever letting a commit through -- a failure here means the validator
    /// itself has a bug, not that a player did anything wrong (section 7,
    /// error kind 6).
    fn after_commit(&mut self) {
        let Some(state) = self.current.as_mut() else { return };
        if state.phase != Phase::Terminal && !state.board.is_hive_connected(None) {
            let fault = EngineFault("hive is disconnected after a committed action".into());
            error!("{fault}");
            state.force_draw(&fault.to_string());
        }
        if state.phase == Phase::Terminal {
            match state.outcome {
                Some(Outcome::Winner(color)) => info!("match ended, {color} wins"),
                Some(Outcome::Draw) => info!("match ended in a draw"),
                None => {}
            }
        }
    }
}

fn hand_view(state: &Match, color: Color) -> [(Species, u8); 5] {
    use strum::IntoEnumIterator;
    let hand = state.hand(color);
    let mut view = [(Species::Queen, 0); 5];
    for (slot, species) in view.iter_mut().zip(Species::iter()) {
        *slot = (species, hand.remaining(species));
    }
    view
}

fn build_snapshot(state: &Match, seating: &Seating) -> Snapshot {
    let board = state
        .board
        .occupied_coords()
        .map(|hex| (hex, state.board.get(hex).expect("occupied_coords only yields occupied cells").clone()))
        .collect();

    let seat_view = |color: Color| {
        seating.seat(color).map(|seat| SeatView {
            session: seat.session,
            nickname: seat.nickname.clone(),
            hand: hand_view(state, color),
            wins: seat.wins,
            is_bot: seat.is_bot,
        })
    };

    Snapshot {
        board,
        white: seat_view(Color::White),
        black: seat_view(Color::Black),
        queue: seating.queue_names().map(str::to_string).collect(),
        turn_number: state.turn_number,
        current_player: state.current_color,
        winner: state.outcome.map(|o| match o {
            Outcome::Winner(Color::White) => WireOutcome::White,
            Outcome::Winner(Color::Black) => WireOutcome::Black,
            Outcome::Draw => WireOutcome::Draw,
        }),
        log: state.log.clone(),
        time_left: state.seconds_left_on_clock(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine() -> Engine {
        Engine::new(Config::default())
    }

    #[test]
    fn two_humans_joining_starts_a_match() {
        let mut e = engine();
        assert!(e.handle(Ingress::JoinAsHuman { session: 1, name: "alice".into() }).is_none());
        let snap = e.handle(Ingress::JoinAsHuman { session: 2, name: "bob".into() }).unwrap();
        assert_eq!(1, snap.turn_number);
        assert_eq!(Color::White, snap.current_player);
        assert!(snap.white.is_some());
        assert!(snap.black.is_some());
    }

    #[test]
    fn a_legal_placement_advances_the_snapshot() {
        let mut e = engine();
        e.handle(Ingress::JoinAsHuman { session: 1, name: "alice".into() });
        e.handle(Ingress::JoinAsHuman { session: 2, name: "bob".into() });
        let snap = e
            .handle(Ingress::GameAction {
                session: 1,
                action: Action::Place { species: Species::Queen, hex: Hex::ORIGIN },
            })
            .unwrap();
        assert_eq!(2, snap.turn_number);
        assert_eq!(Color::Black, snap.current_player);
    }

    #[test]
    fn an_illegal_action_is_dropped_and_returns_no_snapshot() {
        let mut e = engine();
        e.handle(Ingress::JoinAsHuman { session: 1, name: "alice".into() });
        e.handle(Ingress::JoinAsHuman { session: 2, name: "bob".into() });
        let dropped = e.handle(Ingress::GameAction {
            session: 2,
            action: Action::Place { species: Species::Queen, hex: Hex::ORIGIN },
        });
        assert!(dropped.is_none());
    }

    #[test]
    fn disconnect_during_an_active_match_forfeits() {
        let mut e = engine();
        e.handle(Ingress::JoinAsHuman { session: 1, name: "alice".into() });
        e.handle(Ingress::JoinAsHuman { session: 2, name: "bob".into() });
        let snap = e.handle(Ingress::Disconnect { session: 1 }).unwrap();
        assert_eq!(Some(WireOutcome::Black), snap.winner);
    }

    #[test]
    fn bot_match_schedules_the_bot_when_it_is_to_move() {
        let mut e = engine();
        e.handle(Ingress::JoinVsBot { session: 1, name: "alice".into() });
        // The bot could be seated White or Black depending on random
        // assignment in the seating controller, so just check the
        // schedule is coherent with whichever colour currently has the
        // turn.
        let scheduled = e.scheduled();
        assert!(scheduled == Scheduled::BotToMove || scheduled == Scheduled::None);
    }

    #[test]
    fn rotate_and_start_is_a_noop_on_a_non_terminal_match() {
        let mut e = engine();
        e.handle(Ingress::JoinAsHuman { session: 1, name: "alice".into() });
        e.handle(Ingress::JoinAsHuman { session: 2, name: "bob".into() });
        assert!(e.rotate_and_start().is_none());
    }

    #[test]
    fn a_disconnected_hive_after_commit_forces_a_draw() {
        let mut e = engine();
        e.handle(Ingress::JoinAsHuman { session: 1, name: "alice".into() });
        e.handle(Ingress::JoinAsHuman { session: 2, name: "bob".into() });

        // Simulate a validator bug slipping a disconnected board past C5:
        // after_commit's invariant check should catch it independently.
        let state = e.current.as_mut().unwrap();
        state.board.push(Hex::new(0, 0), Piece { id: 1, species: Species::Queen, color: Color::White });
        state.board.push(Hex::new(20, 20), Piece { id: 2, species: Species::Queen, color: Color::Black });
        e.after_commit();

        let snap = e.snapshot().unwrap();
        assert_eq!(Some(WireOutcome::Draw), snap.winner);
    }

    #[test]
    fn rotation_after_victory_keeps_the_winner_seated_as_white() {
        let mut e = engine();
        e.handle(Ingress::JoinAsHuman { session: 1, name: "alice".into() });
        e.handle(Ingress::JoinAsHuman { session: 2, name: "bob".into() });
        e.handle(Ingress::Forfeit { session: 1 });
        assert_eq!(Scheduled::RotationPending, e.scheduled());
        let snap = e.rotate_and_start().unwrap();
        assert_eq!("bob", snap.white.unwrap().nickname);
    }
}
