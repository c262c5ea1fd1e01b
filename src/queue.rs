//! King-of-the-Hill queue and seating controller (C6).

use crate::piece::Color;
use std::collections::VecDeque;
use thiserror::Error;

pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub session: SessionId,
    pub nickname: String,
    pub is_bot: bool,
    pub wins: u32,
}

/// Whether a join request should start a match immediately, queue, or
/// interrupt a running bot match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Both seats are now filled; the caller should start a new match.
    MatchReady,
    /// One seat filled, waiting on an opponent.
    Waiting,
    /// Appended to the queue tail.
    Queued { position: usize },
    /// A bot match was interrupted; the new session took the bot's seat and
    /// play continues mid-match (the caller resets to a fresh match per
    /// section 4.6's "bot-match interruption").
    InterruptedBotMatch,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("a bot match can only be requested when the queue is empty and no human opponent is seated")]
pub struct BotMatchRejected;

/// Owns the two seats and the waiting queue; knows nothing about board
/// state. Consulted only at match boundaries per section 2.
#[derive(Debug, Clone, Default)]
pub struct Seating {
    pub white: Option<Seat>,
    pub black: Option<Seat>,
    queue: VecDeque<Seat>,
}

impl Seating {
    pub fn new() -> Seating {
        Seating::default()
    }

    pub fn seat(&self, color: Color) -> Option<&Seat> {
        match color {
            Color::White => self.white.as_ref(),
            Color::Black => self.black.as_ref(),
        }
    }

    pub fn color_of(&self, session: SessionId) -> Option<Color> {
        if self.white.as_ref().is_some_and(|s| s.session == session) {
            Some(Color::White)
        } else if self.black.as_ref().is_some_and(|s| s.session == session) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn is_bot_match(&self) -> bool {
        self.white.as_ref().is_some_and(|s| s.is_bot) || self.black.as_ref().is_some_and(|s| s.is_bot)
    }

    pub fn queue_names(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(|s| s.nickname.as_str())
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// A new human session joining. See section 4.6.
    pub fn join_as_human(&mut self, session: SessionId, nickname: String) -> JoinOutcome {
        let seat = Seat { session, nickname, is_bot: false, wins: 0 };

        if self.is_bot_match() {
            if self.white.as_ref().is_some_and(|s| s.is_bot) {
                self.white = Some(seat);
            } else {
                self.black = Some(seat);
            }
            return JoinOutcome::InterruptedBotMatch;
        }

        if self.white.is_none() {
            self.white = Some(seat);
            return if self.black.is_some() { JoinOutcome::MatchReady } else { JoinOutcome::Waiting };
        }

        if self.black.is_none() {
            self.black = Some(seat);
            return JoinOutcome::MatchReady;
        }

        self.queue.push_back(seat);
        JoinOutcome::Queued { position: self.queue.len() }
    }

    /// A bot-match request: only accepted when the queue is empty and the
    /// seat opposite the requester is unoccupied by another human. The bot
    /// is dealt White or Black at random (section 4.6).
    pub fn join_vs_bot(&mut self, session: SessionId, nickname: String) -> Result<Color, BotMatchRejected> {
        if !self.queue.is_empty() || self.white.is_some() || self.black.is_some() {
            return Err(BotMatchRejected);
        }

        let human_seat = Seat { session, nickname, is_bot: false, wins: 0 };
        let bot_seat = Seat { session: 0, nickname: "Bot".into(), is_bot: true, wins: 0 };

        let bot_color = if rand::random::<bool>() { Color::White } else { Color::Black };
        match bot_color {
            Color::White => {
                self.white = Some(bot_seat);
                self.black = Some(human_seat);
            }
            Color::Black => {
                self.white = Some(human_seat);
                self.black = Some(bot_seat);
            }
        }
        Ok(bot_color)
    }

    /// Rotation on Terminal (section 4.6): winner retains White, loser goes
    /// to the queue tail, the queue head (if any) becomes Black. Both
    /// rematch as White/Black if the queue was empty.
    pub fn rotate(&mut self, winner: Color) {
        let winner_seat = self.seat(winner).cloned();
        let loser_seat = self.seat(winner.opposite()).cloned();

        self.white = winner_seat;
        self.black = None;

        if let Some(loser) = loser_seat {
            self.queue.push_back(loser);
        }

        if let Some(next) = self.queue.pop_front() {
            self.black = Some(next);
        } else if let Some(rematch) = self.queue.pop_back() {
            // The only entry we just pushed was the loser themselves: empty
            // queue before rotation, so they rematch.
            self.black = Some(rematch);
        }
    }

    /// A seated human disconnecting during an active (non-bot) match: that
    /// colour forfeits. Returns the colour that should forfeit, if seated.
    pub fn disconnect(&mut self, session: SessionId) -> Option<Color> {
        let color = self.color_of(session)?;
        if self.is_bot_match() {
            // Tear down both seats; no forfeit bookkeeping for a bot match.
            self.white = None;
            self.black = None;
            return None;
        }
        Some(color)
    }

    pub fn clear(&mut self) {
        self.white = None;
        self.black = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_two_joiners_fill_white_then_black() {
        let mut s = Seating::new();
        assert_eq!(JoinOutcome::Waiting, s.join_as_human(1, "alice".into()));
        assert_eq!(Color::White, s.color_of(1).unwrap());
        assert_eq!(JoinOutcome::MatchReady, s.join_as_human(2, "bob".into()));
        assert_eq!(Color::Black, s.color_of(2).unwrap());
    }

    #[test]
    fn a_third_joiner_is_queued() {
        let mut s = Seating::new();
        s.join_as_human(1, "alice".into());
        s.join_as_human(2, "bob".into());
        assert_eq!(JoinOutcome::Queued { position: 1 }, s.join_as_human(3, "carol".into()));
        assert_eq!(vec!["carol"], s.queue_names().collect::<Vec<_>>());
    }

    #[test]
    fn rotation_keeps_the_winner_as_white_and_promotes_the_queue_head() {
        let mut s = Seating::new();
        s.join_as_human(1, "alice".into());
        s.join_as_human(2, "bob".into());
        s.join_as_human(3, "carol".into());

        s.rotate(Color::White); // alice won
        assert_eq!("alice", s.seat(Color::White).unwrap().nickname);
        assert_eq!("carol", s.seat(Color::Black).unwrap().nickname);
        assert_eq!(vec!["bob"], s.queue_names().collect::<Vec<_>>());
    }

    #[test]
    fn rotation_with_an_empty_queue_is_a_rematch() {
        let mut s = Seating::new();
        s.join_as_human(1, "alice".into());
        s.join_as_human(2, "bob".into());

        s.rotate(Color::Black); // bob won
        assert_eq!("bob", s.seat(Color::White).unwrap().nickname);
        assert_eq!("alice", s.seat(Color::Black).unwrap().nickname);
    }

    #[test]
    fn bot_match_rejected_when_queue_nonempty() {
        let mut s = Seating::new();
        s.join_as_human(1, "alice".into());
        s.join_as_human(2, "bob".into());
        s.join_as_human(3, "carol".into());
        assert!(s.join_vs_bot(4, "dave".into()).is_err());
    }

    #[test]
    fn bot_match_fills_the_opposite_seat() {
        let mut s = Seating::new();
        let bot_color = s.join_vs_bot(1, "alice".into()).unwrap();
        assert!(s.seat(bot_color).unwrap().is_bot);
        assert!(!s.seat(bot_color.opposite()).unwrap().is_bot);
        assert_eq!("alice", s.seat(bot_color.opposite()).unwrap().nickname);
    }

    #[test]
    fn bot_colour_assignment_lands_on_both_sides_over_many_trials() {
        let mut saw_white_bot = false;
        let mut saw_black_bot = false;
        for i in 0..200 {
            let mut s = Seating::new();
            match s.join_vs_bot(i, "alice".into()).unwrap() {
                Color::White => saw_white_bot = true,
                Color::Black => saw_black_bot = true,
            }
            if saw_white_bot && saw_black_bot {
                break;
            }
        }
        assert!(saw_white_bot && saw_black_bot);
    }

    #[test]
    fn a_new_human_interrupts_a_bot_match() {
        let mut s = Seating::new();
        s.join_vs_bot(1, "alice".into()).unwrap();
        assert_eq!(JoinOutcome::InterruptedBotMatch, s.join_as_human(2, "bob".into()));
        assert!(!s.is_bot_match());
    }

    #[test]
    fn disconnect_during_a_bot_match_clears_both_seats() {
        let mut s = Seating::new();
        s.join_vs_bot(1, "alice".into()).unwrap();
        assert_eq!(None, s.disconnect(1));
        assert!(s.seat(Color::White).is_none());
        assert!(s.seat(Color::Black).is_none());
    }

    #[test]
    fn disconnect_during_a_human_match_forfeits_that_colour() {
        let mut s = Seating::new();
        s.join_as_human(1, "alice".into());
        s.join_as_human(2, "bob".into());
        assert_eq!(Some(Color::White), s.disconnect(1));
    }
}
