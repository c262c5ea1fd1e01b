//! Per-match state machine: turns, hands, clock, victory, terminal handling (C4).

use crate::board::Board;
use crate::hex::{neighbors, Hex};
use crate::piece::{initial_count, Color, Piece, PieceId, Species};
use crate::rules;
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;

const DEFAULT_MOVE_CLOCK: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Active,
    /// Winner decided; rotation is pending after the broker's configured
    /// rotation delay (`Config::rotation_delay`).
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Color),
    Draw,
}

/// Per-player remaining piece counts. Invariant: `sum(hand) + (pieces of that
/// colour on board) == 11`, and no entry ever exceeds its initial ceiling.
#[derive(Debug, Clone, Copy)]
pub struct Hand {
    counts: [u8; 5],
}

fn species_index(species: Species) -> usize {
    match species {
        Species::Queen => 0,
        Species::Ant => 1,
        Species::Spider => 2,
        Species::Beetle => 3,
        Species::Grasshopper => 4,
    }
}

impl Hand {
    pub fn full() -> Hand {
        let mut counts = [0u8; 5];
        for species in Species::iter() {
            counts[species_index(species)] = initial_count(species);
        }
        Hand { counts }
    }

    pub fn remaining(&self, species: Species) -> u8 {
        self.counts[species_index(species)]
    }

    pub fn queen_in_hand(&self) -> bool {
        self.remaining(Species::Queen) > 0
    }

    fn take(&mut self, species: Species) -> bool {
        let slot = &mut self.counts[species_index(species)];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total_remaining(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }
}

/// A piece identifier generator unique within a match.
#[derive(Debug, Clone, Default)]
struct PieceIdAllocator(PieceId);

impl PieceIdAllocator {
    fn next(&mut self) -> PieceId {
        self.0 += 1;
        self.0
    }
}

/// A committed action that advanced the turn, as recorded for the log and
/// for building a snapshot. `Pass` records a move-clock timeout.
#[derive(Debug, Clone, Copy)]
pub enum Commit {
    Place { hex: Hex, species: Species, color: Color },
    Move { from: Hex, to: Hex, color: Color },
    Pass { color: Color },
    Forfeit { color: Color },
}

#[derive(Debug, Clone)]
pub struct Match {
    pub phase: Phase,
    pub board: Board,
    pub white_hand: Hand,
    pub black_hand: Hand,
    pub turn_number: u32,
    pub current_color: Color,
    pub outcome: Option<Outcome>,
    pub log: Vec<String>,
    clock_anchor: Instant,
    move_clock: Duration,
    ids: PieceIdAllocator,
}

impl Match {
    pub fn new() -> Match {
        Match {
            phase: Phase::Waiting,
            board: Board::new(),
            white_hand: Hand::full(),
            black_hand: Hand::full(),
            turn_number: 1,
            current_color: Color::White,
            outcome: None,
            log: Vec::new(),
            clock_anchor: Instant::now(),
            move_clock: DEFAULT_MOVE_CLOCK,
            ids: PieceIdAllocator::default(),
        }
    }

    /// Overrides the per-turn move clock, read from `Config::move_clock` by
    /// the broker when it starts a match. Takes effect on the next
    /// `reset_clock` (the following `start`/commit).
    pub fn set_move_clock(&mut self, move_clock: Duration) {
        self.move_clock = move_clock;
    }

    /// The current mover's personal turn index: ⌈turnNumber / 2⌉. Only
    /// meaningful for the player whose turn it currently is -- `turnNumber`'s
    /// parity already identifies that player.
    pub fn current_personal_turn_index(&self) -> u32 {
        self.turn_number.div_ceil(2)
    }

    pub fn hand(&self, color: Color) -> &Hand {
        match color {
            Color::White => &self.white_hand,
            Color::Black => &self.black_hand,
        }
    }

    fn hand_mut(&mut self, color: Color) -> &mut Hand {
        match color {
            Color::White => &mut self.white_hand,
            Color::Black => &mut self.black_hand,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn seconds_left_on_clock(&self) -> u64 {
        self.move_clock.saturating_sub(self.clock_anchor.elapsed()).as_secs()
    }

    pub fn clock_expired(&self) -> bool {
        self.phase == Phase::Active && self.clock_anchor.elapsed() >= self.move_clock
    }

    /// Resets board, hands, and turn counters for a new match between the
    /// current seats; the match object itself (and its log) persists.
    pub fn start(&mut self) {
        self.phase = Phase::Active;
        self.board = Board::new();
        self.white_hand = Hand::full();
        self.black_hand = Hand::full();
        self.turn_number = 1;
        self.current_color = Color::White;
        self.outcome = None;
        self.ids = PieceIdAllocator::default();
        self.reset_clock();
    }

    fn reset_clock(&mut self) {
        self.clock_anchor = Instant::now();
    }

    fn append_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Applies a PLACE action already validated by the caller (C5). Panics
    /// if the invariants the validator is supposed to guarantee don't hold --
    /// those are bugs in the validator, not user-triggerable.
    pub fn commit_place(&mut self, species: Species, hex: Hex) {
        let color = self.current_color;
        let id = self.ids.next();
        assert!(self.hand_mut(color).take(species), "commit_place: hand exhausted for {species}");
        self.board.push(hex, Piece { id, species, color });
        self.append_log(format!("{color} places {species} at {hex}"));
        self.finish_turn(Commit::Place { hex, species, color });
    }

    /// Applies a MOVE action already validated by the caller (C5).
    pub fn commit_move(&mut self, from: Hex, to: Hex) {
        let color = self.current_color;
        let piece = self.board.pop_top(from);
        self.board.push(to, piece);
        self.append_log(format!("{color} moves {} from {from} to {to}", piece.species));
        self.finish_turn(Commit::Move { from, to, color });
    }

    /// The move-clock budget elapsed with no action: commit a PASS on the
    /// current player's behalf. Never touches hands or the board.
    pub fn commit_timeout_pass(&mut self) {
        let color = self.current_color;
        self.append_log(format!("{color} ran out of time and passes"));
        self.finish_turn(Commit::Pass { color });
    }

    pub fn commit_forfeit(&mut self, color: Color) {
        self.append_log(format!("{color} forfeits"));
        self.outcome = Some(Outcome::Winner(color.opposite()));
        self.phase = Phase::Terminal;
        self.append_log(format!("{} wins by forfeit", color.opposite()));
    }

    /// Declares the match an unrecoverable draw after an internal invariant
    /// violation (section 7, error kind 6). The engine keeps running; this
    /// match is simply abandoned.
    pub fn force_draw(&mut self, reason: &str) {
        self.outcome = Some(Outcome::Draw);
        self.phase = Phase::Terminal;
        self.append_log(format!("match forced to a draw: {reason}"));
    }

    fn finish_turn(&mut self, commit: Commit) {
        if let Some(outcome) = self.check_victory(commit) {
            self.outcome = Some(outcome);
            self.phase = Phase::Terminal;
            match outcome {
                Outcome::Winner(color) => self.append_log(format!("{color} wins")),
                Outcome::Draw => self.append_log("both queens surrounded on the same move: draw"),
            }
            return;
        }
        self.current_color = self.current_color.opposite();
        self.turn_number += 1;
        self.reset_clock();
    }

    /// A Queen is surrounded when all six of its neighbours are occupied,
    /// regardless of who owns the top piece there.
    fn queen_hexes(&self) -> Vec<(Hex, Color)> {
        self.board
            .top_pieces()
            .filter(|(_, p)| p.species == Species::Queen)
            .map(|(hex, p)| (hex, p.color))
            .collect()
    }

    fn check_victory(&self, commit: Commit) -> Option<Outcome> {
        let surrounded: Vec<Color> = self
            .queen_hexes()
            .into_iter()
            .filter(|(hex, _)| self.board.is_surrounded(*hex))
            .map(|(_, color)| color)
            .collect();

        match surrounded.len() {
            0 => None,
            2 => {
                // The moving side caused the double-surround and therefore loses.
                let mover = match commit {
                    Commit::Place { color, .. } | Commit::Move { color, .. } => Some(color),
                    _ => None,
                };
                Some(mover.map_or(Outcome::Draw, |m| Outcome::Winner(m.opposite())))
            }
            1 => Some(Outcome::Winner(surrounded[0].opposite())),
            _ => unreachable!("there are only two queens"),
        }
    }

    /// All empty neighbours of every occupied hex, used by callers that need
    /// the raw geometry rather than rule-filtered placements.
    pub fn touched_hexes(&self) -> impl Iterator<Item = Hex> + '_ {
        self.board.occupied_coords().flat_map(neighbors)
    }
}

impl Default for Match {
    fn default() -> Match {
        Match::new()
    }
}

/// Verifies the hand-conservation invariant for one colour: remaining hand
/// plus on-board pieces of that colour always sums to 11.
pub fn hand_conservation_holds(state: &Match, color: Color) -> bool {
    state.hand(color).total_remaining() + count_pieces_of_color(state, color) == 11
}

fn count_pieces_of_color(state: &Match, color: Color) -> u32 {
    let mut count = 0u32;
    for hex in state.board.occupied_coords() {
        if let Some(cell) = state.board.get(hex) {
            count += cell.iter().filter(|p| p.color == color).count() as u32;
        }
    }
    count
}

/// `pieceMoves(from)` convenience re-export at the match level for callers
/// that only have a [`Match`] in hand.
pub fn piece_moves(state: &Match, from: Hex) -> rustc_hash::FxHashSet<Hex> {
    rules::piece_moves(&state.board, from)
}
