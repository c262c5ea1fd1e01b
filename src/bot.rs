//! Alpha-beta minimax bot (C7): computes a move for the seat it occupies
//! over the same action space a human player has, via the `minimax` crate's
//! negamax strategy -- single-threaded, matching the engine's cooperative
//! concurrency model (section 5), unlike the teacher's `ParallelSearch`.

use crate::hex::{distance, Hex};
use crate::match_state::Match;
use crate::piece::{Color, Species};
use crate::rules;
use log::{debug, warn};
use minimax::{Evaluation, Evaluator, Game, Negamax, Strategy, Winner};
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;

/// The bot's scheduling delay window after a human move leaves it to act
/// (section 4.7). A suspension point, not a search parameter.
pub const BOT_DELAY_MIN: Duration = Duration::from_millis(1500);
pub const BOT_DELAY_MAX: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMove {
    Place { species: Species, hex: Hex },
    Move { from: Hex, to: Hex },
    Pass,
}

fn material_weight(species: Species) -> i32 {
    match species {
        Species::Queen => 1000,
        Species::Ant => 200,
        Species::Beetle => 180,
        Species::Spider => 150,
        Species::Grasshopper => 120,
    }
}

fn queen_hex(state: &Match, color: Color) -> Option<Hex> {
    state.board.top_pieces().find(|(_, p)| p.species == Species::Queen && p.color == color).map(|(h, _)| h)
}

/// Legal moves for whichever colour currently has the turn, in the order
/// the move-ordering heuristic prefers: Queen placements first, then moves
/// and placements closer to the enemy Queen.
fn legal_moves(state: &Match) -> Vec<BotMove> {
    let color = state.current_color;
    let mut moves = Vec::new();

    let hand = state.hand(color);
    let must_place_queen =
        rules::queen_must_be_placed_this_turn(hand.queen_in_hand(), state.current_personal_turn_index());

    for species in Species::iter() {
        if must_place_queen && species != Species::Queen {
            continue;
        }
        if hand.remaining(species) == 0 {
            continue;
        }
        for hex in rules::valid_placements(&state.board, color) {
            moves.push(BotMove::Place { species, hex });
        }
    }

    if !hand.queen_in_hand() {
        for from in state.board.top_pieces_of(color).collect::<Vec<_>>() {
            for to in rules::piece_moves(&state.board, from) {
                moves.push(BotMove::Move { from, to });
            }
        }
    }

    if moves.is_empty() {
        return vec![BotMove::Pass];
    }

    let enemy_queen = queen_hex(state, color.opposite());
    moves.sort_by_key(|m| move_order_key(*m, enemy_queen));
    moves
}

fn move_order_key(m: BotMove, enemy_queen: Option<Hex>) -> (u8, i32) {
    match m {
        BotMove::Place { species: Species::Queen, .. } => (0, 0),
        BotMove::Place { hex, .. } => (1, proximity(hex, enemy_queen)),
        BotMove::Move { to, .. } => (1, proximity(to, enemy_queen)),
        BotMove::Pass => (2, 0),
    }
}

fn proximity(hex: Hex, enemy_queen: Option<Hex>) -> i32 {
    enemy_queen.map_or(0, |q| distance(hex, q))
}

struct HiveGame;

impl Game for HiveGame {
    type S = Match;
    type M = BotMove;

    fn generate_moves(state: &Match, moves: &mut Vec<BotMove>) {
        moves.extend(legal_moves(state));
    }

    fn apply(state: &mut Match, m: BotMove) -> Option<Match> {
        let mut next = state.clone();
        match m {
            BotMove::Place { species, hex } => next.commit_place(species, hex),
            BotMove::Move { from, to } => next.commit_move(from, to),
            BotMove::Pass => next.commit_timeout_pass(),
        }
        Some(next)
    }

    fn get_winner(state: &Match) -> Option<Winner> {
        use crate::match_state::Outcome;
        match state.outcome {
            None => None,
            Some(Outcome::Draw) => Some(Winner::Draw),
            // `current_color` only flips on a non-terminal commit, so on a
            // terminal state it still names whoever made the winning (or
            // forfeiting) move.
            Some(Outcome::Winner(winner)) if winner == state.current_color => Some(Winner::PlayerJustMoved),
            Some(Outcome::Winner(_)) => Some(Winner::PlayerToMove),
        }
    }
}

/// The weighted evaluator from section 4.7, scored from the perspective of
/// whichever colour is to move in the state being evaluated.
#[derive(Clone, Default)]
struct HiveEvaluator;

impl Evaluator for HiveEvaluator {
    type G = HiveGame;

    fn evaluate(&self, s: &Match) -> Evaluation {
        let me = s.current_color;
        let opp = me.opposite();

        let material: i32 = s
            .board
            .top_pieces()
            .map(|(_, p)| if p.color == me { material_weight(p.species) } else { -material_weight(p.species) })
            .sum();
        let material = (material as f64 * 0.8) as i32;

        let mut score = material;

        let my_queen = queen_hex(s, me);
        let their_queen = queen_hex(s, opp);

        score += match my_queen {
            Some(hex) => {
                let empty = s.board.unoccupied_neighbors(hex).count() as i32;
                let surrounded = if s.board.is_surrounded(hex) { -2000 } else { 0 };
                empty * 40 + surrounded
            }
            None => -150,
        };

        if let Some(hex) = their_queen {
            let occupied = s.board.occupied_neighbors(hex).count() as i32;
            score += occupied * 70;
            if s.board.is_surrounded(hex) {
                score += 2000;
            }
        }

        let my_mobility: i32 = s.board.top_pieces_of(me).map(|h| s.board.unoccupied_neighbors(h).count() as i32).sum();
        let their_mobility: i32 =
            s.board.top_pieces_of(opp).map(|h| s.board.unoccupied_neighbors(h).count() as i32).sum();
        score += 3 * (my_mobility - their_mobility);

        let my_stuck = s.board.top_pieces_of(me).filter(|h| s.board.unoccupied_neighbors(*h).count() == 0).count() as i32;
        let their_stuck =
            s.board.top_pieces_of(opp).filter(|h| s.board.unoccupied_neighbors(*h).count() == 0).count() as i32;
        score += 40 * (their_stuck - my_stuck);

        if !s.board.is_hive_connected(None) {
            score -= 1000;
        }

        if let (Some(a), Some(b)) = (my_queen, their_queen) {
            score += 5 * 0.max(10 - distance(a, b));
        }

        score.clamp(i32::from(minimax::WORST_EVAL) + 1, i32::from(minimax::BEST_EVAL) - 1) as Evaluation
    }
}

/// A seat-bound bot player: one [`Negamax`] search per call, depth fixed by
/// `Config::bot_search_depth`.
pub struct Bot {
    strategy: Negamax<HiveEvaluator>,
    pondering_time: Duration,
    max_pondering_time: Duration,
}

impl Bot {
    pub fn new(search_depth: u8, pondering_time: Duration, max_pondering_time: Duration) -> Bot {
        Bot { strategy: Negamax::new(HiveEvaluator, search_depth), pondering_time, max_pondering_time }
    }

    /// Computes the bot's move for the colour currently to move in `state`.
    /// Returns `None` only when the match is already terminal. Logs if the
    /// search ran past its configured ponder budget (section 4.7's
    /// "suspension" clause) -- the search itself is synchronous and cannot
    /// be cancelled once started.
    pub fn choose_move(&mut self, state: &Match) -> Option<BotMove> {
        let started = Instant::now();
        let chosen = self.strategy.choose_move(state);
        let elapsed = started.elapsed();
        if elapsed > self.max_pondering_time {
            warn!("bot search took {elapsed:?}, past its {:?} ceiling", self.max_pondering_time);
        } else if elapsed > self.pondering_time {
            debug!("bot search took {elapsed:?}, past its {:?} budget", self.pondering_time);
        }
        chosen
    }
}
