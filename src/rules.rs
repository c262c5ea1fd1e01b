//! Placement legality and per-species movement generation (C3).

use crate::board::Board;
use crate::hex::{are_neighbours, neighbor, neighbors, Direction, Hex};
use crate::piece::{Color, Species};
use rustc_hash::FxHashSet;
use strum::IntoEnumIterator;

/// `validPlacements(colour)`: the empty coordinates where `colour` may place
/// a new piece, per the three cases in the spec.
pub fn valid_placements(board: &Board, color: Color) -> FxHashSet<Hex> {
    if board.is_empty() {
        return FxHashSet::from_iter([Hex::ORIGIN]);
    }

    if board.top_pieces_of(color).next().is_none() {
        // Seeding the second colour: every empty coordinate adjacent to any
        // occupied cell.
        return board
            .occupied_coords()
            .flat_map(neighbors)
            .filter(|h| !board.is_occupied(*h))
            .collect();
    }

    board
        .top_pieces_of(color)
        .flat_map(|h| board.unoccupied_neighbors(h))
        .filter(|candidate| {
            neighbors(*candidate).all(|n| !board.is_top_color(n, color.opposite()))
        })
        .collect()
}

/// `pieceMoves(from)`: legal destinations for the top piece at `from`.
/// Empty when `from` is unoccupied, or when removing a single-piece stack
/// would break the One-Hive rule.
pub fn piece_moves(board: &Board, from: Hex) -> FxHashSet<Hex> {
    let Some(piece) = board.top_at(from) else {
        return FxHashSet::default();
    };

    if board.stack_height(from) == 1 && !board.is_hive_connected(Some(from)) {
        return FxHashSet::default();
    }

    match piece.species {
        Species::Queen => queen_moves(board, from),
        Species::Ant => ant_moves(board, from),
        Species::Spider => spider_moves(board, from),
        Species::Beetle => beetle_moves(board, from),
        Species::Grasshopper => grasshopper_moves(board, from),
    }
}

/// True if sliding from `from` to `to` (one hex step) is open under the
/// Freedom-to-Move gate: fewer than two of their common neighbours occupied.
/// `ignore` is treated as unoccupied throughout (the piece's original
/// departure square, vacated for the whole of a multi-step slide).
fn slide_gate_open(board: &Board, from: Hex, to: Hex, ignore: Option<Hex>) -> bool {
    let direction = Direction::iter()
        .find(|d| neighbor(from, *d) == to)
        .expect("slide_gate_open called on non-adjacent hexes");

    let pinch_a = neighbor(from, direction.prev());
    let pinch_b = neighbor(from, direction.next());

    let occupied = |h: Hex| Some(h) != ignore && board.is_occupied(h);
    !(occupied(pinch_a) && occupied(pinch_b))
}

/// After a hypothetical move to `to`, is the piece still in contact with the
/// hive (adjacent to an occupied cell other than its own departure square)?
fn stays_in_contact(board: &Board, to: Hex, ignore: Hex) -> bool {
    neighbors(to).any(|n| n != ignore && board.is_occupied(n))
}

fn empty_slide_destinations(board: &Board, from: Hex, ignore: Hex) -> impl Iterator<Item = Hex> + '_ {
    neighbors(from)
        .filter(move |n| Some(*n) != Some(ignore) && !board.is_occupied(*n))
        .filter(move |n| slide_gate_open(board, from, *n, Some(ignore)))
        .filter(move |n| stays_in_contact(board, *n, ignore))
}

fn queen_moves(board: &Board, from: Hex) -> FxHashSet<Hex> {
    empty_slide_destinations(board, from, from).collect()
}

fn beetle_moves(board: &Board, from: Hex) -> FxHashSet<Hex> {
    neighbors(from)
        .filter(|to| slide_gate_open(board, from, *to, Some(from)))
        .filter(|to| board.is_occupied(*to) || stays_in_contact(board, *to, from))
        .collect()
}

fn grasshopper_moves(board: &Board, from: Hex) -> FxHashSet<Hex> {
    let mut dests = FxHashSet::default();
    for direction in Direction::iter() {
        let mut cursor = neighbor(from, direction);
        if !board.is_occupied(cursor) {
            continue;
        }
        while board.is_occupied(cursor) {
            cursor = neighbor(cursor, direction);
        }
        dests.insert(cursor);
    }
    dests
}

/// Ant: breadth-first exploration of the hive perimeter through empty
/// neighbours satisfying the slide gate and hive-contact constraints, with
/// the source treated as empty throughout.
fn ant_moves(board: &Board, from: Hex) -> FxHashSet<Hex> {
    let mut visited = FxHashSet::default();
    let mut frontier = vec![from];
    visited.insert(from);

    while let Some(current) = frontier.pop() {
        for dest in empty_slide_destinations(board, current, from) {
            if visited.insert(dest) {
                frontier.push(dest);
            }
        }
    }
    visited.remove(&from);
    visited
}

/// Spider: exactly three slide steps, no revisiting a cell within the path;
/// destinations are the distinct endpoints of every such walk.
fn spider_moves(board: &Board, from: Hex) -> FxHashSet<Hex> {
    let mut paths: Vec<Vec<Hex>> = vec![vec![from]];

    for _ in 0..3 {
        let mut next_paths = Vec::new();
        for path in &paths {
            let current = *path.last().unwrap();
            for dest in empty_slide_destinations(board, current, from) {
                if path.contains(&dest) {
                    continue;
                }
                let mut extended = path.clone();
                extended.push(dest);
                next_paths.push(extended);
            }
        }
        paths = next_paths;
    }

    paths.into_iter().map(|path| *path.last().unwrap()).collect()
}

/// Queen-opening rule: the personal turn index (⌈turnNumber / 2⌉) by which a
/// player must have placed their Queen.
pub const QUEEN_DEADLINE_TURN: u32 = 4;

pub fn queen_must_be_placed_this_turn(queen_in_hand: bool, personal_turn_index: u32) -> bool {
    queen_in_hand && personal_turn_index >= QUEEN_DEADLINE_TURN
}

pub fn is_adjacent(a: Hex, b: Hex) -> bool {
    are_neighbours(a, b)
}
