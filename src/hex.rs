//! Cubic hex-coordinate arithmetic (C1).

use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::ops;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

/// Policy bound on a single axis; coordinates outside `[-BOUND, BOUND]` on q or r
/// are rejected by the validator as malformed before they ever reach the board.
pub const COORD_BOUND: i32 = 50;

#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Ord, PartialOrd, Default)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Hex {
        Hex { q, r }
    }

    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn in_bounds(&self) -> bool {
        self.q.abs() <= COORD_BOUND && self.r.abs() <= COORD_BOUND
    }
}

impl ops::Add<Hex> for Hex {
    type Output = Hex;
    fn add(self, rhs: Hex) -> Hex {
        Hex { q: self.q + rhs.q, r: self.r + rhs.r }
    }
}

impl ops::Sub<Hex> for Hex {
    type Output = Hex;
    fn sub(self, rhs: Hex) -> Hex {
        Hex { q: self.q - rhs.q, r: self.r - rhs.r }
    }
}

/// The six neighbour directions, in a fixed circular order (required by the
/// Freedom-to-Move gate, which looks at the two directions adjacent to a slide).
#[derive(PartialEq, Eq, Hash, Debug, EnumIter, Clone, Copy)]
pub enum Direction {
    UpLeft,
    UpRight,
    Right,
    DownRight,
    DownLeft,
    Left,
}

impl Direction {
    pub fn vector(&self) -> Hex {
        match *self {
            Direction::UpLeft => Hex { q: 0, r: -1 },
            Direction::UpRight => Hex { q: 1, r: -1 },
            Direction::Right => Hex { q: 1, r: 0 },
            Direction::DownRight => Hex { q: 0, r: 1 },
            Direction::DownLeft => Hex { q: -1, r: 1 },
            Direction::Left => Hex { q: -1, r: 0 },
        }
    }

    /// The direction counter-clockwise from this one, wrapping around the circle.
    pub fn prev(&self) -> Direction {
        let all: Vec<Direction> = Direction::iter().collect();
        let idx = all.iter().position(|d| d == self).unwrap();
        all[(idx + all.len() - 1) % all.len()]
    }

    /// The direction clockwise from this one, wrapping around the circle.
    pub fn next(&self) -> Direction {
        let all: Vec<Direction> = Direction::iter().collect();
        let idx = all.iter().position(|d| d == self).unwrap();
        all[(idx + 1) % all.len()]
    }
}

pub fn neighbor(hex: Hex, direction: Direction) -> Hex {
    hex + direction.vector()
}

pub fn neighbors(hex: Hex) -> impl Iterator<Item = Hex> {
    Direction::iter().map(move |d| neighbor(hex, d))
}

/// max(|Δq|, |Δr|, |Δs|), the hex-grid distance.
pub fn distance(a: Hex, b: Hex) -> i32 {
    let d = a - b;
    d.q.abs().max(d.r.abs()).max(d.s().abs())
}

pub fn are_neighbours(a: Hex, b: Hex) -> bool {
    distance(a, b) == 1
}

impl Display for Hex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

#[derive(Error, Debug)]
pub enum HexParseError {
    #[error("expected \"q,r\", got {0:?}")]
    WrongShape(String),
    #[error("invalid coordinate integer: {0}")]
    InvalidInt(#[from] ParseIntError),
    #[error("coordinate {0:?} is out of bounds")]
    OutOfBounds(Hex),
}

impl FromStr for Hex {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let (Some(q), Some(r), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(HexParseError::WrongShape(s.to_string()));
        };
        let hex = Hex { q: q.trim().parse()?, r: r.trim().parse()? };
        if !hex.in_bounds() {
            return Err(HexParseError::OutOfBounds(hex));
        }
        Ok(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn distance_identity() {
        assert_eq!(0, distance(Hex::ORIGIN, Hex::ORIGIN));
    }

    #[test]
    fn distance_to_each_neighbor_is_one() {
        for n in neighbors(Hex::ORIGIN) {
            assert_eq!(1, distance(Hex::ORIGIN, n));
        }
    }

    #[test]
    fn s_coordinate_keeps_the_cubic_invariant() {
        let h = Hex { q: 3, r: -5 };
        assert_eq!(0, h.q + h.r + h.s());
    }

    #[test]
    fn parses_and_displays_wire_notation() {
        let hex: Hex = "3,-2".parse().unwrap();
        assert_eq!(Hex { q: 3, r: -2 }, hex);
        assert_eq!("3,-2", hex.to_string());
    }

    #[test]
    fn rejects_out_of_bounds_coordinates() {
        assert!(matches!("1000,0".parse::<Hex>(), Err(HexParseError::OutOfBounds(_))));
    }

    #[test]
    fn rejects_malformed_wire_notation() {
        assert!(matches!("1".parse::<Hex>(), Err(HexParseError::WrongShape(_))));
        assert!(matches!("1,2,3".parse::<Hex>(), Err(HexParseError::WrongShape(_))));
    }
}
