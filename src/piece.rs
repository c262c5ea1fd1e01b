//! Piece identity: species, colour, and the stable id that lets a client refer
//! to a specific piece on the wire.

use std::fmt::{self, Display, Formatter};
use strum::{Display, EnumCount, EnumIter, EnumString};

#[derive(
    Debug, Clone, Eq, PartialEq, Copy, Ord, PartialOrd, Hash, Default, Display, EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// The five base-game species this server adjudicates. The Hive expansion
/// pieces (Ladybug, Mosquito, Pillbug) are out of scope.
#[derive(
    PartialEq, Eq, Hash, Debug, Clone, Copy, Ord, PartialOrd, EnumIter, EnumCount, EnumString,
)]
pub enum Species {
    Queen,
    Ant,
    Spider,
    Beetle,
    Grasshopper,
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Species::Queen => "Q",
                Species::Ant => "A",
                Species::Spider => "S",
                Species::Beetle => "B",
                Species::Grasshopper => "G",
            }
        )
    }
}

/// How many of each species a hand starts with; also the ceiling a hand may
/// never exceed (counts only ever decrease).
pub fn initial_count(species: Species) -> u8 {
    match species {
        Species::Queen => 1,
        Species::Spider => 2,
        Species::Beetle => 2,
        Species::Grasshopper => 3,
        Species::Ant => 3,
    }
}

pub type PieceId = u32;

#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
pub struct Piece {
    pub id: PieceId,
    pub species: Species,
    pub color: Color,
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.color == Color::White {
            write!(f, "{}", self.species)
        } else {
            write!(f, "{}", self.species.to_string().to_lowercase())
        }
    }
}
