//! Error taxonomy (section 7 / C10): the engine never panics its way out to
//! a caller for anything a client can trigger. Rule failures are local,
//! silent drops; only a genuine internal invariant violation is fatal, and
//! even that is caught and downgraded to a forced draw rather than unwound.

use crate::hex::Hex;
use thiserror::Error;

/// Why an inbound action was rejected. None of these mutate state; the
/// caller logs at `warn!` (or drops silently, per the action kind) and moves
/// on -- never anything more specific reaches the sender than a generic
/// error frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("no seat for this session")]
    NotSeated,
    #[error("it is not this player's turn")]
    NotYourTurn,
    #[error("the match is not accepting actions right now")]
    MatchNotActive,
    #[error("coordinate out of bounds")]
    OutOfBounds,
    #[error("hand is empty for this species")]
    HandEmpty,
    #[error("{hex} is not a legal placement")]
    IllegalPlacement { hex: Hex },
    #[error("the queen must be placed by a player's fourth turn")]
    QueenOpeningViolation,
    #[error("the queen has not been placed yet; no moves are legal")]
    QueenNotPlaced,
    #[error("no piece at {hex}")]
    EmptySource { hex: Hex },
    #[error("the piece at {hex} does not belong to this player")]
    NotYourPiece { hex: Hex },
    #[error("{to} is not reachable from {from}")]
    IllegalDestination { from: Hex, to: Hex },
    #[error("rate limit exceeded")]
    RateLimited,
}

/// Section 7, error kind 6: an internal invariant was violated (a
/// disconnected hive outside of search, an empty mapping entry, ...). These
/// are bugs, not rule violations; the caller forces the current match to a
/// draw and logs at `error!` rather than propagating a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("internal invariant violated: {0}")]
pub struct EngineFault(pub String);
