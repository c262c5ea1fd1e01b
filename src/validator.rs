//! Action validator (C5): maps external action messages to legal state
//! transitions. Every rejection is a local, silent drop -- no partial
//! mutation ever happens on a failed validation.

use crate::error::ActionError;
use crate::hex::Hex;
use crate::match_state::Match;
use crate::piece::{Color, Species};
use crate::rules;

/// The three actions the validator accepts (section 4.5 / 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Place { species: Species, hex: Hex },
    Move { from: Hex, to: Hex },
    Forfeit,
}

/// Validates `action` as coming from `sender`, and applies it to `state` if
/// legal. Returns the rejection reason on failure; `state` is untouched in
/// that case.
pub fn apply_action(state: &mut Match, sender: Color, action: Action) -> Result<(), ActionError> {
    if state.is_terminal() {
        return Err(ActionError::MatchNotActive);
    }

    // A forfeit concedes regardless of whose turn it currently is; every
    // other action is only legal on the sender's own turn.
    if action == Action::Forfeit {
        state.commit_forfeit(sender);
        return Ok(());
    }
    if sender != state.current_color {
        return Err(ActionError::NotYourTurn);
    }

    match action {
        Action::Place { species, hex } => validate_place(state, sender, species, hex),
        Action::Move { from, to } => validate_move(state, sender, from, to),
        Action::Forfeit => unreachable!("handled above"),
    }
}

fn validate_place(
    state: &mut Match,
    sender: Color,
    species: Species,
    hex: Hex,
) -> Result<(), ActionError> {
    if !hex.in_bounds() {
        return Err(ActionError::OutOfBounds);
    }

    let hand = state.hand(sender);
    if hand.remaining(species) == 0 {
        return Err(ActionError::HandEmpty);
    }

    if rules::queen_must_be_placed_this_turn(hand.queen_in_hand(), state.current_personal_turn_index())
        && species != Species::Queen
    {
        return Err(ActionError::QueenOpeningViolation);
    }

    if !rules::valid_placements(&state.board, sender).contains(&hex) {
        return Err(ActionError::IllegalPlacement { hex });
    }

    state.commit_place(species, hex);
    Ok(())
}

fn validate_move(state: &mut Match, sender: Color, from: Hex, to: Hex) -> Result<(), ActionError> {
    if !from.in_bounds() || !to.in_bounds() {
        return Err(ActionError::OutOfBounds);
    }

    if state.hand(sender).queen_in_hand() {
        return Err(ActionError::QueenNotPlaced);
    }

    let Some(top) = state.board.get(from).map(|stack| *stack.last().unwrap()) else {
        return Err(ActionError::EmptySource { hex: from });
    };
    if top.color != sender {
        return Err(ActionError::NotYourPiece { hex: from });
    }

    if !rules::piece_moves(&state.board, from).contains(&to) {
        return Err(ActionError::IllegalDestination { from, to });
    }

    state.commit_move(from, to);
    Ok(())
}
