//! Decision phases: who decides, with how many cards, at which trick
//! position, and how far back the current trick winner sits.

use cucumber_core::game::state::GameState;
use cucumber_core::model::rank::Rank;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseError {
    /// The trick winner sits further back than the players who already played.
    WinnerOutOfTrick { position: usize, offset: usize },
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseError::WinnerOutOfTrick { position, offset } => write!(
                f,
                "trick winner is {offset} seats back but only {position} players have played"
            ),
        }
    }
}

impl std::error::Error for PhaseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GamePhase {
    pub players: usize,
    pub cards: usize,
    /// Players already in the open trick.
    pub position: usize,
    /// Trick position of the card currently winning, when it matters.
    pub highest_played: Option<usize>,
}

impl GamePhase {
    pub const fn new(
        players: usize,
        cards: usize,
        position: usize,
        highest_played: Option<usize>,
    ) -> Self {
        Self {
            players,
            cards,
            position,
            highest_played,
        }
    }

    pub fn of(state: &GameState) -> Result<Self, PhaseError> {
        let players = state.player_count();
        let cards = state.active_player().hand().len();
        let position = state.calc_position_index();
        let highest_played = match state.trick() {
            Some(trick) if tracks_highest_played(players, cards, position) => {
                let offset = (state.active() + players - trick.winner) % players;
                let played = position
                    .checked_sub(offset)
                    .ok_or(PhaseError::WinnerOutOfTrick { position, offset })?;
                Some(played)
            }
            _ => None,
        };
        Ok(Self::new(players, cards, position, highest_played))
    }

    /// Digits of players, cards, position and highest-played offset, e.g.
    /// `"330"` or `"5421"`.
    pub fn model_name(&self) -> String {
        match self.highest_played {
            Some(offset) => format!("{}{}{}{offset}", self.players, self.cards, self.position),
            None => format!("{}{}{}", self.players, self.cards, self.position),
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model_name())
    }
}

fn tracks_highest_played(players: usize, cards: usize, position: usize) -> bool {
    players > 2 && position > 1 && !(cards == 3 && position == players - 1)
}

/// Offsets a phase with these parameters can carry; `[None]` when the
/// winner's position is not tracked.
pub fn highest_played_offsets(players: usize, cards: usize, position: usize) -> Vec<Option<usize>> {
    if tracks_highest_played(players, cards, position) {
        (0..position).map(Some).collect()
    } else {
        vec![None]
    }
}

/// Active hand symbols, `-`, then the open trick rank (empty when none):
/// `"35-7"`, `"68-"`.
pub fn policy_key(state: &GameState) -> String {
    let trick = state
        .trick()
        .map(|trick| Rank::symbol(trick.rank).to_string())
        .unwrap_or_default();
    format!("{}-{trick}", state.active_player().hand())
}
