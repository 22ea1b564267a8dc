//! Determinization: redealing the hidden hands of a position.

use super::error::ValuationError;
use crate::game::state::GameState;
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::rank::Rank;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a redealt hand is checked against the owner's discard memory.
///
/// A player who discarded rank `d` could not beat the trick at the time, so
/// a sample that hands them a lowest card "below" `d` is implausible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyCheck {
    /// Compares the lowest card's raw identity with the discarded rank's
    /// index, which is looser than [`ConsistencyCheck::Rank`].
    #[default]
    Identity,
    /// Compares ranks.
    Rank,
}

impl ConsistencyCheck {
    fn contradicts(self, lowest: Card, discarded: Rank) -> bool {
        match self {
            ConsistencyCheck::Identity => usize::from(lowest.id()) < discarded.index(),
            ConsistencyCheck::Rank => lowest.rank() < discarded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Determinization {
    Accepted(GameState),
    /// The redealt hand of `player` contradicts their discard memory.
    Rejected { player: usize },
}

impl Determinization {
    pub fn accepted(self) -> Option<GameState> {
        match self {
            Determinization::Accepted(state) => Some(state),
            Determinization::Rejected { .. } => None,
        }
    }
}

/// Cards `anchor` cannot see: the deck minus every card already played and
/// minus the anchor's own hand, sorted and undrawn.
pub fn remaining_deck(state: &GameState, anchor: usize) -> Result<Deck, ValuationError> {
    let players = state.players();
    let seat = players.get(anchor).ok_or(ValuationError::PlayerOutOfRange {
        player: anchor,
        players: players.len(),
    })?;
    let mut known: Vec<Card> = players
        .iter()
        .flat_map(|player| player.played().iter().copied())
        .collect();
    known.extend(seat.hand().iter().copied());
    Ok(state.deck().residual(&known))
}

/// Deals every non-anchor player a fresh hand of the same size from a copy
/// of `remaining`, keeping histories, the active player and the trick.
pub fn random_game_state<R: Rng + ?Sized>(
    original: &GameState,
    rng: &mut R,
    remaining: &Deck,
    anchor: usize,
    check: ConsistencyCheck,
) -> Result<Determinization, ValuationError> {
    let players = original.players();
    if anchor >= players.len() {
        return Err(ValuationError::PlayerOutOfRange {
            player: anchor,
            players: players.len(),
        });
    }

    let mut deck = remaining.clone();
    let mut redealt = Vec::with_capacity(players.len());
    for (index, player) in players.iter().enumerate() {
        if index == anchor {
            redealt.push(player.clone());
            continue;
        }
        let cards = deck.draw_n(rng, player.hand().len())?;
        let sample = player.redealt(cards);
        if let (Some(lowest), Some(discarded)) = (sample.hand().lowest(), sample.highest_discard()) {
            if check.contradicts(lowest, discarded) {
                return Ok(Determinization::Rejected { player: index });
            }
        }
        redealt.push(sample);
    }

    Ok(Determinization::Accepted(GameState::from_parts(
        deck,
        redealt,
        original.active(),
        original.trick(),
    )))
}
