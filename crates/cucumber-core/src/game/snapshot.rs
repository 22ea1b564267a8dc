use super::state::{GameError, GameState, Trick};
use crate::model::card::{Card, DECK_SIZE};
use crate::model::deck::Deck;
use crate::model::player::Player;
use crate::model::rank::Rank;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("deck cursor {cursor} is past the {size} stored cards")]
    CursorOutOfRange { cursor: usize, size: usize },
    #[error("card {0} appears more than once")]
    DuplicateCard(u8),
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub hand: Vec<Card>,
    pub played: Vec<Card>,
    #[serde(default)]
    pub highest_discard: Option<Rank>,
}

/// Serializable copy of a [`GameState`], deck order included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub deck: Vec<Card>,
    pub cursor: usize,
    pub players: Vec<PlayerSnapshot>,
    pub active: usize,
    #[serde(default)]
    pub trick: Option<Trick>,
}

impl StateSnapshot {
    pub fn capture(state: &GameState) -> Self {
        StateSnapshot {
            deck: state.deck().cards().to_vec(),
            cursor: state.deck().cursor(),
            players: state
                .players()
                .iter()
                .map(|player| PlayerSnapshot {
                    hand: player.hand().cards().to_vec(),
                    played: player.played().to_vec(),
                    highest_discard: player.highest_discard(),
                })
                .collect(),
            active: state.active(),
            trick: state.trick(),
        }
    }

    pub fn restore(self) -> Result<GameState, SnapshotError> {
        if self.cursor > self.deck.len() {
            return Err(SnapshotError::CursorOutOfRange {
                cursor: self.cursor,
                size: self.deck.len(),
            });
        }
        ensure_unique(self.deck.iter())?;
        ensure_unique(
            self.players
                .iter()
                .flat_map(|player| player.hand.iter().chain(player.played.iter())),
        )?;

        let players = self
            .players
            .into_iter()
            .map(|player| Player::with_history(player.hand, player.played, player.highest_discard))
            .collect();
        let mut state = GameState::new(Deck::from_parts(self.deck, self.cursor), players, self.active)?;
        state.set_trick(self.trick)?;
        Ok(state)
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn ensure_unique<'a, I>(cards: I) -> Result<(), SnapshotError>
where
    I: Iterator<Item = &'a Card>,
{
    let mut seen = [false; DECK_SIZE];
    for card in cards {
        let slot = &mut seen[usize::from(card.id())];
        if *slot {
            return Err(SnapshotError::DuplicateCard(card.id()));
        }
        *slot = true;
    }
    Ok(())
}
