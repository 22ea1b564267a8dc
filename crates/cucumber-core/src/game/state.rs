//! Table state, move legality and the play transition.

use crate::model::card::Card;
use crate::model::deck::{Deck, DeckError};
use crate::model::player::Player;
use crate::model::rank::Rank;
use crate::rng::SeededRng;
use core::fmt;
use core::iter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The open trick: the rank to beat and who played it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    pub rank: Rank,
    pub winner: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("player {index} is outside a table of {players}")]
    PlayerOutOfRange { index: usize, players: usize },
    #[error("move {index} is outside player {player}'s hand of {hand_size} cards")]
    MoveOutOfRange {
        player: usize,
        index: usize,
        hand_size: usize,
    },
    #[error(transparent)]
    Deck(#[from] DeckError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    deck: Deck,
    players: Vec<Player>,
    active: usize,
    trick: Option<Trick>,
}

impl GameState {
    pub fn new(deck: Deck, players: Vec<Player>, active: usize) -> Result<Self, GameError> {
        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        check_seat(active, players.len())?;
        Ok(Self {
            deck,
            players,
            active,
            trick: None,
        })
    }

    /// Deals `cards_each` cards to every player in seat order from `deck`,
    /// drawing with one stream seeded by `seed`.
    pub fn deal(
        seed: &str,
        players: usize,
        cards_each: usize,
        first_player: usize,
        mut deck: Deck,
    ) -> Result<Self, GameError> {
        let mut rng = SeededRng::from_seed_str(seed);
        let mut table = Vec::with_capacity(players);
        for _ in 0..players {
            table.push(Player::new(deck.draw_n(&mut rng, cards_each)?));
        }
        let state = Self::new(deck, table, first_player)?;
        debug!(
            target: "cucumber_core::game",
            seed,
            players,
            cards_each,
            first_player,
            position = %state,
            "dealt position"
        );
        Ok(state)
    }

    /// Assembles a state whose seat indices are already known to be valid.
    pub(crate) fn from_parts(
        deck: Deck,
        players: Vec<Player>,
        active: usize,
        trick: Option<Trick>,
    ) -> Self {
        Self {
            deck,
            players,
            active,
            trick,
        }
    }

    pub fn set_trick(&mut self, trick: Option<Trick>) -> Result<(), GameError> {
        if let Some(open) = trick {
            check_seat(open.winner, self.players.len())?;
        }
        self.trick = trick;
        Ok(())
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_player(&self) -> &Player {
        &self.players[self.active]
    }

    pub fn trick(&self) -> Option<Trick> {
        self.trick
    }

    /// Every player holds exactly one card; nothing is left to decide.
    pub fn is_endgame(&self) -> bool {
        self.players.iter().all(|player| player.hand().len() == 1)
    }

    /// Hand indices the active player may sensibly play.
    ///
    /// Empty when the player holds at most one card. Index 0 (the lowest
    /// card) is the discard; the other candidates are the last index of each
    /// distinct rank able to take the trick, ascending by rank.
    pub fn possible_moves(&self) -> Vec<usize> {
        let cards = self.active_player().hand().cards();
        let (Some(lowest), Some(highest)) = (cards.first(), cards.last()) else {
            return Vec::new();
        };
        if cards.len() == 1 {
            return Vec::new();
        }

        let floor = self.trick.map(|trick| trick.rank);
        if let Some(rank) = floor {
            if rank.is_top() || rank > highest.rank() {
                return vec![0];
            }
        }

        let mut last_index = [None; Rank::COUNT];
        for (index, card) in cards.iter().enumerate().skip(1) {
            if floor.is_none_or(|rank| card.rank() >= rank) {
                last_index[card.rank().index()] = Some(index);
            }
        }
        let candidates: Vec<usize> = last_index.into_iter().flatten().collect();

        match cards.len() {
            2 => return candidates,
            3 => {
                // Closing play of a three-card hand: the next player is
                // already short, so only the cheapest winner matters.
                let next = (self.active + 1) % self.players.len();
                if self.players[next].hand().len() < cards.len() {
                    return candidates.into_iter().take(1).collect();
                }
                if self.players.len() == 2 && floor.is_none() {
                    return candidates.last().copied().into_iter().collect();
                }
            }
            _ => {}
        }

        match floor {
            Some(rank) if lowest.rank() < rank => iter::once(0).chain(candidates).collect(),
            _ => candidates,
        }
    }

    /// Plays the card at `index` of the active hand and returns its rank.
    ///
    /// Equal rank takes the trick over; nothing beats an ace. A card that
    /// cannot win is recorded in the player's discard memory. When the next
    /// player has already played to this trick, the trick closes and its
    /// winner leads next.
    pub fn play_card(&mut self, index: usize) -> Result<Rank, GameError> {
        let seat = self.active;
        let player = &mut self.players[seat];
        let card: Card = player
            .play(index)
            .ok_or_else(|| GameError::MoveOutOfRange {
                player: seat,
                index,
                hand_size: player.hand().len(),
            })?;
        let rank = card.rank();

        let takes_trick = match self.trick {
            None => true,
            Some(open) => !open.rank.is_top() && rank >= open.rank,
        };
        if takes_trick {
            self.trick = Some(Trick { rank, winner: seat });
        } else {
            player.note_discard(rank);
        }

        let remaining = player.hand().len();
        let next = (seat + 1) % self.players.len();
        if self.players[next].hand().len() > remaining {
            self.active = next;
        } else if let Some(closed) = self.trick.take() {
            self.active = closed.winner;
        }
        Ok(rank)
    }

    /// Number of players who already played to the open trick (0 when no
    /// trick is open).
    pub fn calc_position_index(&self) -> usize {
        if self.trick.is_none() {
            return 0;
        }
        let size = self.active_player().hand().len();
        self.players
            .iter()
            .filter(|player| player.hand().len() < size)
            .count()
    }

    /// Per-player listing; the same text `{:#}` produces.
    pub fn verbose(&self) -> String {
        format!("{self:#}")
    }

    fn write_verbose(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .players
            .iter()
            .map(|player| player.played().len())
            .max()
            .unwrap_or(0);
        for (index, player) in self.players.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            let mark = if index == self.active { '*' } else { ' ' };
            let played: String = player.played_ranks().map(Rank::symbol).collect();
            let discard = player.highest_discard().map_or(' ', Rank::symbol);
            let line = format!(
                "P{}{mark} {} : {played:<width$} {discard}",
                index + 1,
                player.hand()
            );
            f.write_str(line.trim_end())?;
        }
        Ok(())
    }
}

fn check_seat(index: usize, players: usize) -> Result<(), GameError> {
    if index < players {
        Ok(())
    } else {
        Err(GameError::PlayerOutOfRange { index, players })
    }
}

/// Compact form `*238,8JK,66A`; the alternate flag selects the verbose
/// per-player listing.
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return self.write_verbose(f);
        }
        for (index, player) in self.players.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            if index == self.active {
                f.write_str("*")?;
            }
            write!(f, "{}", player.hand())?;
        }
        Ok(())
    }
}
