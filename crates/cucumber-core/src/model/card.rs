use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of distinct card identities in a full deck.
pub const DECK_SIZE: usize = 52;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("invalid card: {0}")]
    InvalidSymbol(String),
    #[error("card identity {0} is outside the 52-card deck")]
    OutOfRange(u8),
}

/// A physical card, identified by `suit * 13 + rank`.
///
/// Cards order by rank first and identity second, which is the order hands
/// are kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self(suit.offset() + rank as u8)
    }

    pub fn from_id(id: u8) -> Result<Self, CardError> {
        if usize::from(id) < DECK_SIZE {
            Ok(Self(id))
        } else {
            Err(CardError::OutOfRange(id))
        }
    }

    pub const fn id(self) -> u8 {
        self.0
    }

    pub const fn rank(self) -> Rank {
        Rank::ORDERED[(self.0 % 13) as usize]
    }

    pub const fn suit(self) -> Suit {
        match Suit::of_identity(self.0) {
            Some(suit) => suit,
            None => Suit::Hearts,
        }
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then(self.0.cmp(&other.0))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<u8> for Card {
    type Error = CardError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id)
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.0
    }
}

/// Cards render as their rank symbol; suits never show.
impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank())
    }
}
