use crate::model::card::CardError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
#[repr(u8)]
pub enum Rank {
    Two = 0,
    Three = 1,
    Four = 2,
    Five = 3,
    Six = 4,
    Seven = 5,
    Eight = 6,
    Nine = 7,
    Ten = 8,
    Jack = 9,
    Queen = 10,
    King = 11,
    Ace = 12,
}

impl Rank {
    pub const COUNT: usize = 13;

    pub const ORDERED: [Rank; Rank::COUNT] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    const SYMBOLS: [char; Rank::COUNT] = [
        '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
    ];

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ORDERED[index])
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn symbol(self) -> char {
        Self::SYMBOLS[self as usize]
    }

    pub fn from_symbol(symbol: char) -> Result<Self, CardError> {
        Self::SYMBOLS
            .iter()
            .position(|&candidate| candidate == symbol)
            .map(|index| Self::ORDERED[index])
            .ok_or_else(|| CardError::InvalidSymbol(symbol.to_string()))
    }

    /// Face value used by endgame scoring: `2` through `14` for the ace.
    pub const fn face_value(self) -> u8 {
        self as u8 + 2
    }

    /// The ace beats every other card and ends a trick once led.
    pub const fn is_top(self) -> bool {
        matches!(self, Rank::Ace)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Rank {
    type Err = CardError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Self::from_symbol(symbol),
            _ => Err(CardError::InvalidSymbol(text.to_string())),
        }
    }
}

impl From<Rank> for char {
    fn from(rank: Rank) -> Self {
        rank.symbol()
    }
}

impl TryFrom<char> for Rank {
    type Error = CardError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        Self::from_symbol(symbol)
    }
}

/// Parses a run of rank symbols such as `"QQQ7"`.
pub fn parse_ranks(text: &str) -> Result<Vec<Rank>, CardError> {
    text.chars().map(Rank::from_symbol).collect()
}

pub fn render_ranks<I>(ranks: I) -> String
where
    I: IntoIterator<Item = Rank>,
{
    ranks.into_iter().map(Rank::symbol).collect()
}
