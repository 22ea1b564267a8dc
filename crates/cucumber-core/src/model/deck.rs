use crate::model::card::{Card, DECK_SIZE};
use crate::rng::unit;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("deck of {size} cards is exhausted")]
    Exhausted { size: usize },
    #[error("card {0} appears more than once in the deck")]
    DuplicateCard(u8),
}

/// Ordered cards plus a cursor; `cards[..cursor]` have been drawn.
///
/// Drawing swaps a uniformly chosen undrawn card into the cursor slot, so the
/// deck doubles as a partial Fisher-Yates shuffle driven by the caller's RNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
    cursor: usize,
}

impl Deck {
    pub fn standard() -> Self {
        Self::first(DECK_SIZE)
    }

    /// Restricted deck holding identities `0..count` (clamped to the full deck).
    pub fn first(count: usize) -> Self {
        let cards = (0..count.min(DECK_SIZE))
            .filter_map(|id| u8::try_from(id).ok())
            .filter_map(|id| Card::from_id(id).ok())
            .collect();
        Self::from_parts(cards, 0)
    }

    /// Undrawn deck of the given cards in order. Identities must be unique.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self, DeckError> {
        let mut seen = [false; DECK_SIZE];
        for card in &cards {
            let slot = &mut seen[usize::from(card.id())];
            if *slot {
                return Err(DeckError::DuplicateCard(card.id()));
            }
            *slot = true;
        }
        Ok(Self::from_parts(cards, 0))
    }

    pub(crate) fn from_parts(cards: Vec<Card>, cursor: usize) -> Self {
        Self { cards, cursor }
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Card, DeckError> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Err(DeckError::Exhausted {
                size: self.cards.len(),
            });
        }
        let offset = (unit(rng) * remaining as f64) as usize;
        self.cards.swap(self.cursor, self.cursor + offset.min(remaining - 1));
        let card = self.cards[self.cursor];
        self.cursor += 1;
        Ok(card)
    }

    pub fn draw_n<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<Card>, DeckError> {
        (0..count).map(|_| self.draw(rng)).collect()
    }

    /// Fresh deck of every card not listed in `excluded`, sorted by rank then
    /// identity, with nothing drawn. The whole card list is considered, drawn
    /// prefix included.
    pub fn residual(&self, excluded: &[Card]) -> Deck {
        let mut taken = [false; DECK_SIZE];
        for card in excluded {
            taken[usize::from(card.id())] = true;
        }
        let mut cards: Vec<Card> = self
            .cards
            .iter()
            .copied()
            .filter(|card| !taken[usize::from(card.id())])
            .collect();
        cards.sort();
        Self::from_parts(cards, 0)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}
