use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rank::Rank;

/// A seat at the table: current hand, cards played so far (in order) and the
/// highest rank this player had to discard instead of taking a trick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    hand: Hand,
    played: Vec<Card>,
    highest_discard: Option<Rank>,
}

impl Player {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            hand: Hand::with_cards(cards),
            played: Vec::new(),
            highest_discard: None,
        }
    }

    pub fn with_history(cards: Vec<Card>, played: Vec<Card>, highest_discard: Option<Rank>) -> Self {
        Self {
            hand: Hand::with_cards(cards),
            played,
            highest_discard,
        }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn played(&self) -> &[Card] {
        &self.played
    }

    pub fn played_ranks(&self) -> impl Iterator<Item = Rank> + '_ {
        self.played.iter().map(|card| card.rank())
    }

    pub fn highest_discard(&self) -> Option<Rank> {
        self.highest_discard
    }

    /// Same history, different cards in hand.
    pub(crate) fn redealt(&self, cards: Vec<Card>) -> Self {
        Self {
            hand: Hand::with_cards(cards),
            played: self.played.clone(),
            highest_discard: self.highest_discard,
        }
    }

    pub(crate) fn play(&mut self, index: usize) -> Option<Card> {
        let card = self.hand.take(index)?;
        self.played.push(card);
        Some(card)
    }

    pub(crate) fn note_discard(&mut self, rank: Rank) {
        self.highest_discard = self.highest_discard.max(Some(rank));
    }
}
