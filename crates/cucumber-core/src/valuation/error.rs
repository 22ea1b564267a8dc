use crate::game::state::GameError;
use crate::model::deck::DeckError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValuationError {
    #[error("static valuation needs one card per player, but player {player} holds {hand_size}")]
    NotEndgame { player: usize, hand_size: usize },
    #[error("player {player} is outside a table of {players}")]
    PlayerOutOfRange { player: usize, players: usize },
    #[error("rollout reached a choice between moves {moves:?} without a move policy")]
    PolicyRequired { moves: Vec<usize> },
    #[error("move policy returned no move")]
    PolicyDeclined,
    #[error("move policy chose {chosen}, which is not among the legal moves {legal:?}")]
    IllegalPolicyMove { chosen: usize, legal: Vec<usize> },
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Game(#[from] GameError),
}
