use super::error::ValuationError;
use crate::game::state::GameState;
use crate::model::rank::Rank;

/// Magnitude of the outcome when an ace is left in someone's last card.
pub const ACE_OUTCOME: f64 = 50.0;

/// Values an endgame position (every player holds exactly one card) for
/// `player`.
///
/// Whoever ends with the highest rank is charged its face value. Holding an
/// ace yourself is worth `-50`. Without cross-player scoring the result is
/// the player's own charge (higher is worse). With it, the result is the
/// average opponent charge minus the player's own (higher is better), and an
/// ace in any opponent's hand is worth `+50`.
pub fn valuate_static(
    state: &GameState,
    player: usize,
    cross_player: bool,
) -> Result<f64, ValuationError> {
    let ranks = last_cards(state)?;
    let own = *ranks.get(player).ok_or(ValuationError::PlayerOutOfRange {
        player,
        players: ranks.len(),
    })?;
    if own.is_top() {
        return Ok(-ACE_OUTCOME);
    }
    let opponents = || {
        ranks
            .iter()
            .enumerate()
            .filter(move |(index, _)| *index != player)
            .map(|(_, rank)| *rank)
    };
    if cross_player && opponents().any(Rank::is_top) {
        return Ok(ACE_OUTCOME);
    }

    let highest = ranks.iter().copied().max().unwrap_or(own);
    let charge = |rank: Rank| {
        if rank == highest {
            f64::from(rank.face_value())
        } else {
            0.0
        }
    };
    let own_charge = charge(own);
    if !cross_player {
        return Ok(own_charge);
    }

    let opponent_count = ranks.len() - 1;
    let average = if opponent_count == 0 {
        0.0
    } else {
        opponents().map(charge).sum::<f64>() / opponent_count as f64
    };
    Ok(-(own_charge - average))
}

fn last_cards(state: &GameState) -> Result<Vec<Rank>, ValuationError> {
    state
        .players()
        .iter()
        .enumerate()
        .map(|(index, seat)| match seat.hand().cards() {
            [card] => Ok(card.rank()),
            cards => Err(ValuationError::NotEndgame {
                player: index,
                hand_size: cards.len(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::valuate_static;
    use crate::game::state::GameState;
    use crate::model::card::Card;
    use crate::model::deck::Deck;
    use crate::model::player::Player;
    use crate::model::rank::{Rank, parse_ranks};
    use crate::model::suit::Suit;
    use crate::rng::SeededRng;
    use crate::valuation::error::ValuationError;

    fn endgame(symbols: &str) -> GameState {
        let mut copies = [0usize; Rank::COUNT];
        let players = parse_ranks(symbols)
            .unwrap()
            .into_iter()
            .map(|rank| {
                let suit = Suit::ALL[copies[rank.index()]];
                copies[rank.index()] += 1;
                Player::new(vec![Card::new(rank, suit)])
            })
            .collect();
        GameState::new(Deck::standard(), players, 0).unwrap()
    }

    fn values(state: &GameState, cross_player: bool) -> Vec<f64> {
        (0..state.player_count())
            .map(|player| valuate_static(state, player, cross_player).unwrap())
            .collect()
    }

    #[test]
    fn cross_player_scores_reference_endgames() {
        let cases: [(&str, &[f64]); 10] = [
            ("A9", &[-50.0, 50.0]),
            ("AK", &[-50.0, 50.0]),
            ("KQ", &[-13.0, 13.0]),
            ("QJ", &[-12.0, 12.0]),
            ("JT", &[-11.0, 11.0]),
            ("T9", &[-10.0, 10.0]),
            ("998", &[-4.5, -4.5, 9.0]),
            ("QQQ7", &[-4.0, -4.0, -4.0, 12.0]),
            ("7QQQ", &[12.0, -4.0, -4.0, -4.0]),
            ("AA", &[-50.0, -50.0]),
        ];
        for (hands, expected) in cases {
            assert_eq!(values(&endgame(hands), true), expected, "hands {hands}");
        }
    }

    #[test]
    fn own_charge_without_cross_scoring() {
        assert_eq!(values(&endgame("7QQQ"), false), vec![0.0, 12.0, 12.0, 12.0]);
        assert_eq!(values(&endgame("A9"), false), vec![-50.0, 0.0]);
    }

    #[test]
    fn lone_player_averages_over_nobody() {
        assert_eq!(values(&endgame("K"), true), vec![-13.0]);
    }

    #[test]
    fn seeded_five_card_endgame() {
        let mut deck = Deck::standard();
        let mut rng = SeededRng::from_seed_str("123");
        let cards = deck.draw_n(&mut rng, 5).unwrap();
        let players = cards.into_iter().map(|card| Player::new(vec![card])).collect();
        let state = GameState::new(deck, players, 0).unwrap();
        assert_eq!(state.to_string(), "*2,3,8,8,K");
        assert_eq!(values(&state, true), vec![3.25, 3.25, 3.25, 3.25, -13.0]);
    }

    #[test]
    fn positions_before_the_endgame_are_rejected() {
        let state = GameState::deal("123", 3, 3, 0, Deck::standard()).unwrap();
        assert_eq!(
            valuate_static(&state, 0, true),
            Err(ValuationError::NotEndgame {
                player: 0,
                hand_size: 3
            })
        );
        assert!(matches!(
            valuate_static(&endgame("23"), 4, false),
            Err(ValuationError::PlayerOutOfRange { player: 4, players: 2 })
        ));
    }
}
