use super::error::ValuationError;
use super::monte_carlo::{MonteCarloOptions, standard_error, valuate_monte_carlo};
use crate::game::state::GameState;
use crate::model::rank::Rank;
use crate::policy::{MovePolicy, reborrow};
use crate::rng::SeededRng;
use serde::Serialize;
use tracing::{Level, event};

/// Aggregated outcome of one candidate move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveValue {
    /// Index into the deciding player's hand.
    pub index: usize,
    pub rank: Rank,
    pub runs: usize,
    pub total: f64,
    pub total_squares: f64,
}

impl MoveValue {
    fn new(index: usize, rank: Rank) -> Self {
        Self {
            index,
            rank,
            runs: 0,
            total: 0.0,
            total_squares: 0.0,
        }
    }

    pub fn value(&self) -> Option<f64> {
        (self.runs > 0).then(|| self.total / self.runs as f64)
    }

    pub fn std_error(&self) -> Option<f64> {
        standard_error(self.runs, self.total, self.total_squares)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveEvaluation {
    pub player: usize,
    pub moves: Vec<MoveValue>,
}

impl MoveEvaluation {
    /// First move with the strictly highest mean value.
    pub fn best(&self) -> Option<&MoveValue> {
        let mut best: Option<(&MoveValue, f64)> = None;
        for candidate in &self.moves {
            let Some(value) = candidate.value() else {
                continue;
            };
            if best.is_none_or(|(_, top)| value > top) {
                best = Some((candidate, value));
            }
        }
        best.map(|(candidate, _)| candidate)
    }
}

/// Compares the legal moves of the active player.
///
/// For every run index `j` and every legal move, the move is played on a copy
/// of `state` and the result valued by one Monte Carlo run with cross-player
/// scoring from the deciding player's seat. Run `j` draws from a stream
/// seeded `"{seed}{j}"`, so all moves of one run see the same substream.
pub fn evaluate_moves(
    state: &GameState,
    seed: &str,
    runs: usize,
    mut policy: Option<&mut dyn MovePolicy>,
) -> Result<MoveEvaluation, ValuationError> {
    let player = state.active();
    let hand = state.active_player().hand().cards();
    let legal = state.possible_moves();
    let mut moves: Vec<MoveValue> = legal
        .iter()
        .filter_map(|&index| hand.get(index).map(|card| MoveValue::new(index, card.rank())))
        .collect();
    let options = MonteCarloOptions::new(1)
        .anchored(player)
        .with_cross_player(true);

    for run in 0..runs {
        for candidate in &mut moves {
            let mut rng = SeededRng::from_seed_str(&format!("{seed}{run}"));
            let mut branch = state.clone();
            branch.play_card(candidate.index)?;
            let Some(outcome) =
                valuate_monte_carlo(&branch, &mut rng, &options, reborrow(&mut policy))?
            else {
                continue;
            };
            candidate.runs += 1;
            candidate.total += outcome.value;
            candidate.total_squares += outcome.value * outcome.value;
        }
    }

    if tracing::enabled!(Level::DEBUG) {
        let summary: Vec<(usize, Option<f64>)> = moves
            .iter()
            .map(|candidate| (candidate.index, candidate.value()))
            .collect();
        event!(
            target: "cucumber_core::evaluate",
            Level::DEBUG,
            player,
            runs,
            position = %state,
            values = ?summary,
            "evaluated moves"
        );
    }

    Ok(MoveEvaluation { player, moves })
}

#[cfg(test)]
mod tests {
    use super::evaluate_moves;
    use crate::game::state::GameState;
    use crate::model::deck::Deck;
    use crate::model::rank::Rank;
    use crate::valuation::error::ValuationError;

    fn lowest(_: &GameState, moves: &[usize]) -> Option<usize> {
        moves.first().copied()
    }

    #[test]
    fn compares_every_legal_move() {
        let state = GameState::deal("102", 3, 3, 0, Deck::standard()).unwrap();
        assert_eq!(state.to_string(), "*67K,66T,5QA");
        let mut policy = lowest;
        let evaluation = evaluate_moves(&state, "102", 50, Some(&mut policy)).unwrap();

        let summary: Vec<(usize, Rank, usize, f64)> = evaluation
            .moves
            .iter()
            .map(|candidate| (candidate.index, candidate.rank, candidate.runs, candidate.total))
            .collect();
        assert_eq!(
            summary,
            vec![(1, Rank::Seven, 50, 296.0), (2, Rank::King, 50, 306.0)]
        );
        assert_eq!(evaluation.moves[0].value(), Some(5.92));
        assert_eq!(evaluation.best().map(|best| best.index), Some(2));
    }

    #[test]
    fn ambiguous_rollouts_need_a_policy() {
        let state = GameState::deal("102", 3, 3, 0, Deck::standard()).unwrap();
        assert!(matches!(
            evaluate_moves(&state, "102", 1, None),
            Err(ValuationError::PolicyRequired { .. })
        ));
    }

    #[test]
    fn positions_without_choices_evaluate_nothing() {
        let state = GameState::deal("9", 2, 1, 0, Deck::standard()).unwrap();
        let evaluation = evaluate_moves(&state, "9", 10, None).unwrap();
        assert!(evaluation.moves.is_empty());
        assert!(evaluation.best().is_none());
    }
}
