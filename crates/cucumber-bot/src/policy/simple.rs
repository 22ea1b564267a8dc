use super::log_choice;
use cucumber_core::game::state::GameState;
use cucumber_core::policy::MovePolicy;
use cucumber_core::rng::{SeededRng, unit};
use rand::RngCore;

/// Always plays the first legal move (the cheapest card on offer).
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestMove;

impl MovePolicy for LowestMove {
    fn choose_move(&mut self, state: &GameState, moves: &[usize]) -> Option<usize> {
        let chosen = moves.first().copied();
        log_choice("lowest", state, moves, chosen);
        chosen
    }
}

/// Always plays the last legal move (the highest rank on offer).
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestMove;

impl MovePolicy for HighestMove {
    fn choose_move(&mut self, state: &GameState, moves: &[usize]) -> Option<usize> {
        let chosen = moves.last().copied();
        log_choice("highest", state, moves, chosen);
        chosen
    }
}

/// Uniform choice among the legal moves, `moves[floor(unit * len)]`.
#[derive(Debug, Clone)]
pub struct RandomMove<R = SeededRng> {
    rng: R,
}

impl RandomMove<SeededRng> {
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(SeededRng::from_seed_str(seed))
    }
}

impl<R: RngCore> RandomMove<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> MovePolicy for RandomMove<R> {
    fn choose_move(&mut self, state: &GameState, moves: &[usize]) -> Option<usize> {
        let chosen = if moves.is_empty() {
            None
        } else {
            let pick = (unit(&mut self.rng) * moves.len() as f64) as usize;
            moves.get(pick).copied()
        };
        log_choice("random", state, moves, chosen);
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::{HighestMove, LowestMove, RandomMove};
    use cucumber_core::game::state::GameState;
    use cucumber_core::model::deck::Deck;
    use cucumber_core::policy::MovePolicy;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn opening() -> GameState {
        GameState::deal("123", 3, 3, 0, Deck::standard()).unwrap()
    }

    #[test]
    fn lowest_and_highest_take_the_ends() {
        let state = opening();
        assert_eq!(LowestMove.choose_move(&state, &[0, 2, 5]), Some(0));
        assert_eq!(HighestMove.choose_move(&state, &[0, 2, 5]), Some(5));
        assert_eq!(LowestMove.choose_move(&state, &[]), None);
    }

    #[test]
    fn seeded_random_choices_are_reproducible() {
        let state = opening();
        let mut policy = RandomMove::from_seed_str("7");
        let picks: Vec<_> = (0..5)
            .map(|_| policy.choose_move(&state, &[10, 11, 12]))
            .collect();
        assert_eq!(
            picks,
            vec![Some(11), Some(10), Some(10), Some(12), Some(12)]
        );
    }

    #[test]
    fn random_choice_accepts_any_generator() {
        let state = opening();
        let mut policy = RandomMove::new(StdRng::seed_from_u64(3));
        for _ in 0..50 {
            let chosen = policy.choose_move(&state, &[1, 2]).unwrap();
            assert!(chosen == 1 || chosen == 2);
        }
        assert_eq!(policy.choose_move(&state, &[]), None);
    }
}
