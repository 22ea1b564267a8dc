use super::log_choice;
use crate::phase::{GamePhase, policy_key};
use cucumber_core::game::state::GameState;
use cucumber_core::model::rank::Rank;
use cucumber_core::policy::MovePolicy;
use std::collections::HashMap;
use std::fmt;

type RankValues = HashMap<Rank, f64>;

/// Picks moves from in-memory value tables.
///
/// Tables are keyed by phase model name (`"330"`, `"5421"`) and then by
/// policy key (`"35-7"`); each entry maps a rank to the value of playing it.
/// The legal move whose rank has the highest value wins, later moves winning
/// ties. Positions without a usable entry go to the fallback policy.
#[derive(Default)]
pub struct LookupPolicy {
    tables: HashMap<String, HashMap<String, RankValues>>,
    fallback: Option<Box<dyn MovePolicy + Send>>,
}

impl LookupPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(mut self, fallback: Box<dyn MovePolicy + Send>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn insert<I>(&mut self, phase: &GamePhase, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = (Rank, f64)>,
    {
        self.tables
            .entry(phase.model_name())
            .or_default()
            .entry(key.into())
            .or_default()
            .extend(values);
    }

    /// Number of (phase, key) entries held.
    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, state: &GameState, moves: &[usize]) -> Option<usize> {
        let phase = GamePhase::of(state).ok()?;
        let values = self.tables.get(&phase.model_name())?.get(&policy_key(state))?;
        let hand = state.active_player().hand().cards();
        let mut best: Option<(usize, f64)> = None;
        for &index in moves {
            let Some(value) = hand.get(index).and_then(|card| values.get(&card.rank())) else {
                continue;
            };
            if best.is_none_or(|(_, top)| *value >= top) {
                best = Some((index, *value));
            }
        }
        best.map(|(index, _)| index)
    }
}

impl MovePolicy for LookupPolicy {
    fn choose_move(&mut self, state: &GameState, moves: &[usize]) -> Option<usize> {
        if let Some(chosen) = self.lookup(state, moves) {
            log_choice("lookup", state, moves, Some(chosen));
            return Some(chosen);
        }
        let fallback = self.fallback.as_mut()?;
        fallback.choose_move(state, moves)
    }
}

impl fmt::Debug for LookupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupPolicy")
            .field("phases", &self.tables.len())
            .field("entries", &self.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::LookupPolicy;
    use crate::phase::{GamePhase, policy_key};
    use crate::policy::HighestMove;
    use cucumber_core::game::state::GameState;
    use cucumber_core::model::deck::Deck;
    use cucumber_core::model::rank::Rank;
    use cucumber_core::policy::MovePolicy;

    fn opening() -> GameState {
        let state = GameState::deal("102", 3, 3, 0, Deck::standard()).unwrap();
        assert_eq!(state.to_string(), "*67K,66T,5QA");
        state
    }

    #[test]
    fn highest_recorded_value_wins() {
        let state = opening();
        let phase = GamePhase::of(&state).unwrap();
        let mut policy = LookupPolicy::new();
        policy.insert(&phase, policy_key(&state), [(Rank::Seven, 1.5), (Rank::King, -3.0)]);
        assert_eq!(policy.len(), 1);
        assert_eq!(policy.choose_move(&state, &[1, 2]), Some(1));
    }

    #[test]
    fn ties_go_to_the_later_move() {
        let state = opening();
        let phase = GamePhase::of(&state).unwrap();
        let mut policy = LookupPolicy::new();
        policy.insert(&phase, "67K-", [(Rank::Seven, 2.0), (Rank::King, 2.0)]);
        assert_eq!(policy.choose_move(&state, &[1, 2]), Some(2));
    }

    #[test]
    fn missing_entries_use_the_fallback() {
        let state = opening();
        let mut empty = LookupPolicy::new();
        assert!(empty.is_empty());
        assert_eq!(empty.choose_move(&state, &[1, 2]), None);

        let mut fallback = LookupPolicy::new().with_fallback(Box::new(HighestMove));
        assert_eq!(fallback.choose_move(&state, &[1, 2]), Some(2));
    }

    #[test]
    fn ranks_without_values_are_skipped() {
        let state = opening();
        let phase = GamePhase::of(&state).unwrap();
        let mut policy = LookupPolicy::new();
        policy.insert(&phase, policy_key(&state), [(Rank::Seven, -8.0)]);
        assert_eq!(policy.choose_move(&state, &[1, 2]), Some(1));
    }
}
