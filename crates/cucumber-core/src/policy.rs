use crate::game::state::GameState;

/// Picks one of several legal moves during a rollout.
///
/// `moves` holds hand indices as returned by [`GameState::possible_moves`].
/// Returning `None` means the policy has no opinion; returning an index that
/// is not in `moves` is treated as an error by the caller.
pub trait MovePolicy {
    fn choose_move(&mut self, state: &GameState, moves: &[usize]) -> Option<usize>;
}

impl<F> MovePolicy for F
where
    F: FnMut(&GameState, &[usize]) -> Option<usize>,
{
    fn choose_move(&mut self, state: &GameState, moves: &[usize]) -> Option<usize> {
        self(state, moves)
    }
}

/// Reborrows an optional policy for one call, leaving the option usable
/// afterwards.
pub fn reborrow<'p>(policy: &'p mut Option<&mut dyn MovePolicy>) -> Option<&'p mut dyn MovePolicy> {
    match policy {
        Some(inner) => Some(&mut **inner),
        None => None,
    }
}
