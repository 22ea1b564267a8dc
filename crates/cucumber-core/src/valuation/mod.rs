//! Position valuation: exact endgame scoring, determinization of hidden
//! hands, Monte Carlo estimates and per-move comparison.

pub mod endgame;
pub mod error;
pub mod monte_carlo;
pub mod moves;
pub mod sampler;

pub use endgame::valuate_static;
pub use error::ValuationError;
pub use monte_carlo::{
    MonteCarloOptions, MonteCarloResult, rollout, standard_error, valuate_monte_carlo,
};
pub use moves::{MoveEvaluation, MoveValue, evaluate_moves};
pub use sampler::{ConsistencyCheck, Determinization, random_game_state, remaining_deck};
