//! Monte Carlo valuation over determinized positions.

use super::endgame::valuate_static;
use super::error::ValuationError;
use super::sampler::{ConsistencyCheck, Determinization, random_game_state, remaining_deck};
use crate::game::state::GameState;
use crate::policy::{MovePolicy, reborrow};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloOptions {
    pub runs: usize,
    /// Perspective player; the active player when unset.
    pub anchor: Option<usize>,
    pub cross_player: bool,
    pub consistency: ConsistencyCheck,
}

impl MonteCarloOptions {
    pub fn new(runs: usize) -> Self {
        Self {
            runs,
            anchor: None,
            cross_player: false,
            consistency: ConsistencyCheck::default(),
        }
    }

    pub fn anchored(mut self, anchor: usize) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_cross_player(mut self, cross_player: bool) -> Self {
        self.cross_player = cross_player;
        self
    }

    pub fn with_consistency(mut self, consistency: ConsistencyCheck) -> Self {
        self.consistency = consistency;
        self
    }
}

#[derive(Debug, Clone)]
pub struct MonteCarloResult {
    /// Mean static value over accepted runs.
    pub value: f64,
    pub runs: usize,
    pub total: f64,
    /// Sum of squared run values, for spread estimates.
    pub total_squares: f64,
    /// Determinized position of the last accepted run, before its rollout.
    pub last_sample: GameState,
    /// Endgame reached by the last accepted run.
    pub last_terminal: GameState,
}

impl MonteCarloResult {
    pub fn std_error(&self) -> Option<f64> {
        standard_error(self.runs, self.total, self.total_squares)
    }
}

/// Standard error of a mean from its running sums; `None` below two runs.
pub fn standard_error(runs: usize, total: f64, total_squares: f64) -> Option<f64> {
    if runs < 2 {
        return None;
    }
    let n = runs as f64;
    let variance = ((total_squares - total * total / n) / (n - 1.0)).max(0.0);
    Some((variance / n).sqrt())
}

/// Estimates the value of `state` for the anchor player by redealing the
/// hidden hands `options.runs` times, playing each sample out and averaging
/// the static valuation of the endgames.
///
/// Samples that contradict a discard memory are skipped; `Ok(None)` means no
/// sample was accepted. Whenever a rollout reaches a real choice the policy
/// decides.
pub fn valuate_monte_carlo<R: Rng + ?Sized>(
    state: &GameState,
    rng: &mut R,
    options: &MonteCarloOptions,
    mut policy: Option<&mut dyn MovePolicy>,
) -> Result<Option<MonteCarloResult>, ValuationError> {
    let anchor = options.anchor.unwrap_or(state.active());
    let remaining = remaining_deck(state, anchor)?;

    let mut total = 0.0;
    let mut total_squares = 0.0;
    let mut runs = 0usize;
    let mut rejected = 0usize;
    let mut last = None;

    for iteration in 0..options.runs {
        let mut sample =
            match random_game_state(state, rng, &remaining, anchor, options.consistency)? {
                Determinization::Accepted(sample) => sample,
                Determinization::Rejected { player } => {
                    rejected += 1;
                    if tracing::enabled!(Level::TRACE) {
                        event!(
                            target: "cucumber_core::monte_carlo",
                            Level::TRACE,
                            iteration,
                            player,
                            "sample rejected"
                        );
                    }
                    continue;
                }
            };
        let before = sample.clone();
        rollout(&mut sample, reborrow(&mut policy))?;
        let value = valuate_static(&sample, anchor, options.cross_player)?;
        total += value;
        total_squares += value * value;
        runs += 1;
        last = Some((before, sample));
    }

    debug!(
        target: "cucumber_core::monte_carlo",
        requested = options.runs,
        runs,
        rejected,
        total,
        anchor,
        "monte carlo valuation finished"
    );

    Ok(last.map(|(last_sample, last_terminal)| MonteCarloResult {
        value: total / runs as f64,
        runs,
        total,
        total_squares,
        last_sample,
        last_terminal,
    }))
}

/// Plays `state` forward until nobody has a choice left. Forced moves are
/// played directly; real choices go to `policy`.
pub fn rollout(
    state: &mut GameState,
    mut policy: Option<&mut dyn MovePolicy>,
) -> Result<(), ValuationError> {
    loop {
        let moves = state.possible_moves();
        let choice = match moves.as_slice() {
            [] => return Ok(()),
            [only] => *only,
            _ => {
                let Some(chooser) = reborrow(&mut policy) else {
                    return Err(ValuationError::PolicyRequired {
                        moves: moves.clone(),
                    });
                };
                select_move(chooser, state, &moves)?
            }
        };
        state.play_card(choice)?;
    }
}

fn select_move(
    policy: &mut dyn MovePolicy,
    state: &GameState,
    moves: &[usize],
) -> Result<usize, ValuationError> {
    let chosen = policy
        .choose_move(state, moves)
        .ok_or(ValuationError::PolicyDeclined)?;
    if moves.contains(&chosen) {
        Ok(chosen)
    } else {
        Err(ValuationError::IllegalPolicyMove {
            chosen,
            legal: moves.to_vec(),
        })
    }
}
