mod lookup;
mod simple;

pub use lookup::LookupPolicy;
pub use simple::{HighestMove, LowestMove, RandomMove};

use core::fmt;
use cucumber_core::game::state::GameState;
use cucumber_core::policy::MovePolicy;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

/// Policies that can be named in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Lowest,
    Highest,
    Random,
}

impl PolicyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Lowest => "lowest",
            PolicyKind::Highest => "highest",
            PolicyKind::Random => "random",
        }
    }

    /// `seed` only matters for [`PolicyKind::Random`].
    pub fn build(self, seed: &str) -> Box<dyn MovePolicy + Send> {
        match self {
            PolicyKind::Lowest => Box::new(LowestMove),
            PolicyKind::Highest => Box::new(HighestMove),
            PolicyKind::Random => Box::new(RandomMove::from_seed_str(seed)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_choice(policy: &'static str, state: &GameState, moves: &[usize], chosen: Option<usize>) {
    if !tracing::enabled!(Level::TRACE) {
        return;
    }

    event!(
        target: "cucumber_bot::policy",
        Level::TRACE,
        policy,
        active = state.active(),
        position = %state,
        legal = ?moves,
        chosen = ?chosen
    );
}
