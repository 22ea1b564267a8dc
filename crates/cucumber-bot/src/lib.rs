pub mod phase;
pub mod policy;

pub use phase::{GamePhase, PhaseError, highest_played_offsets, policy_key};
pub use policy::{HighestMove, LookupPolicy, LowestMove, PolicyKind, RandomMove};
