//! Position analysis harness: deals a configured position, values it by
//! Monte Carlo sampling and writes JSONL report rows.

pub mod analysis;
pub mod config;
pub mod logging;
