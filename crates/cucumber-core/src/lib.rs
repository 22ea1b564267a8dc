#![deny(warnings)]
pub mod game;
pub mod model;
pub mod policy;
pub mod rng;
pub mod valuation;
