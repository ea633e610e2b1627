//! Core data models for the rank tracker.

mod ids;
mod player;
pub mod rank;

pub use ids::*;
pub use player::*;
pub use rank::{Division, Tier};
