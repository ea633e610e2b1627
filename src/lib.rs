//! # Rank Tracker
//!
//! Follows a roster of League of Legends accounts, refreshes their ranked
//! solo/duo standing on a fixed cadence and serves the resulting ladder.
//!
//! ## Architecture
//!
//! - **models**: Players, Riot IDs and the tier/division score normalizer
//! - **riot**: Riot Games HTTP client behind the `RiotApi` trait
//! - **sync**: Per-player reconciliation and the seed + refresh scheduler
//! - **storage**: JSONL-backed player store
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod config;
pub mod models;
pub mod retry;
pub mod riot;
pub mod storage;
pub mod sync;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
