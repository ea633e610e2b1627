//! Riot Games API access.
//!
//! Four lookups feed one player's row:
//! - account-v1: Riot ID → PUUID and canonical name/tag
//! - summoner-v4: profile icon
//! - league-v4: solo/duo tier, division, LP and record
//! - champion-mastery-v4: top champions
//!
//! "Not found" is an expected answer for all of them and comes back as
//! `Ok(None)` / an empty list. Only account resolution treats it as fatal,
//! and that decision belongs to the caller.

mod client;
#[cfg(test)]
pub mod mock;

pub use client::RiotClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Puuid, RankEntry, RiotId};

/// Queue type reported by league-v4 for ranked solo/duo.
pub const SOLO_DUO_QUEUE: &str = "RANKED_SOLO_5x5";

/// How many champions to keep from the mastery list.
pub const TOP_CHAMPION_COUNT: usize = 3;

/// Errors raised by the Riot API client.
#[derive(Debug, Error)]
pub enum RiotError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("Riot API key rejected by {endpoint} (invalid or expired)")]
    Unauthorized { endpoint: String },

    #[error("Rate limited by {endpoint}, retry after {retry_after_secs}s")]
    RateLimited {
        endpoint: String,
        retry_after_secs: u64,
    },

    #[error("Riot API returned HTTP {status} for {endpoint}: {body}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("Riot API key is not a valid header value")]
    InvalidApiKey,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl RiotError {
    /// Credential failures abort the whole pass; retrying will not help.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RiotError::Unauthorized { .. } | RiotError::InvalidApiKey
        )
    }
}

/// Result of account resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub puuid: Puuid,
    /// Name and tag with the casing Riot stores
    pub riot_id: RiotId,
}

/// The lookups the reconciler needs from Riot.
#[async_trait]
pub trait RiotApi: Send + Sync {
    async fn resolve_account(&self, riot_id: &RiotId) -> Result<Option<Account>, RiotError>;

    async fn fetch_profile_icon(&self, puuid: &Puuid) -> Result<Option<i64>, RiotError>;

    /// The solo/duo entry, or `None` when the player has not placed.
    async fn fetch_rank_entry(&self, puuid: &Puuid) -> Result<Option<RankEntry>, RiotError>;

    /// Champion ids by descending mastery, at most `count`.
    async fn fetch_top_champions(
        &self,
        puuid: &Puuid,
        count: usize,
    ) -> Result<Vec<i64>, RiotError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unauthorized_is_fatal() {
        assert!(RiotError::Unauthorized {
            endpoint: "x".to_string()
        }
        .is_fatal());
        assert!(!RiotError::Timeout {
            endpoint: "x".to_string()
        }
        .is_fatal());
        assert!(!RiotError::Status {
            status: 500,
            endpoint: "x".to_string(),
            body: String::new()
        }
        .is_fatal());
    }

    #[test]
    fn test_status_error_names_endpoint() {
        let err = RiotError::Status {
            status: 503,
            endpoint: "/lol/league/v4/entries/by-puuid/abc".to_string(),
            body: "unavailable".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("/lol/league/v4/entries/by-puuid/abc"));
    }
}
