//! Single-player reconciliation.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{
    Player, PlayerSnapshot, RankEntry, RiotId, DEFAULT_PROFILE_ICON,
};
use crate::riot::{RiotApi, RiotError, TOP_CHAMPION_COUNT};
use crate::storage::{PlayerStore, StorageError};

/// Errors that fail one player's reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Riot account not found: {0}")]
    AccountNotFound(RiotId),

    #[error(transparent)]
    Riot(#[from] RiotError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ReconcileError {
    /// True when the failure will repeat for every player (bad API key).
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReconcileError::Riot(e) if e.is_fatal())
    }
}

/// What an optional lookup produced.
#[derive(Debug)]
pub enum FieldOutcome<T> {
    Fetched(T),
    /// Riot answered "not found"
    Absent,
    /// Riot answered with a non-fatal error
    Failed(RiotError),
}

impl<T> FieldOutcome<T> {
    /// Classify a lookup result; credential failures are returned as `Err`.
    pub fn classify(result: Result<Option<T>, RiotError>) -> Result<Self, RiotError> {
        match result {
            Ok(Some(value)) => Ok(FieldOutcome::Fetched(value)),
            Ok(None) => Ok(FieldOutcome::Absent),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => Ok(FieldOutcome::Failed(e)),
        }
    }

    /// Pick the value to store.
    ///
    /// Absent fields take `default`. Failed fields keep `previous` when the
    /// player is already stored, so a transient error does not wipe data.
    pub fn resolve(self, previous: Option<T>, default: T) -> T {
        match self {
            FieldOutcome::Fetched(value) => value,
            FieldOutcome::Absent => default,
            FieldOutcome::Failed(_) => previous.unwrap_or(default),
        }
    }

    pub fn error(&self) -> Option<&RiotError> {
        match self {
            FieldOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Drives the Riot lookups for one player and writes the result.
pub struct Reconciler {
    api: Arc<dyn RiotApi>,
    store: Arc<dyn PlayerStore>,
}

impl Reconciler {
    pub fn new(api: Arc<dyn RiotApi>, store: Arc<dyn PlayerStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &Arc<dyn PlayerStore> {
        &self.store
    }

    /// Refresh one player by Riot ID.
    ///
    /// Nothing is written unless the account resolves and no credential
    /// failure occurs.
    pub async fn reconcile(&self, riot_id: &RiotId) -> Result<Player, ReconcileError> {
        let account = self
            .api
            .resolve_account(riot_id)
            .await?
            .ok_or_else(|| ReconcileError::AccountNotFound(riot_id.clone()))?;
        let puuid = account.puuid;
        let canonical = account.riot_id;

        let existing = self.store.get(&puuid).await?;

        let icon = FieldOutcome::classify(self.api.fetch_profile_icon(&puuid).await)?;
        let rank = FieldOutcome::classify(self.api.fetch_rank_entry(&puuid).await)?;
        let champions = FieldOutcome::classify(
            self.api
                .fetch_top_champions(&puuid, TOP_CHAMPION_COUNT)
                .await
                .map(Some),
        )?;

        if matches!(icon, FieldOutcome::Absent) {
            warn!(player = %canonical, "Profile icon not found, using default");
        }
        for (field, err) in [
            ("profile icon", icon.error()),
            ("rank entry", rank.error()),
            ("top champions", champions.error()),
        ] {
            if let Some(err) = err {
                warn!(player = %canonical, %puuid, "Failed to fetch {}: {}", field, err);
            }
        }

        let snapshot = PlayerSnapshot {
            riot_id: canonical,
            profile_icon_id: icon.resolve(
                existing.as_ref().map(|p| p.profile_icon_id),
                DEFAULT_PROFILE_ICON,
            ),
            rank: rank.resolve(
                existing.as_ref().map(Player::rank_entry),
                RankEntry::unranked(),
            ),
            top_champions: champions.resolve(
                existing.as_ref().map(|p| p.top_champions.clone()),
                Vec::new(),
            ),
            puuid,
        };

        let player = self.store.upsert(snapshot).await?;
        info!(
            player = %player.riot_id(),
            tier = %player.tier,
            division = %player.division,
            lp = player.league_points,
            score = player.sort_score,
            "Player reconciled"
        );
        Ok(player)
    }
}
