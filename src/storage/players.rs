//! Player store.

use std::collections::HashMap;
use std::fs;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::{sort_ladder, Player, PlayerSnapshot, Puuid};

/// Keyed storage for tracked players.
///
/// `upsert` must be atomic per call: either the whole updated row becomes
/// visible or nothing changes.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn get(&self, puuid: &Puuid) -> Result<Option<Player>, StorageError>;

    /// Every stored player in ladder order.
    async fn list(&self) -> Result<Vec<Player>, StorageError>;

    /// Insert a new row or merge the snapshot into the existing one.
    async fn upsert(&self, snapshot: PlayerSnapshot) -> Result<Player, StorageError>;
}

/// [`PlayerStore`] kept in memory and mirrored to `players.jsonl`.
///
/// Writers hold the lock while the file is rewritten, so concurrent upserts
/// for the same PUUID are applied one after the other.
pub struct JsonlPlayerStore {
    writer: JsonlWriter<Player>,
    players: RwLock<HashMap<Puuid, Player>>,
}

impl JsonlPlayerStore {
    /// Load the store from disk, creating the data directory if needed.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;

        let path = config.players_path();
        let rows: Vec<Player> = JsonlReader::new(path.clone()).read_all()?;
        let mut players = HashMap::with_capacity(rows.len());
        for player in rows {
            players.insert(player.puuid.clone(), player);
        }

        info!("Loaded {} players from {:?}", players.len(), path);
        Ok(Self {
            writer: JsonlWriter::new(path),
            players: RwLock::new(players),
        })
    }

    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.players.read().await.is_empty()
    }
}

#[async_trait]
impl PlayerStore for JsonlPlayerStore {
    async fn get(&self, puuid: &Puuid) -> Result<Option<Player>, StorageError> {
        Ok(self.players.read().await.get(puuid).cloned())
    }

    async fn list(&self) -> Result<Vec<Player>, StorageError> {
        let mut players: Vec<Player> = self.players.read().await.values().cloned().collect();
        sort_ladder(&mut players);
        Ok(players)
    }

    async fn upsert(&self, snapshot: PlayerSnapshot) -> Result<Player, StorageError> {
        let mut players = self.players.write().await;
        let now = Utc::now();

        let updated = match players.get(&snapshot.puuid) {
            Some(existing) => {
                let mut row = existing.clone();
                row.apply(snapshot, now);
                row
            }
            None => Player::from_snapshot(snapshot, now),
        };

        // Persist before publishing so a failed write leaves memory untouched.
        let rows = players
            .values()
            .filter(|p| p.puuid != updated.puuid)
            .chain(std::iter::once(&updated));
        self.writer.write_all(rows)?;

        debug!(puuid = %updated.puuid, "Stored player {}#{}", updated.game_name, updated.tag_line);
        players.insert(updated.puuid.clone(), updated.clone());
        Ok(updated)
    }
}
